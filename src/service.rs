//! Owner of the current map.
//!
//! Ties generation, persistence and the encoded transport buffer together. The
//! current map is swapped as a whole; readers never see a partially generated map.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::artifact::MapArtifact;
use crate::codec::{self, CONTENT_TYPE};
use crate::config::GeneratorConfig;
use crate::error::{LoadError, ServiceError};
use crate::generation::generate_map;
use crate::persistence::MapStore;

/// Encoded map ready to be sent to a client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedMap {
    pub bytes: Arc<[u8]>,
    pub content_type: &'static str,
}

struct CurrentMap {
    artifact: Arc<MapArtifact>,
    encoded: EncodedMap,
}

impl CurrentMap {
    fn new(artifact: MapArtifact) -> Self {
        let encoded = EncodedMap {
            bytes: codec::encode(&artifact).into(),
            content_type: CONTENT_TYPE,
        };
        Self {
            artifact: Arc::new(artifact),
            encoded,
        }
    }
}

/// Serves the current map and replaces it on regeneration.
///
/// Every change of the current map holds `update` from the store call through the
/// swap, so the served map is always the one most recently persisted. Readers only
/// take `current` and are never blocked by a save in progress.
///
/// Authentication of callers is left to whatever wraps this service.
pub struct MapService<S: MapStore> {
    store: S,
    current: RwLock<Option<CurrentMap>>,
    update: Mutex<()>,
}

impl<S: MapStore> MapService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            current: RwLock::new(None),
            update: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generate a fresh map, persist it, then make it current.
    ///
    /// If persisting fails the previously current map stays in place.
    pub fn regenerate(&self, seed: &str, config: &GeneratorConfig) -> Result<Arc<MapArtifact>, ServiceError> {
        let artifact = generate_map(seed, config)?;
        let _update = self.update.lock();
        self.save_and_install(artifact)
    }

    /// Load the persisted map and make it current.
    pub fn load(&self) -> Result<Arc<MapArtifact>, ServiceError> {
        let _update = self.update.lock();
        let artifact = self.store.load()?;
        Ok(self.install(artifact))
    }

    /// Load the persisted map, generating and saving one if none exists yet.
    ///
    /// An inconsistent stored map is an error, not a reason to regenerate.
    pub fn load_or_generate(&self, seed: &str, config: &GeneratorConfig) -> Result<Arc<MapArtifact>, ServiceError> {
        let _update = self.update.lock();
        match self.store.load() {
            Ok(artifact) => Ok(self.install(artifact)),
            Err(LoadError::NotFound) => {
                info!("no stored map, generating one");
                let artifact = generate_map(seed, config)?;
                self.save_and_install(artifact)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The current map, if one has been loaded or generated.
    pub fn current(&self) -> Option<Arc<MapArtifact>> {
        self.current.read().as_ref().map(|c| Arc::clone(&c.artifact))
    }

    /// Encoded buffer of the current map.
    pub fn encoded_map(&self) -> Result<EncodedMap, ServiceError> {
        self.current
            .read()
            .as_ref()
            .map(|c| c.encoded.clone())
            .ok_or(ServiceError::NoMap)
    }

    // Caller holds `update`.
    fn save_and_install(&self, artifact: MapArtifact) -> Result<Arc<MapArtifact>, ServiceError> {
        self.store.save(&artifact)?;
        Ok(self.install(artifact))
    }

    fn install(&self, artifact: MapArtifact) -> Arc<MapArtifact> {
        let current = CurrentMap::new(artifact);
        let handle = Arc::clone(&current.artifact);
        info!(
            seed = handle.seed(),
            dimensions = %handle.dimensions(),
            bytes = current.encoded.bytes.len(),
            "current map replaced"
        );
        *self.current.write() = Some(current);
        handle
    }
}
