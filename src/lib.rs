//! Hex map generation library
//!
//! Generates seeded hexagonal terrain maps, classifies cells into biomes and packs
//! the result into a compact binary form for storage and transfer.

pub mod artifact;
pub mod ascii;
pub mod biomes;
pub mod cell;
pub mod codec;
pub mod config;
pub mod coords;
pub mod error;
pub mod generation;
pub mod noise_field;
pub mod persistence;
pub mod seeds;
pub mod service;
pub mod tilemap;

pub use artifact::MapArtifact;
pub use cell::{Biome, CellDetails, HexCell};
pub use codec::{decode, encode, DecodedMap};
pub use config::GeneratorConfig;
pub use coords::{CellCoordinate, GridDimensions};
pub use error::{ArtifactError, CodecError, ConfigError, LoadError, PersistError, ServiceError};
pub use generation::{generate_map, generate_map_detailed};
pub use persistence::{FileMapStore, MapStore, MemoryMapStore};
pub use service::{EncodedMap, MapService};
