//! Seed management for map generation
//!
//! The seed string is the only source of entropy. Each generation system gets its
//! own sub-seed derived from it, so the noise field and the cosmetic draws stay
//! decorrelated while remaining reproducible.

/// Seeds for all map generation systems.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapSeeds {
    /// Master seed string (stored with the map)
    pub master: String,
    /// Noise field (height and forest channels)
    pub height: u64,
    /// Per-cell cosmetic coin flips
    pub cosmetic: u64,
}

impl MapSeeds {
    /// Derive all sub-seeds deterministically from a seed string.
    pub fn from_master(master: &str) -> Self {
        Self {
            master: master.to_string(),
            height: derive_seed(master, "height"),
            cosmetic: derive_seed(master, "cosmetic"),
        }
    }

    /// Create a builder for overriding individual seeds
    pub fn builder(master: &str) -> MapSeedsBuilder {
        MapSeedsBuilder::new(master)
    }
}

/// Builder for customizing individual seeds while deriving others from master
pub struct MapSeedsBuilder {
    seeds: MapSeeds,
}

impl MapSeedsBuilder {
    pub fn new(master: &str) -> Self {
        Self {
            seeds: MapSeeds::from_master(master),
        }
    }

    pub fn height(mut self, seed: u64) -> Self {
        self.seeds.height = seed;
        self
    }

    pub fn cosmetic(mut self, seed: u64) -> Self {
        self.seeds.cosmetic = seed;
        self
    }

    pub fn build(self) -> MapSeeds {
        self.seeds
    }
}

/// Derive a sub-seed from a master seed string and a system name.
///
/// Uses FNV-1a rather than `DefaultHasher`, whose algorithm may change between
/// Rust releases; sub-seeds must be identical on every platform and toolchain.
pub fn derive_seed(master: &str, system: &str) -> u64 {
    let mut hash = fnv1a(FNV_OFFSET, master.as_bytes());
    hash = fnv1a(hash, &[0xff]);
    mix64(fnv1a(hash, system.as_bytes()))
}

/// Seed for a single cell, independent of the order cells are visited in.
pub fn cell_seed(system_seed: u64, index: u32) -> u64 {
    mix64(system_seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Fold a 64-bit seed into the 32 bits the noise primitives accept.
pub fn noise_seed(seed: u64) -> u32 {
    ((seed >> 32) ^ seed) as u32
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

// splitmix64 finalizer
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl std::fmt::Display for MapSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MapSeeds {{ master: {:?}, height: {}, cosmetic: {} }}",
            self.master, self.height, self.cosmetic,
        )
    }
}
