//! Error types for map generation, encoding and storage.

use thiserror::Error;

/// Rejected generator configuration. Raised before any generation work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("map dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("map dimension {value} exceeds the wire format limit of {max}")]
    DimensionTooLarge { value: u32, max: u32 },
    #[error("invalid biome thresholds: {0}")]
    InvalidThresholds(String),
    #[error("invalid noise parameters: {0}")]
    InvalidNoise(String),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Cells and dimensions that do not form a valid map.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("map dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("map dimension {value} exceeds the wire format limit of {max}")]
    DimensionTooLarge { value: u32, max: u32 },
    #[error("expected {expected} cells, found {actual}")]
    CellCount { expected: usize, actual: usize },
    #[error("cell {index} is at ({q}, {r}), expected ({expected_q}, {expected_r})")]
    MisplacedCell {
        index: usize,
        q: i32,
        r: i32,
        expected_q: i32,
        expected_r: i32,
    },
}

/// Malformed binary map buffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("corrupt encoding: buffer of {len} bytes is shorter than the {header} byte header")]
    TruncatedHeader { len: usize, header: usize },
    #[error("corrupt encoding: header declares an empty {width}x{height} map")]
    ZeroDimension { width: u16, height: u16 },
    #[error("corrupt encoding: expected {expected} payload bytes, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("corrupt encoding: cell {index} has invalid details {details:#06x}")]
    InvalidDetails { index: usize, details: u16 },
}

/// Failure writing a map to the persistence gateway.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure reading a map from the persistence gateway.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No map has ever been saved.
    #[error("no stored map found")]
    NotFound,
    /// Stored metadata and stored cells disagree.
    #[error("stored map is inconsistent: {0}")]
    Inconsistent(String),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored map could not be parsed: {0}")]
    Format(#[from] serde_json::Error),
}

/// Errors surfaced by [`crate::service::MapService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("no map is currently loaded")]
    NoMap,
}
