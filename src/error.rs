//! Error types shared by the level, the pool and the host loop.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading or running the level.
#[derive(Error, Debug)]
pub enum GameError {
    /// One full pass over the pool found no inactive slot.
    #[error("entity pool exhausted: all {capacity} slots are active")]
    PoolExhausted {
        /// Pool capacity at the time of the failed spawn.
        capacity: usize,
    },

    /// A media asset was missing or malformed.
    #[error("asset '{asset}' could not be loaded: {reason}")]
    Asset { asset: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for level operations.
pub type GameResult<T> = Result<T, GameError>;
