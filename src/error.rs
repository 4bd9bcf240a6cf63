//! Error types for configuration loading.
//!
//! Codec decode failures intentionally are not `Result`: every malformed
//! frame is silently dropped by protocol design, and `Option::None`
//! already expresses that for free.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
