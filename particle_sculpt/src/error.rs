use std::path::PathBuf;

use thiserror::Error;

/// Failures reading the configuration document or parsing control values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid color {0:?}: expected #rrggbb")]
    Color(String),
}
