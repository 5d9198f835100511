//! Runtime configuration
//!
//! Settings are merged from built-in defaults, a `layered.toml` file and
//! `LAYERED_*` environment variables, later sources overriding earlier ones.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matrix_market::{Compression, ReadOptions};

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "layered.toml";

/// Prefix of environment variables overriding the configuration
pub const ENV_PREFIX: &str = "LAYERED_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayeredConfig {
    /// Columns per chunk when reading Matrix Market files
    pub chunk_size: usize,
    /// Worker threads used for conversion
    pub num_threads: usize,
    /// Read buffer size in bytes
    pub buffer_size: usize,
    pub compression: Compression,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        let options = ReadOptions::default();
        Self {
            chunk_size: options.chunk_size,
            num_threads: 1,
            buffer_size: options.buffer_size,
            compression: options.compression,
        }
    }
}

impl LayeredConfig {
    /// Load from `layered.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load from the given TOML file and the environment
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::extract(
            Figment::from(Serialized::defaults(Self::default()))
                .merge(Toml::file(path.as_ref()))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    /// Extract a configuration from an arbitrary figment
    pub fn extract(figment: Figment) -> Result<Self> {
        figment.extract().map_err(|e| Error::Config(Box::new(e)))
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions::default()
            .with_chunk_size(self.chunk_size)
            .with_compression(self.compression)
            .with_buffer_size(self.buffer_size)
    }
}
