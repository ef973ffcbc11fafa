//! Environment-driven settings for the sample application.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `HATEOAS_SERVER_BUFFER` | `32` | Exchanges the in-memory server queues before senders wait |
//! | `HATEOAS_COLLECTION` | `/bookmarks` | Collection the demo stores untyped bookmarks in |
//!
//! Log filtering is configured separately through `RUST_LOG`.

pub const SERVER_BUFFER: &str = "HATEOAS_SERVER_BUFFER";
pub const COLLECTION: &str = "HATEOAS_COLLECTION";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidBuffer { name: &'static str, value: String },

    #[error("{name} must start with '/', got {value:?}")]
    InvalidCollection { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleConfig {
    pub server_buffer: usize,
    pub collection: String,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            server_buffer: 32,
            collection: "/bookmarks".to_string(),
        }
    }
}

impl SampleConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset ones.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(SERVER_BUFFER) {
            config.server_buffer = match value.trim().parse::<usize>() {
                Ok(buffer) if buffer > 0 => buffer,
                _ => {
                    return Err(ConfigError::InvalidBuffer {
                        name: SERVER_BUFFER,
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup(COLLECTION) {
            if !value.starts_with('/') {
                return Err(ConfigError::InvalidCollection {
                    name: COLLECTION,
                    value,
                });
            }
            config.collection = value.trim_end_matches('/').to_string();
        }

        Ok(config)
    }
}
