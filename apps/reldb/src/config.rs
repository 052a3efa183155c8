use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the acceptor binds, e.g. `0.0.0.0:9000`.
    pub listen_addr: String,
    /// Statements executing concurrently (each still serializes on the
    /// database mutex).
    pub workers: NonZeroUsize,
    /// Admission cap; connections beyond it are dropped at accept time.
    pub max_connections: NonZeroUsize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_file: PathBuf,
    pub logs_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9000".to_string(),
            workers: NonZeroUsize::new(4).expect("nonzero"),
            max_connections: NonZeroUsize::new(256).expect("nonzero"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("reldb.db"),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

impl EngineConfig {
    /// Loads the config file, falling back to built-in defaults when the
    /// file does not exist. A present-but-broken file is an error; serving
    /// with half a config silently would be worse than refusing to start.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path,
                    source: e,
                });
            }
        };

        let cfg: EngineConfig = toml::from_str(&text).map_err(|e| ConfigError::ParseToml {
            path: path.clone(),
            source: e,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // workers / max_connections are NonZeroUsize, so "0" can't happen.
        if self.storage.data_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                message: "storage.data_file must not be empty".to_string(),
            });
        }
        if self.server.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Invalid {
                message: format!(
                    "server.listen_addr '{}' is not a socket address",
                    self.server.listen_addr
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.server.workers.get(), 4);
        assert_eq!(cfg.server.max_connections.get(), 256);
        assert_eq!(cfg.server.listen_addr, "0.0.0.0:9000");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: EngineConfig = toml::from_str(
            r#"
            [server]
            workers = 2
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.workers.get(), 2);
        assert_eq!(cfg.server.max_connections.get(), 256);
        assert_eq!(cfg.storage.data_file, PathBuf::from("reldb.db"));
    }

    #[test]
    fn bad_listen_addr_is_rejected() {
        let cfg: EngineConfig = toml::from_str(
            r#"
            [server]
            listen_addr = "not-an-addr"
            "#,
        )
        .unwrap();
        assert!(cfg.validate().is_err());
    }
}
