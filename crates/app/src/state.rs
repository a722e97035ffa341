use std::{fs, path::PathBuf};

use common::prelude::{BlobsStore, CidBuilder, HashAlgorithm, MemoryStore};
use common::store::BlobsStoreError;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

pub const APP_NAME: &str = "chaintree";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const BLOBS_DIR_NAME: &str = "blobs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default tracing level, `RUST_LOG` still takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Hash used to re-derive cids for bundles resolved in memory
    #[serde(default)]
    pub hash: HashAlgorithm,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            hash: HashAlgorithm::default(),
        }
    }
}

impl AppConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, StateError> {
        self.log_level
            .parse()
            .map_err(|_| StateError::InvalidLogLevel(self.log_level.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the state directory (~/.chaintree)
    pub chaintree_dir: PathBuf,
    /// Path to the blobs directory
    pub blobs_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the state directory path (custom or default ~/.chaintree)
    pub fn chaintree_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let chaintree_dir = Self::chaintree_dir(custom_path)?;

        if chaintree_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&chaintree_dir)?;

        let blobs_path = chaintree_dir.join(BLOBS_DIR_NAME);
        fs::create_dir_all(&blobs_path)?;

        let config = config.unwrap_or_default();
        let config_path = chaintree_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            chaintree_dir,
            blobs_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the state directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let chaintree_dir = Self::chaintree_dir(custom_path)?;

        if !chaintree_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let blobs_path = chaintree_dir.join(BLOBS_DIR_NAME);
        let config_path = chaintree_dir.join(CONFIG_FILE_NAME);

        if !blobs_path.exists() {
            return Err(StateError::MissingFile("blobs/".to_string()));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile("config.toml".to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            chaintree_dir,
            blobs_path,
            config_path,
            config,
        })
    }

    /// Open the persistent blob store under the state directory
    pub async fn blobs(&self) -> Result<BlobsStore, StateError> {
        Ok(BlobsStore::fs(&self.blobs_path).await?)
    }

    /// A fresh in-memory store deriving cids with the configured hash
    pub fn memory_store(&self) -> MemoryStore {
        MemoryStore::new(CidBuilder::dag_cbor(self.config.hash))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("chaintree directory not initialized. Run 'chaintree init' first")]
    NotInitialized,

    #[error("chaintree directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("blob store error: {0}")]
    Blobs(#[from] BlobsStoreError),
}
