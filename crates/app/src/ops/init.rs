use clap::Args;
use common::prelude::HashAlgorithm;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Default log level (default: warn)
    #[arg(long, default_value = "warn")]
    pub default_log_level: String,

    /// Hash used to derive cids for bundles resolved in memory
    #[arg(long, default_value = "sha2-256")]
    pub hash: HashAlgorithm,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            log_level: self.default_log_level.clone(),
            hash: self.hash,
        };
        // reject a bad level before anything is written
        config.level_filter()?;

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized chaintree directory at: {}\n\
             - Blobs: {}\n\
             - Config: {}\n\
             - Log level: {}\n\
             - Hash: {:?}",
            state.chaintree_dir.display(),
            state.blobs_path.display(),
            state.config_path.display(),
            state.config.log_level,
            state.config.hash,
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Op, OpContext};
    use crate::state::StateError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_config() {
        let temp = TempDir::new().unwrap();
        let ctx = OpContext::new(Some(temp.path().join("state")));
        let init = Init {
            default_log_level: "info".to_string(),
            hash: HashAlgorithm::Blake3,
        };

        init.execute(&ctx).await.unwrap();

        let state = ctx.state().unwrap();
        assert_eq!(state.config.log_level, "info");
        assert_eq!(state.config.hash, HashAlgorithm::Blake3);
    }

    #[tokio::test]
    async fn test_init_rejects_bad_log_level() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("state");
        let ctx = OpContext::new(Some(dir.clone()));
        let init = Init {
            default_log_level: "loud".to_string(),
            hash: HashAlgorithm::default(),
        };

        assert!(matches!(
            init.execute(&ctx).await,
            Err(InitError::StateFailed(StateError::InvalidLogLevel(_)))
        ));
        assert!(!dir.exists());
    }
}
