use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use common::prelude::BlobsStore;
use tokio::sync::OnceCell;

use crate::state::{AppState, StateError};

#[derive(Clone, Debug)]
pub struct OpContext {
    /// Optional custom state directory (defaults to ~/.chaintree)
    pub config_path: Option<PathBuf>,
    /// Blob store, opened on first use and shared by every op
    ///  run against this context
    blobs: Arc<OnceCell<BlobsStore>>,
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            blobs: Arc::new(OnceCell::new()),
        }
    }

    /// The persistent blob store, requires an initialized state directory
    pub async fn blobs(&self) -> Result<BlobsStore, StateError> {
        let state = self.state()?;
        self.blobs
            .get_or_try_init(|| async move { state.blobs().await })
            .await
            .cloned()
    }

    /// Load the state directory, if it has been initialized
    pub fn state(&self) -> Result<AppState, StateError> {
        AppState::load(self.config_path.clone())
    }

    /// Load the state directory, falling back to defaults when
    ///  `chaintree init` was never run
    pub fn state_or_default(&self) -> Result<AppState, StateError> {
        match self.state() {
            Err(StateError::NotInitialized) => {
                let chaintree_dir = AppState::chaintree_dir(self.config_path.clone())?;
                Ok(AppState {
                    blobs_path: chaintree_dir.join(crate::state::BLOBS_DIR_NAME),
                    config_path: chaintree_dir.join(crate::state::CONFIG_FILE_NAME),
                    chaintree_dir,
                    config: Default::default(),
                })
            }
            other => other,
        }
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
