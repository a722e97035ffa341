use std::path::PathBuf;

use clap::Args;
use common::prelude::{BundleError, Cid, Dag};

#[derive(Args, Debug, Clone)]
pub struct Export {
    /// Tip of the tree to export from the blob store
    #[arg(long)]
    pub tip: Cid,

    /// Write the base64 bundle here instead of printing it
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("bundle error: {0}")]
    Bundle(#[from] BundleError),
    #[error("state error: {0}")]
    State(#[from] crate::state::StateError),
    #[error("failed to write bundle to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[async_trait::async_trait]
impl crate::op::Op for Export {
    type Error = ExportError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let dag = Dag::new(self.tip, ctx.blobs().await?);

        let bundle = dag.export().await?;
        let text = bundle.to_base64()?;

        match &self.out {
            Some(path) => {
                std::fs::write(path, &text).map_err(|source| ExportError::Write {
                    path: path.clone(),
                    source,
                })?;
                Ok(format!(
                    "Exported {} nodes from {} to {}",
                    bundle.nodes().len(),
                    self.tip,
                    path.display()
                ))
            }
            None => Ok(text),
        }
    }
}
