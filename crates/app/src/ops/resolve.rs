use std::path::PathBuf;

use clap::Args;
use common::prelude::{BundleError, Cid, Dag, DagError, NodeStore, Resolution};

use super::{read_bundle, BundleFileError};
use crate::render::resolution_to_json;

#[derive(Args, Debug, Clone)]
pub struct Resolve {
    /// Resolve against a bundle file, reconstructed in memory
    #[arg(long, group = "source")]
    pub bundle: Option<PathBuf>,

    /// Resolve against a tip already imported into the blob store
    #[arg(long, group = "source")]
    pub tip: Option<Cid>,

    /// Resolve from this node instead of the tip
    #[arg(long)]
    pub at: Option<Cid>,

    /// Slash delimited path, e.g. `tree/data/foo`
    #[arg(default_value = "")]
    pub path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    BundleFile(#[from] BundleFileError),
    #[error("bundle error: {0}")]
    Bundle(#[from] BundleError),
    #[error("dag error: {0}")]
    Dag(#[from] DagError),
    #[error("state error: {0}")]
    State(#[from] crate::state::StateError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Either --bundle or --tip must be provided")]
    NoSource,
}

impl Resolve {
    fn segments(&self) -> Vec<&str> {
        self.path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    async fn resolve_in<S: NodeStore>(&self, dag: &Dag<S>) -> Result<Resolution, DagError> {
        let segments = self.segments();
        match &self.at {
            Some(at) => dag.resolve_at(at, &segments).await,
            None => dag.resolve(&segments).await,
        }
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Resolve {
    type Error = ResolveError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let resolution = if let Some(path) = &self.bundle {
            let state = ctx.state_or_default()?;
            let bundle = read_bundle(path)?;
            let dag = bundle.reconstruct(state.memory_store()).await?;
            self.resolve_in(&dag).await?
        } else if let Some(tip) = self.tip {
            let dag = Dag::new(tip, ctx.blobs().await?);
            self.resolve_in(&dag).await?
        } else {
            return Err(ResolveError::NoSource);
        };

        Ok(serde_json::to_string_pretty(&resolution_to_json(
            &resolution,
        ))?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use tempfile::TempDir;

    use super::*;
    use crate::op::{Op, OpContext};
    use crate::ops::testkit::{parent_child_bundle, write_bundle};
    use common::prelude::HashAlgorithm;

    async fn resolve_bundle(path: &str, at: Option<Cid>) -> Value {
        let temp = TempDir::new().unwrap();
        let bundle = parent_child_bundle(HashAlgorithm::Sha2_256).await;
        let file = write_bundle(temp.path(), &bundle);
        let ctx = OpContext::new(Some(temp.path().join("uninitialized")));

        let output = Resolve {
            bundle: Some(file),
            tip: None,
            at,
            path: path.to_string(),
        }
        .execute(&ctx)
        .await
        .unwrap();
        serde_json::from_str(&output).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_bundle_paths() {
        assert_eq!(
            resolve_bundle("child/foo", None).await,
            json!({"remainderPath": [], "value": "bar"})
        );
        assert_eq!(
            resolve_bundle("/child/foo/", None).await,
            json!({"remainderPath": [], "value": "bar"})
        );
        assert_eq!(
            resolve_bundle("child/other", None).await,
            json!({"remainderPath": ["other"], "value": null})
        );
        assert_eq!(
            resolve_bundle("child/foo/notAKey", None).await,
            json!({"remainderPath": ["foo", "notAKey"], "value": null})
        );
    }

    #[tokio::test]
    async fn test_resolve_bundle_root_renders_link() {
        let value = resolve_bundle("", None).await;
        let link = &value["value"]["child"]["/"];
        assert!(link.is_string());
        assert_eq!(value["remainderPath"], json!([]));
    }

    #[tokio::test]
    async fn test_resolve_bundle_at_child() {
        let bundle = parent_child_bundle(HashAlgorithm::Sha2_256).await;
        let child = bundle.derive_cids(&common::prelude::CidBuilder::default()).unwrap()[1];

        assert_eq!(
            resolve_bundle("foo", Some(child)).await,
            json!({"remainderPath": [], "value": "bar"})
        );
    }

    #[tokio::test]
    async fn test_resolve_without_source() {
        let temp = TempDir::new().unwrap();
        let ctx = OpContext::new(Some(temp.path().to_path_buf()));
        let result = Resolve {
            bundle: None,
            tip: None,
            at: None,
            path: String::new(),
        }
        .execute(&ctx)
        .await;

        assert!(matches!(result, Err(ResolveError::NoSource)));
    }
}
