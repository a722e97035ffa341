use std::fmt::Write;
use std::path::PathBuf;

use clap::Args;
use common::prelude::{CidBuilder, CidError, HashAlgorithm};

use super::{read_bundle, BundleFileError};

#[derive(Args, Debug, Clone)]
pub struct Inspect {
    /// Bundle file (base64 text or raw DAG-CBOR)
    pub bundle: PathBuf,

    /// Hash to derive node cids with (defaults to the configured hash)
    #[arg(long)]
    pub hash: Option<HashAlgorithm>,
}

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error(transparent)]
    BundleFile(#[from] BundleFileError),
    #[error("cid error: {0}")]
    Cid(#[from] CidError),
    #[error("state error: {0}")]
    State(#[from] crate::state::StateError),
    #[error("format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Inspect {
    type Error = InspectError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let hash = match self.hash {
            Some(hash) => hash,
            None => ctx.state_or_default()?.config.hash,
        };

        let bundle = read_bundle(&self.bundle)?;
        let cids = bundle.derive_cids(&CidBuilder::dag_cbor(hash))?;

        let mut output = String::new();
        writeln!(output, "Tip: {}", bundle.tip())?;
        writeln!(output, "Nodes: {}", bundle.nodes().len())?;
        for (cid, node) in cids.iter().zip(bundle.nodes()) {
            let marker = if cid == bundle.tip() { " (tip)" } else { "" };
            writeln!(output, "  {} {} bytes{}", cid, node.len(), marker)?;
        }
        if !cids.contains(bundle.tip()) {
            write!(
                output,
                "Warning: no node derives to the tip with {:?}",
                hash
            )?;
        }

        Ok(output.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Op, OpContext};
    use crate::ops::testkit::{parent_child_bundle, write_bundle};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_inspect_lists_derived_cids() {
        let temp = TempDir::new().unwrap();
        let bundle = parent_child_bundle(HashAlgorithm::Sha2_256).await;
        let path = write_bundle(temp.path(), &bundle);
        let ctx = OpContext::new(Some(temp.path().join("uninitialized")));

        let output = Inspect {
            bundle: path,
            hash: None,
        }
        .execute(&ctx)
        .await
        .unwrap();

        assert!(output.contains(&format!("Tip: {}", bundle.tip())));
        assert!(output.contains("Nodes: 2"));
        assert!(output.contains("(tip)"));
        assert!(!output.contains("Warning"));
    }

    #[tokio::test]
    async fn test_inspect_with_other_hash_warns() {
        let temp = TempDir::new().unwrap();
        let bundle = parent_child_bundle(HashAlgorithm::Sha2_256).await;
        let path = write_bundle(temp.path(), &bundle);
        let ctx = OpContext::new(Some(temp.path().join("uninitialized")));

        let output = Inspect {
            bundle: path,
            hash: Some(HashAlgorithm::Blake3),
        }
        .execute(&ctx)
        .await
        .unwrap();

        assert!(!output.contains("(tip)"));
        assert!(output.contains("Warning"));
    }
}
