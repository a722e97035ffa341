use std::path::PathBuf;

use clap::Args;
use common::prelude::{BlockStore, BundleError, CidError};

use super::{read_bundle, BundleFileError};

#[derive(Args, Debug, Clone)]
pub struct Import {
    /// Bundle file (base64 text or raw DAG-CBOR)
    pub bundle: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    BundleFile(#[from] BundleFileError),
    #[error("bundle error: {0}")]
    Bundle(#[from] BundleError),
    #[error("cid error: {0}")]
    Cid(#[from] CidError),
    #[error("state error: {0}")]
    State(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Import {
    type Error = ImportError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let blobs = ctx.blobs().await?;
        let bundle = read_bundle(&self.bundle)?;

        // the blob store addresses by blake3, a tip hashed any other
        //  way is stored but can't be resolved from there
        let cids = bundle.derive_cids(blobs.scheme())?;
        let addressable = cids.contains(bundle.tip());
        if !addressable {
            tracing::warn!(
                "bundle tip {} does not match any node hashed with blake3",
                bundle.tip()
            );
        }

        let dag = bundle.reconstruct(blobs).await?;

        let mut output = format!(
            "Imported {} nodes into {}\nTip: {}",
            cids.len(),
            state.blobs_path.display(),
            dag.tip()
        );
        if !addressable {
            output.push_str("\nWarning: tip is not addressable in the blob store");
        }
        Ok(output)
    }
}
