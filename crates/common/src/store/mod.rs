//! Node store adapters
//!
//! A store is the capability surface the DAG layer talks to.
//! It is split in two:
//!
//! - **[`NodeStore`]**: read decoded nodes by cid, and lazily resolve
//!   a `/` delimited path through them, following links as it goes
//! - **[`BlockStore`]**: raw block reads / writes keyed by cid, plus the
//!   [`CidScheme`] the store derives cids with
//!
//! Two backends are provided:
//!
//! - [`MemoryStore`]: in-process map, works with any scheme
//! - [`BlobsStore`]: iroh-blobs (memory or on disk), BLAKE3 addressed

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::linked_data::{
    BlockEncoded, Cid, CidError, CidScheme, CodecError, LinkedData,
};

mod blobs;
mod memory;
mod resolver;

pub use blobs::{BlobsStore, BlobsStoreError};
pub use memory::MemoryStore;
pub use resolver::{resolve_in_node, resolve_steps};

/// One step of a lazy path resolution.
/// `remainder_path` is what is left of the path after this step,
///  `""` once the whole path has been consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveStep {
    pub remainder_path: String,
    pub value: LinkedData,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("block not found: {0}")]
    NotFound(Cid),
    /// The addressed property does not exist on the node
    ///  reached so far. Not fatal for path resolution.
    #[error("object has no property: {key}")]
    KeyNotFound { key: String },
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("cid error: {0}")]
    Cid(#[from] CidError),
    #[error("cid mismatch: expected {expected}, store produced {actual}")]
    CidMismatch { expected: Cid, actual: Cid },
    #[error("store backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Read side of a store: decoded nodes and path resolution
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Fetch and decode the node addressed by `cid`
    ///
    /// # Returns
    /// * `Err(StoreError::NotFound)` - No block is stored under `cid`
    async fn get(&self, cid: &Cid) -> Result<LinkedData, StoreError>;

    /// Lazily resolve `path` starting at `cid`.
    ///
    /// Each item reports the path left after resolving one more block
    ///  and the value reached in that block. The stream is finite; it
    ///  ends once the path is consumed on a non-link value, or after
    ///  yielding an error. A path segment naming a missing property
    ///  yields `StoreError::KeyNotFound`.
    fn resolve(&self, cid: Cid, path: &str) -> BoxStream<'_, Result<ResolveStep, StoreError>> {
        resolve_steps(self, cid, path)
    }
}

/// Write side of a store: raw blocks keyed by cid
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// The scheme this store derives cids with
    fn scheme(&self) -> &dyn CidScheme;

    /// Store `data` under `cid`. Rewriting an existing block is a no-op.
    async fn put_block(&self, cid: &Cid, data: Bytes) -> Result<(), StoreError>;

    async fn get_block(&self, cid: &Cid) -> Result<Bytes, StoreError>;

    async fn has_block(&self, cid: &Cid) -> Result<bool, StoreError>;

    /// Encode a node as DAG-CBOR, derive its cid with the
    ///  store's scheme and store it
    async fn put_node(&self, node: &LinkedData) -> Result<Cid, StoreError> {
        let data = node.encode()?;
        let cid = self.scheme().derive(&data)?;
        self.put_block(&cid, Bytes::from(data)).await?;
        Ok(cid)
    }
}
