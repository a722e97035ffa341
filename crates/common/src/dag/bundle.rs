use std::collections::{HashSet, VecDeque};

use base64::Engine;
use bytes::Bytes;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

use super::Dag;
use crate::linked_data::{
    decode_block, links, BlockEncoded, Cid, CidError, CidScheme, CodecError, DagCborCodec,
};
use crate::store::{BlockStore, NodeStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("bundle codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("bundle base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("cid error: {0}")]
    Cid(#[from] CidError),
    #[error("failed to write node {cid}: {source}")]
    Write { cid: Cid, source: StoreError },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Wire form of a bundle: `{ tip: <link>, dag: [<bytes>, ...] }`
#[derive(Serialize, Deserialize)]
struct BundleEnvelope {
    tip: Cid,
    dag: Vec<ByteBuf>,
}

impl BlockEncoded<DagCborCodec> for BundleEnvelope {}

/// A self-contained export of a chain tree: its tip and the
///  raw bytes of every node reachable from it.
/// Node cids are never carried; they are re-derived from the bytes
///  on import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    tip: Cid,
    nodes: Vec<Bytes>,
}

impl Bundle {
    pub fn new(tip: Cid, nodes: Vec<Bytes>) -> Self {
        Self { tip, nodes }
    }

    pub fn tip(&self) -> &Cid {
        &self.tip
    }

    pub fn nodes(&self) -> &[Bytes] {
        &self.nodes
    }

    /// Walk every node reachable from `tip` and collect its raw bytes.
    /// The tip comes first, the rest follow in breadth-first discovery
    ///  order; each node is included once.
    pub async fn export<S>(store: &S, tip: &Cid) -> Result<Self, BundleError>
    where
        S: BlockStore + ?Sized,
    {
        let mut seen = HashSet::from([*tip]);
        let mut queue = VecDeque::from([*tip]);
        let mut nodes = Vec::new();

        while let Some(cid) = queue.pop_front() {
            let data = store.get_block(&cid).await?;
            let node = decode_block(&cid, &data)?;
            for link in links(&node) {
                if seen.insert(link) {
                    queue.push_back(link);
                }
            }
            nodes.push(data);
        }

        tracing::debug!("exported bundle for {} with {} nodes", tip, nodes.len());
        Ok(Self { tip: *tip, nodes })
    }

    /// Derive the cid of every node, in bundle order
    pub fn derive_cids(&self, scheme: &dyn CidScheme) -> Result<Vec<Cid>, CidError> {
        self.nodes.iter().map(|node| scheme.derive(node)).collect()
    }

    /// Write every node into `store` under its derived cid and return
    ///  a dag over the bundle's tip.
    /// Writes run concurrently; the first failure aborts the whole
    ///  reconstruction and no dag is returned.
    pub async fn reconstruct<S>(&self, store: S) -> Result<Dag<S>, BundleError>
    where
        S: NodeStore + BlockStore,
    {
        let cids = self.derive_cids(store.scheme())?;
        tracing::debug!(
            "reconstructing dag {} from {} nodes",
            self.tip,
            self.nodes.len()
        );

        let target = &store;
        let writes = cids
            .into_iter()
            .zip(self.nodes.iter().cloned())
            .map(|(cid, data)| async move {
                target
                    .put_block(&cid, data)
                    .await
                    .map_err(|source| BundleError::Write { cid, source })
            });
        try_join_all(writes).await?;

        Ok(Dag::new(self.tip, store))
    }

    pub fn encode(&self) -> Result<Vec<u8>, BundleError> {
        let envelope = BundleEnvelope {
            tip: self.tip,
            dag: self
                .nodes
                .iter()
                .map(|node| ByteBuf::from(node.to_vec()))
                .collect(),
        };
        Ok(envelope.encode()?)
    }

    pub fn decode(data: &[u8]) -> Result<Self, BundleError> {
        let envelope = BundleEnvelope::decode(data)?;
        Ok(Self {
            tip: envelope.tip,
            nodes: envelope
                .dag
                .into_iter()
                .map(|node| Bytes::from(node.into_vec()))
                .collect(),
        })
    }

    pub fn to_base64(&self) -> Result<String, BundleError> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.encode()?))
    }

    pub fn from_base64(text: &str) -> Result<Self, BundleError> {
        let data = base64::engine::general_purpose::STANDARD.decode(text.trim())?;
        Self::decode(&data)
    }
}

impl<S> Dag<S>
where
    S: NodeStore + BlockStore,
{
    /// Export everything reachable from the current tip
    pub async fn export(&self) -> Result<Bundle, BundleError> {
        Bundle::export(self.store(), self.tip()).await
    }
}

/// Decode a DAG-CBOR encoded bundle and reconstruct it into `store`.
/// A corrupt bundle fails before anything is written.
pub async fn reconstruct_from_bundle<S>(data: &[u8], store: S) -> Result<Dag<S>, BundleError>
where
    S: NodeStore + BlockStore,
{
    let bundle = Bundle::decode(data)?;
    bundle.reconstruct(store).await
}

/// Same as [`reconstruct_from_bundle`] for the base64 text form
pub async fn reconstruct_from_base64<S>(text: &str, store: S) -> Result<Dag<S>, BundleError>
where
    S: NodeStore + BlockStore,
{
    let bundle = Bundle::from_base64(text)?;
    bundle.reconstruct(store).await
}
