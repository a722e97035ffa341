use std::future::IntoFuture;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use iroh_blobs::{
    api::{
        blobs::{BlobStatus, Blobs},
        ExportBaoError, RequestError,
    },
    store::{fs::FsStore, mem::MemStore},
    BlobsProtocol, Hash,
};
use multihash::Multihash;

use super::{BlockStore, NodeStore, StoreError};
use crate::linked_data::{
    decode_block, Cid, CidBuilder, CidError, CidScheme, HashAlgorithm, LinkedData,
};

const BLAKE3_SCHEME: CidBuilder = CidBuilder::dag_cbor(HashAlgorithm::Blake3);

/// Block store over a local iroh-blob store.
/// iroh-blobs addresses content by BLAKE3, so this store
///  derives cids with DAG-CBOR + BLAKE3 and only accepts
///  cids carrying a BLAKE3 multihash.
#[derive(Clone, Debug)]
pub struct BlobsStore {
    pub inner: Arc<BlobsProtocol>,
}

impl Deref for BlobsStore {
    type Target = Arc<BlobsProtocol>;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BlobsStoreError {
    #[error("blobs store error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("blob store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("export bao error: {0}")]
    ExportBao(#[from] ExportBaoError),
    #[error("request error: {0}")]
    Request(#[from] RequestError),
}

impl From<BlobsStoreError> for StoreError {
    fn from(err: BlobsStoreError) -> Self {
        StoreError::Backend(anyhow!("{}", err))
    }
}

impl BlobsStore {
    /// Load a blob store from the given path on disk
    pub async fn fs(path: &Path) -> Result<Self, BlobsStoreError> {
        tracing::debug!("BlobsStore::fs called with path: {:?}", path);
        let store = FsStore::load(path).await?;
        let blobs = BlobsProtocol::new(&store, None);
        Ok(Self {
            inner: Arc::new(blobs),
        })
    }

    /// Load a memory blobs store
    pub async fn memory() -> Result<Self, BlobsStoreError> {
        let store = MemStore::new();
        let blobs = BlobsProtocol::new(&store, None);
        Ok(Self {
            inner: Arc::new(blobs),
        })
    }

    /// Get a handle to the underlying blobs client against
    ///  the store
    pub fn blobs(&self) -> &Blobs {
        self.inner.store().blobs()
    }

    /// Get a blob as bytes
    pub async fn get(&self, hash: &Hash) -> Result<Bytes, BlobsStoreError> {
        let bytes = self.blobs().get_bytes(*hash).await?;
        Ok(bytes)
    }

    /// Store bytes as a blob
    pub async fn put(&self, data: Bytes) -> Result<Hash, BlobsStoreError> {
        let hash = self.blobs().add_bytes(data).into_future().await?.hash;
        Ok(hash)
    }

    /// Check whether a blob is completely present
    pub async fn stat(&self, hash: &Hash) -> Result<bool, BlobsStoreError> {
        let stat = self
            .blobs()
            .status(*hash)
            .await
            .map_err(|err| BlobsStoreError::Default(anyhow!(err)))?;
        Ok(matches!(stat, BlobStatus::Complete { .. }))
    }

    /// The iroh hash a cid addresses, if it carries a BLAKE3 digest
    fn hash_for(cid: &Cid) -> Result<Hash, CidError> {
        let multihash = cid.hash();
        if multihash.code() != HashAlgorithm::Blake3.code() {
            return Err(CidError::Unaddressable(*cid));
        }
        let digest: [u8; 32] = multihash
            .digest()
            .try_into()
            .map_err(|_| CidError::Unaddressable(*cid))?;
        Ok(Hash::from_bytes(digest))
    }
}

#[async_trait]
impl BlockStore for BlobsStore {
    fn scheme(&self) -> &dyn CidScheme {
        &BLAKE3_SCHEME
    }

    async fn put_block(&self, cid: &Cid, data: Bytes) -> Result<(), StoreError> {
        let expected = Self::hash_for(cid)?;
        let actual = Hash::new(&data);
        if actual != expected {
            let multihash = Multihash::wrap(HashAlgorithm::Blake3.code(), actual.as_bytes())
                .map_err(CidError::from)?;
            return Err(StoreError::CidMismatch {
                expected: *cid,
                actual: Cid::new_v1(cid.codec(), multihash),
            });
        }
        let hash = self.put(data).await?;
        tracing::trace!("BlobsStore: stored {} as {}", cid, hash);
        Ok(())
    }

    async fn get_block(&self, cid: &Cid) -> Result<Bytes, StoreError> {
        let hash = Self::hash_for(cid)?;
        if !self.stat(&hash).await? {
            return Err(StoreError::NotFound(*cid));
        }
        Ok(self.get(&hash).await?)
    }

    async fn has_block(&self, cid: &Cid) -> Result<bool, StoreError> {
        let hash = Self::hash_for(cid)?;
        Ok(self.stat(&hash).await?)
    }
}

#[async_trait]
impl NodeStore for BlobsStore {
    async fn get(&self, cid: &Cid) -> Result<LinkedData, StoreError> {
        let data = self.get_block(cid).await?;
        Ok(decode_block(cid, &data)?)
    }
}
