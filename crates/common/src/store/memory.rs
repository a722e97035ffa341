use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use super::{BlockStore, NodeStore, StoreError};
use crate::linked_data::{decode_block, Cid, CidBuilder, CidScheme, LinkedData};

/// In-memory block store using a HashMap
#[derive(Debug, Clone)]
pub struct MemoryStore {
    blocks: Arc<RwLock<HashMap<Cid, Bytes>>>,
    scheme: Arc<dyn CidScheme>,
}

impl MemoryStore {
    pub fn new(scheme: impl CidScheme + 'static) -> Self {
        Self {
            blocks: Arc::new(RwLock::new(HashMap::new())),
            scheme: Arc::new(scheme),
        }
    }

    /// Number of blocks currently held
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<Cid, Bytes>>, StoreError> {
        self.blocks.read().map_err(|e| {
            StoreError::Backend(anyhow::anyhow!("failed to acquire read lock: {}", e))
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(CidBuilder::default())
    }
}

#[async_trait]
impl BlockStore for MemoryStore {
    fn scheme(&self) -> &dyn CidScheme {
        self.scheme.as_ref()
    }

    async fn put_block(&self, cid: &Cid, data: Bytes) -> Result<(), StoreError> {
        let mut blocks = self.blocks.write().map_err(|e| {
            StoreError::Backend(anyhow::anyhow!("failed to acquire write lock: {}", e))
        })?;
        blocks.entry(*cid).or_insert(data);
        Ok(())
    }

    async fn get_block(&self, cid: &Cid) -> Result<Bytes, StoreError> {
        self.read()?
            .get(cid)
            .cloned()
            .ok_or(StoreError::NotFound(*cid))
    }

    async fn has_block(&self, cid: &Cid) -> Result<bool, StoreError> {
        Ok(self.read()?.contains_key(cid))
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn get(&self, cid: &Cid) -> Result<LinkedData, StoreError> {
        let data = self.get_block(cid).await?;
        Ok(decode_block(cid, &data)?)
    }
}
