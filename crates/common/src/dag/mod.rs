//! Chain tree DAGs
//!
//! A [`Dag`] is nothing more than a tip (the cid of its current root)
//!  and a store to resolve through. It never owns node bytes.
//!
//! ```text
//!   tip ──> { child: <link> } ──> { foo: "bar" }
//!
//!   resolve(["child", "foo"])          -> { remainderPath: [],                value: "bar" }
//!   resolve(["child", "other"])        -> { remainderPath: ["other"],         value: null  }
//!   resolve(["child", "foo", "nope"])  -> { remainderPath: ["foo", "nope"],   value: null  }
//! ```
//!
//! Bundles ([`Bundle`]) move a whole DAG between stores: every node
//!  reachable from a tip plus the tip itself.

use futures::StreamExt;

use crate::linked_data::{Cid, LinkedData};
use crate::store::{NodeStore, StoreError};

mod bundle;

pub use bundle::{reconstruct_from_base64, reconstruct_from_bundle, Bundle, BundleError};

#[derive(Debug, thiserror::Error)]
pub enum DagError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// The outcome of resolving a path.
/// Either the whole path was consumed and `value` is what it
///  addresses, or `remainder_path` holds the segments that could
///  not be descended into and `value` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub remainder_path: Vec<String>,
    pub value: Option<LinkedData>,
}

impl Resolution {
    fn resolved(value: LinkedData) -> Self {
        Self {
            remainder_path: Vec::new(),
            value: Some(value),
        }
    }

    fn unresolved(remainder_path: Vec<String>) -> Self {
        Self {
            remainder_path,
            value: None,
        }
    }

    /// Whether the full path was consumed
    pub fn is_resolved(&self) -> bool {
        self.remainder_path.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Dag<S> {
    tip: Cid,
    store: S,
}

impl<S: NodeStore> Dag<S> {
    pub fn new(tip: Cid, store: S) -> Self {
        Self { tip, store }
    }

    pub fn tip(&self) -> &Cid {
        &self.tip
    }

    /// Point the dag at a new root, i.e. after the tree
    ///  was written to elsewhere
    pub fn set_tip(&mut self, tip: Cid) {
        self.tip = tip;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Fetch a single decoded node
    pub async fn get(&self, cid: &Cid) -> Result<LinkedData, DagError> {
        Ok(self.store.get(cid).await?)
    }

    /// Resolve `path` from the dag's tip
    pub async fn resolve<P: AsRef<str>>(&self, path: &[P]) -> Result<Resolution, DagError> {
        self.resolve_at(&self.tip, path).await
    }

    /// Resolve `path` from an arbitrary root, ignoring the tip
    pub async fn resolve_at<P: AsRef<str>>(
        &self,
        root: &Cid,
        path: &[P],
    ) -> Result<Resolution, DagError> {
        let joined = path
            .iter()
            .map(|segment| segment.as_ref())
            .collect::<Vec<_>>()
            .join("/");

        let mut steps = self.store.resolve(*root, &joined);
        let mut last = None;
        while let Some(step) = steps.next().await {
            match step {
                Ok(step) => last = Some(step),
                // a missing property just ends the descent,
                //  the last good step says where we stopped
                Err(StoreError::KeyNotFound { .. }) => break,
                Err(err) => return Err(err.into()),
            }
        }

        let Some(last) = last else {
            // nothing was resolvable, the whole path is the remainder
            return Ok(Resolution::unresolved(
                path.iter().map(|s| s.as_ref().to_string()).collect(),
            ));
        };

        if last.remainder_path.is_empty() {
            Ok(Resolution::resolved(last.value))
        } else {
            Ok(Resolution::unresolved(
                last.remainder_path.split('/').map(str::to_string).collect(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::store::{BlockStore, MemoryStore};

    #[tokio::test]
    async fn test_set_tip_changes_resolution_root() {
        let store = MemoryStore::default();
        let first = store
            .put_node(&LinkedData::Map(BTreeMap::from([(
                "v".to_string(),
                LinkedData::Integer(1),
            )])))
            .await
            .unwrap();
        let second = store
            .put_node(&LinkedData::Map(BTreeMap::from([(
                "v".to_string(),
                LinkedData::Integer(2),
            )])))
            .await
            .unwrap();

        let mut dag = Dag::new(first, store);
        assert_eq!(
            dag.resolve(&["v"]).await.unwrap().value,
            Some(LinkedData::Integer(1))
        );

        dag.set_tip(second);
        assert_eq!(dag.tip(), &second);
        assert_eq!(
            dag.resolve(&["v"]).await.unwrap().value,
            Some(LinkedData::Integer(2))
        );
    }

    #[test]
    fn test_resolution_is_resolved() {
        let resolution = Resolution::unresolved(vec!["other".to_string()]);
        assert!(!resolution.is_resolved());

        let resolution = Resolution::resolved(LinkedData::Bool(true));
        assert!(resolution.is_resolved());
        assert_eq!(resolution.value, Some(LinkedData::Bool(true)));
    }
}
