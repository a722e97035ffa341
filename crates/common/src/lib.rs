/**
 * Chain tree DAGs: a tip plus a store to
 *  resolve paths through, and bundles for moving
 *  a whole tree between stores.
 */
pub mod dag;
/**
 * Internal wrapper around IPLD, renamed to
 *  something a little more down-to-earth.
 * Handles cids, codecs and the schemes cids
 *  are derived with.
 */
pub mod linked_data;
/**
 * Store adapters the DAG resolves through.
 *  An in-memory store, and a light wrapper
 *  around iroh-blobs for persistence.
 */
pub mod store;

pub mod prelude {
    pub use crate::dag::{
        reconstruct_from_base64, reconstruct_from_bundle, Bundle, BundleError, Dag, DagError,
        Resolution,
    };
    pub use crate::linked_data::{Cid, CidBuilder, CidError, CidScheme, HashAlgorithm, LinkedData};
    pub use crate::store::{BlobsStore, BlockStore, MemoryStore, NodeStore, StoreError};
}
