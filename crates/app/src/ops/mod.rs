use std::path::{Path, PathBuf};

use common::prelude::{Bundle, BundleError};

pub mod export;
pub mod import;
pub mod init;
pub mod inspect;
pub mod resolve;

pub use export::Export;
pub use import::Import;
pub use init::Init;
pub use inspect::Inspect;
pub use resolve::Resolve;

#[derive(Debug, thiserror::Error)]
pub enum BundleFileError {
    #[error("failed to read bundle file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid bundle: {0}")]
    Bundle(#[from] BundleError),
}

/// Read a bundle file. Text files are taken as base64,
///  anything else as raw DAG-CBOR.
pub fn read_bundle(path: &Path) -> Result<Bundle, BundleFileError> {
    let data = std::fs::read(path).map_err(|source| BundleFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let bundle = match std::str::from_utf8(&data) {
        Ok(text) => Bundle::from_base64(text)?,
        Err(_) => Bundle::decode(&data)?,
    };
    tracing::debug!(
        "read bundle {} with {} nodes from {:?}",
        bundle.tip(),
        bundle.nodes().len(),
        path
    );
    Ok(bundle)
}

#[cfg(test)]
pub mod testkit {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    use common::prelude::*;

    /// `{ child: <link to { foo: "bar" }> }` with cids derived by `hash`
    pub async fn parent_child_bundle(hash: HashAlgorithm) -> Bundle {
        let store = MemoryStore::new(CidBuilder::dag_cbor(hash));
        let child = store
            .put_node(&LinkedData::Map(BTreeMap::from([(
                "foo".to_string(),
                LinkedData::String("bar".to_string()),
            )])))
            .await
            .unwrap();
        let parent = store
            .put_node(&LinkedData::Map(BTreeMap::from([(
                "child".to_string(),
                LinkedData::Link(child),
            )])))
            .await
            .unwrap();
        Bundle::export(&store, &parent).await.unwrap()
    }

    /// Write `bundle` as base64 text into `dir`
    pub fn write_bundle(dir: &Path, bundle: &Bundle) -> PathBuf {
        let path = dir.join("bundle.b64");
        std::fs::write(&path, bundle.to_base64().unwrap()).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::testkit::parent_child_bundle;
    use super::*;
    use common::prelude::HashAlgorithm;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_bundle_text_and_binary() {
        let temp = TempDir::new().unwrap();
        let bundle = parent_child_bundle(HashAlgorithm::Sha2_256).await;

        let text_path = temp.path().join("bundle.b64");
        std::fs::write(&text_path, format!("{}\n", bundle.to_base64().unwrap())).unwrap();
        assert_eq!(read_bundle(&text_path).unwrap(), bundle);

        let raw_path = temp.path().join("bundle.cbor");
        std::fs::write(&raw_path, bundle.encode().unwrap()).unwrap();
        assert_eq!(read_bundle(&raw_path).unwrap(), bundle);
    }

    #[test]
    fn test_read_bundle_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            read_bundle(&temp.path().join("missing")),
            Err(BundleFileError::Read { .. })
        ));
    }
}
