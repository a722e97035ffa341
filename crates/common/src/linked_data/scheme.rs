use std::fmt::Debug;
use std::str::FromStr;

use multihash::Multihash;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{Cid, LD_DAG_CBOR_CODEC};

/// Multihash code for SHA2-256
pub const SHA2_256_CODE: u64 = 0x12;
/// Multihash code for BLAKE3 (32 byte digest)
pub const BLAKE3_CODE: u64 = 0x1e;

#[derive(Debug, thiserror::Error)]
pub enum CidError {
    #[error("multihash error: {0}")]
    Multihash(#[from] multihash::Error),
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedHash(String),
    #[error("cid is not addressable by this store: {0}")]
    Unaddressable(Cid),
}

/// Derives the content identifier for a blob of encoded bytes.
/// Every store carries one of these; the same scheme the nodes were
///  originally produced with has to be used to re-derive their cids.
pub trait CidScheme: Send + Sync + Debug {
    fn derive(&self, data: &[u8]) -> Result<Cid, CidError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HashAlgorithm {
    #[default]
    #[serde(rename = "sha2-256")]
    Sha2_256,
    #[serde(rename = "blake3")]
    Blake3,
}

impl HashAlgorithm {
    /// The multihash code digests of this algorithm are tagged with
    pub fn code(&self) -> u64 {
        match self {
            HashAlgorithm::Sha2_256 => SHA2_256_CODE,
            HashAlgorithm::Blake3 => BLAKE3_CODE,
        }
    }

    pub fn digest(&self, data: &[u8]) -> Result<Multihash<64>, CidError> {
        let multihash = match self {
            HashAlgorithm::Sha2_256 => {
                Multihash::wrap(self.code(), Sha256::digest(data).as_slice())
            }
            HashAlgorithm::Blake3 => Multihash::wrap(self.code(), blake3::hash(data).as_bytes()),
        }?;
        Ok(multihash)
    }
}

impl FromStr for HashAlgorithm {
    type Err = CidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha2-256" | "sha256" => Ok(HashAlgorithm::Sha2_256),
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(CidError::UnsupportedHash(other.to_string())),
        }
    }
}

/// CIDv1 derivation over a fixed codec and hash algorithm.
/// Defaults to DAG-CBOR + SHA2-256, which is what chain tree
///  nodes are produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidBuilder {
    codec: u64,
    hash: HashAlgorithm,
}

impl Default for CidBuilder {
    fn default() -> Self {
        Self::new(LD_DAG_CBOR_CODEC, HashAlgorithm::Sha2_256)
    }
}

impl CidBuilder {
    pub const fn new(codec: u64, hash: HashAlgorithm) -> Self {
        Self { codec, hash }
    }

    /// DAG-CBOR nodes hashed with the given algorithm
    pub const fn dag_cbor(hash: HashAlgorithm) -> Self {
        Self::new(LD_DAG_CBOR_CODEC, hash)
    }

    pub fn codec(&self) -> u64 {
        self.codec
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }
}

impl CidScheme for CidBuilder {
    fn derive(&self, data: &[u8]) -> Result<Cid, CidError> {
        Ok(Cid::new_v1(self.codec, self.hash.digest(data)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let scheme = CidBuilder::default();
        let a = scheme.derive(b"hello").unwrap();
        let b = scheme.derive(b"hello").unwrap();
        let c = scheme.derive(b"hello!").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.codec(), LD_DAG_CBOR_CODEC);
        assert_eq!(a.hash().code(), SHA2_256_CODE);
        assert_eq!(a.hash().digest(), Sha256::digest(b"hello").as_slice());
    }

    #[test]
    fn test_hash_algorithm_changes_cid() {
        let sha = CidBuilder::dag_cbor(HashAlgorithm::Sha2_256)
            .derive(b"data")
            .unwrap();
        let blake = CidBuilder::dag_cbor(HashAlgorithm::Blake3)
            .derive(b"data")
            .unwrap();

        assert_ne!(sha, blake);
        assert_eq!(blake.hash().code(), BLAKE3_CODE);
        assert_eq!(blake.hash().digest(), blake3::hash(b"data").as_bytes());
    }

    #[test]
    fn test_hash_algorithm_from_str() {
        assert_eq!(
            "sha2-256".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha2_256
        );
        assert_eq!(
            "blake3".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Blake3
        );
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }
}
