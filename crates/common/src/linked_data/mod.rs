//! Thin wrapper around IPLD, renamed to something
//!  a little more down-to-earth.
//!
//! - [`LinkedData`] is a decoded node value
//! - [`Cid`] names (and authenticates) the bytes of a node
//! - [`CidScheme`] derives a [`Cid`] from encoded bytes
//! - [`BlockEncoded`] gives a type DAG-CBOR encode / decode

use serde::{de::DeserializeOwned, Serialize};

mod scheme;

pub use cid::Cid;
pub use ipld_core::ipld::Ipld as LinkedData;
pub use scheme::{CidBuilder, CidError, CidScheme, HashAlgorithm};

/// Multicodec code for DAG-CBOR encoded nodes
pub const LD_DAG_CBOR_CODEC: u64 = 0x71;
/// Multicodec code for opaque raw blocks
pub const LD_RAW_CODEC: u64 = 0x55;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("dag-cbor encode error: {0}")]
    Encode(String),
    #[error("dag-cbor decode error: {0}")]
    Decode(String),
    #[error("unsupported codec: {0:#x}")]
    Unsupported(u64),
}

/// A codec able to turn serde types into block bytes and back
pub trait Codec: Send + Sync {
    /// The multicodec code blocks encoded with this codec are tagged with
    const CODE: u64;

    fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError>;
    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DagCborCodec;

impl Codec for DagCborCodec {
    const CODE: u64 = LD_DAG_CBOR_CODEC;

    fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
        serde_ipld_dagcbor::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
        serde_ipld_dagcbor::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// Implement for any type that is stored as a block
///  under codec `C`
pub trait BlockEncoded<C: Codec>: Serialize + DeserializeOwned + Sized {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        C::encode(self)
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        C::decode(bytes)
    }
}

impl BlockEncoded<DagCborCodec> for LinkedData {}

/// Decode a block into linked data, picking the codec
///  from the cid that addresses it
pub fn decode_block(cid: &Cid, bytes: &[u8]) -> Result<LinkedData, CodecError> {
    match cid.codec() {
        LD_DAG_CBOR_CODEC => DagCborCodec::decode(bytes),
        LD_RAW_CODEC => Ok(LinkedData::Bytes(bytes.to_vec())),
        other => Err(CodecError::Unsupported(other)),
    }
}

/// Collect every link held anywhere inside a value,
///  in document order
pub fn links(value: &LinkedData) -> Vec<Cid> {
    let mut found = Vec::new();
    collect_links(value, &mut found);
    found
}

fn collect_links(value: &LinkedData, found: &mut Vec<Cid>) {
    match value {
        LinkedData::Link(cid) => found.push(*cid),
        LinkedData::List(items) => items.iter().for_each(|item| collect_links(item, found)),
        LinkedData::Map(map) => map.values().for_each(|item| collect_links(item, found)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_decode_block_by_codec() {
        let value = LinkedData::Map(BTreeMap::from([(
            "foo".to_string(),
            LinkedData::String("bar".to_string()),
        )]));
        let bytes = value.encode().unwrap();

        let cid = CidBuilder::default().derive(&bytes).unwrap();
        assert_eq!(decode_block(&cid, &bytes).unwrap(), value);

        let raw = CidBuilder::new(LD_RAW_CODEC, HashAlgorithm::Sha2_256)
            .derive(&bytes)
            .unwrap();
        assert_eq!(
            decode_block(&raw, &bytes).unwrap(),
            LinkedData::Bytes(bytes.clone())
        );

        let unknown = CidBuilder::new(0x0129, HashAlgorithm::Sha2_256)
            .derive(&bytes)
            .unwrap();
        assert!(matches!(
            decode_block(&unknown, &bytes),
            Err(CodecError::Unsupported(0x0129))
        ));
    }

    #[test]
    fn test_links_walks_nested_values() {
        let scheme = CidBuilder::default();
        let a = scheme.derive(b"a").unwrap();
        let b = scheme.derive(b"b").unwrap();

        let value = LinkedData::Map(BTreeMap::from([
            ("first".to_string(), LinkedData::Link(a)),
            (
                "second".to_string(),
                LinkedData::List(vec![LinkedData::Integer(1), LinkedData::Link(b)]),
            ),
            ("third".to_string(), LinkedData::Null),
        ]));

        assert_eq!(links(&value), vec![a, b]);
        assert!(links(&LinkedData::String("leaf".to_string())).is_empty());
    }

    #[test]
    fn test_decode_garbage_fails() {
        let cid = CidBuilder::default().derive(b"not cbor").unwrap();
        assert!(matches!(
            decode_block(&cid, &[0xff, 0x00, 0x13]),
            Err(CodecError::Decode(_))
        ));
    }
}
