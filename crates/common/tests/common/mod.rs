//! Shared test utilities for dag integration tests
#![allow(dead_code)]

use std::collections::BTreeMap;

use ::common::prelude::*;

/// `{ child: <link to { foo: "bar" }> }`
pub struct ParentChild {
    pub store: MemoryStore,
    pub parent: Cid,
    pub child: Cid,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn map(entries: Vec<(&str, LinkedData)>) -> LinkedData {
    LinkedData::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>(),
    )
}

pub fn string(value: &str) -> LinkedData {
    LinkedData::String(value.to_string())
}

pub fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

/// Set up the parent / child tree in a fresh memory store
pub async fn setup_parent_child() -> ParentChild {
    init_tracing();
    let store = MemoryStore::default();

    let child = store
        .put_node(&map(vec![("foo", string("bar"))]))
        .await
        .unwrap();
    let parent = store
        .put_node(&map(vec![("child", LinkedData::Link(child))]))
        .await
        .unwrap();

    ParentChild {
        store,
        parent,
        child,
    }
}
