//! Tests for node tree stores.

use serde_json::json;

use crate::store::{FileStore, MemoryStore, NodeTreeStore, PROFILE_FILENAME, StoreError};
use crate::types::NodeTreeOut;

fn sample() -> NodeTreeOut {
  serde_json::from_value(json!({"nodes": [
    {"type": "Blur", "id": "n1", "settings": {"radius": 5}, "inputs": {"img": null}}
  ]}))
  .unwrap()
}

#[test]
fn file_store_roundtrip_per_profile() {
  let dir = tempfile::tempdir().unwrap();
  let mut store = FileStore::open(dir.path()).unwrap();
  assert_eq!(store.profile(), 0);
  assert!(store.load().unwrap().nodes.is_empty());

  store.save(&sample()).unwrap();
  assert!(store.nodetree_path(0).exists());
  assert_eq!(store.load().unwrap(), sample());

  store.set_profile(3).unwrap();
  assert!(store.load().unwrap().nodes.is_empty());
  store.set_profile(0).unwrap();
  assert_eq!(store.load().unwrap(), sample());
}

#[test]
fn file_store_restores_selected_profile() {
  let dir = tempfile::tempdir().unwrap();
  {
    let mut store = FileStore::open(dir.path()).unwrap();
    store.set_profile(7).unwrap();
    store.save(&sample()).unwrap();
  }
  assert!(dir.path().join(PROFILE_FILENAME).exists());
  let store = FileStore::open(dir.path()).unwrap();
  assert_eq!(store.profile(), 7);
  assert_eq!(store.load().unwrap(), sample());
}

#[test]
fn file_store_rejects_corrupt_tree() {
  let dir = tempfile::tempdir().unwrap();
  let store = FileStore::open(dir.path()).unwrap();
  std::fs::write(store.nodetree_path(0), "{not json").unwrap();
  assert!(matches!(store.load(), Err(StoreError::Json(_))));
}

#[test]
fn profiles_are_bounded() {
  let dir = tempfile::tempdir().unwrap();
  let mut file = FileStore::open(dir.path()).unwrap();
  assert!(matches!(
    file.set_profile(10),
    Err(StoreError::ProfileOutOfRange(10))
  ));
  assert_eq!(file.profile(), 0);

  let mut memory = MemoryStore::default();
  assert!(memory.set_profile(9).is_ok());
  assert!(memory.set_profile(10).is_err());
  assert_eq!(memory.profile(), 9);
}

#[test]
fn memory_store_keeps_trees_per_profile() {
  let mut store = MemoryStore::default();
  store.save(&sample()).unwrap();
  store.set_profile(1).unwrap();
  assert!(store.load().unwrap().nodes.is_empty());
  store.set_profile(0).unwrap();
  assert_eq!(store.load().unwrap(), sample());
}
