//! Tests for `Program`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::config::WireConfig;
use crate::import::ImportErrorKind;
use crate::program::{Program, ProgramError};
use crate::registry::FunctionRegistry;
use crate::store::{MemoryStore, NodeTreeStore};
use crate::types::NodeTreeOut;

fn program_with(store: MemoryStore) -> Program {
  Program::new(
    Arc::new(FunctionRegistry::builtin()),
    WireConfig::default(),
    store,
  )
  .unwrap()
}

fn tree(value: serde_json::Value) -> NodeTreeOut {
  serde_json::from_value(value).unwrap()
}

// Listed in id order, as export emits them.
fn blur_tree(radius: i64) -> NodeTreeOut {
  tree(json!({"nodes": [
    {"type": "Blur", "id": "blur", "settings": {"radius": radius},
     "inputs": {"img": {"id": "cam", "name": "img"}}},
    {"type": "CameraInput", "id": "cam", "settings": {}, "inputs": {}}
  ]}))
}

#[tokio::test]
async fn catalog_is_built_at_construction() {
  let program = program_with(MemoryStore::default());
  let funcs = program.catalog().funcs.as_ref().unwrap();
  assert!(funcs.iter().any(|f| f.type_name == "Blur"));
  assert!(program.catalog().modules.is_none());
}

#[tokio::test]
async fn save_imports_then_stores() {
  let program = program_with(MemoryStore::default());
  program.save_nodetree(&blur_tree(3)).await.unwrap();
  assert_eq!(program.export_nodetree().await, blur_tree(3));
}

#[tokio::test]
async fn rejected_tree_is_not_stored() {
  let program = program_with(MemoryStore::default());
  program.save_nodetree(&blur_tree(3)).await.unwrap();

  let bad = tree(json!({"nodes": [
    {"type": "Sharpen", "id": "s", "settings": {}, "inputs": {}}
  ]}));
  let err = program.save_nodetree(&bad).await.unwrap_err();
  assert!(matches!(
    err,
    ProgramError::Import(ref e) if e.kind == ImportErrorKind::UnknownNodeType
  ));

  // Switching back to the same profile reloads what was last accepted.
  program.select_profile(0).await.unwrap();
  assert_eq!(program.export_nodetree().await, blur_tree(3));
}

#[tokio::test]
async fn profiles_hold_separate_trees() {
  let program = program_with(MemoryStore::default());
  program.save_nodetree(&blur_tree(3)).await.unwrap();

  assert_eq!(program.select_profile(4).await.unwrap(), Some(4));
  assert_eq!(program.profile().await, 4);
  assert!(program.export_nodetree().await.nodes.is_empty());
  program.save_nodetree(&blur_tree(9)).await.unwrap();

  assert_eq!(program.select_profile(0).await.unwrap(), Some(0));
  assert_eq!(program.export_nodetree().await, blur_tree(3));
}

#[tokio::test]
async fn out_of_range_profile_changes_nothing() {
  let program = program_with(MemoryStore::default());
  program.save_nodetree(&blur_tree(3)).await.unwrap();
  assert_eq!(program.select_profile(10).await.unwrap(), None);
  assert_eq!(program.select_profile(u32::MAX).await.unwrap(), None);
  assert_eq!(program.profile().await, 0);
  assert_eq!(program.export_nodetree().await, blur_tree(3));
}

#[tokio::test]
async fn load_current_imports_stored_tree() {
  let mut store = MemoryStore::default();
  store.set_profile(2).unwrap();
  store.save(&blur_tree(5)).unwrap();

  let program = program_with(store);
  assert!(program.export_nodetree().await.nodes.is_empty());
  assert_eq!(program.load_current().await.unwrap(), 2);
  assert_eq!(program.export_nodetree().await, blur_tree(5));
}

#[tokio::test]
async fn misspelled_link_is_rejected_and_not_stored() {
  let program = program_with(MemoryStore::default());
  program.save_nodetree(&blur_tree(3)).await.unwrap();

  let typo = tree(json!({"nodes": [
    {"type": "Blur", "id": "blur", "settings": {"radius": 3},
     "inputs": {"img": {"id": "camm", "name": "img"}}},
    {"type": "CameraInput", "id": "cam", "settings": {}, "inputs": {}}
  ]}));
  let err = program.save_nodetree(&typo).await.unwrap_err();
  assert!(matches!(
    err,
    ProgramError::Import(ref e) if matches!(e.kind, ImportErrorKind::DanglingLink { .. })
  ));

  program.select_profile(0).await.unwrap();
  assert_eq!(program.export_nodetree().await, blur_tree(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn save_during_profile_switch_lands_after_it() {
  let program = Arc::new(program_with(MemoryStore::default()));
  let pipeline = program.pipeline();
  let held = pipeline.lock().await;

  let switch = {
    let program = program.clone();
    tokio::spawn(async move { program.select_profile(1).await })
  };
  while pipeline.waiting() < 1 {
    tokio::time::sleep(Duration::from_millis(1)).await;
  }

  let save = {
    let program = program.clone();
    tokio::spawn(async move { program.save_nodetree(&blur_tree(7)).await })
  };
  tokio::time::sleep(Duration::from_millis(20)).await;
  // The save waits on the store behind the switch, not on the pipeline.
  assert_eq!(pipeline.waiting(), 1);

  drop(held);
  assert_eq!(switch.await.unwrap().unwrap(), Some(1));
  save.await.unwrap().unwrap();

  assert_eq!(program.profile().await, 1);
  assert_eq!(program.export_nodetree().await, blur_tree(7));
  program.select_profile(1).await.unwrap();
  assert_eq!(program.export_nodetree().await, blur_tree(7));
}
