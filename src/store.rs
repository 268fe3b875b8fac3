//! Node tree persistence: one stored tree per settings profile (JSON).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::types::NodeTreeOut;

/// Number of selectable profiles; valid profiles are `0..PROFILE_COUNT`.
pub const PROFILE_COUNT: u32 = 10;
/// Filename recording the selected profile under the store directory.
pub const PROFILE_FILENAME: &str = "profile.json";

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("store I/O error: {0}")]
  Io(#[from] std::io::Error),
  #[error("stored JSON is invalid: {0}")]
  Json(#[from] serde_json::Error),
  #[error("profile {0} is out of range")]
  ProfileOutOfRange(u32),
}

/// Where accepted node trees go, and where profiles are loaded from.
pub trait NodeTreeStore: Send {
  /// Currently selected profile.
  fn profile(&self) -> u32;

  fn set_profile(&mut self, profile: u32) -> Result<(), StoreError>;

  /// Tree saved for the current profile; empty when nothing was saved yet.
  fn load(&self) -> Result<NodeTreeOut, StoreError>;

  /// Saves `tree` as the current profile's tree.
  fn save(&mut self, tree: &NodeTreeOut) -> Result<(), StoreError>;
}

fn check_profile(profile: u32) -> Result<(), StoreError> {
  if profile < PROFILE_COUNT {
    Ok(())
  } else {
    Err(StoreError::ProfileOutOfRange(profile))
  }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredProfile {
  profile: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredNodeTree {
  profile: u32,
  saved_at: DateTime<Utc>,
  nodetree: NodeTreeOut,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
  let json = serde_json::to_string_pretty(value)?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, json)?;
  Ok(())
}

/// Reads `path`; `None` if the file does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
  match std::fs::read(path) {
    Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e.into()),
  }
}

/// Stores each profile's tree as `nodetree_<n>.json` in one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
  dir: PathBuf,
  profile: u32,
}

impl FileStore {
  /// Opens the store at `dir`, restoring the last selected profile.
  #[instrument(level = "trace", skip(dir))]
  pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
    let dir = dir.into();
    let profile = read_json::<StoredProfile>(&dir.join(PROFILE_FILENAME))?
      .map(|p| p.profile)
      .unwrap_or(0);
    check_profile(profile)?;
    debug!(dir = %dir.display(), profile, "node tree store opened");
    Ok(Self { dir, profile })
  }

  pub fn nodetree_path(&self, profile: u32) -> PathBuf {
    self.dir.join(format!("nodetree_{}.json", profile))
  }
}

impl NodeTreeStore for FileStore {
  fn profile(&self) -> u32 {
    self.profile
  }

  fn set_profile(&mut self, profile: u32) -> Result<(), StoreError> {
    check_profile(profile)?;
    write_json(&self.dir.join(PROFILE_FILENAME), &StoredProfile { profile })?;
    self.profile = profile;
    Ok(())
  }

  fn load(&self) -> Result<NodeTreeOut, StoreError> {
    Ok(
      read_json::<StoredNodeTree>(&self.nodetree_path(self.profile))?
        .map(|stored| stored.nodetree)
        .unwrap_or_default(),
    )
  }

  fn save(&mut self, tree: &NodeTreeOut) -> Result<(), StoreError> {
    let stored = StoredNodeTree {
      profile: self.profile,
      saved_at: Utc::now(),
      nodetree: tree.clone(),
    };
    write_json(&self.nodetree_path(self.profile), &stored)
  }
}

/// In-process store; nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  profile: u32,
  trees: HashMap<u32, NodeTreeOut>,
}

impl NodeTreeStore for MemoryStore {
  fn profile(&self) -> u32 {
    self.profile
  }

  fn set_profile(&mut self, profile: u32) -> Result<(), StoreError> {
    check_profile(profile)?;
    self.profile = profile;
    Ok(())
  }

  fn load(&self) -> Result<NodeTreeOut, StoreError> {
    Ok(self.trees.get(&self.profile).cloned().unwrap_or_default())
  }

  fn save(&mut self, tree: &NodeTreeOut) -> Result<(), StoreError> {
    self.trees.insert(self.profile, tree.clone());
    Ok(())
  }
}
