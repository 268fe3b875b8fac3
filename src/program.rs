//! Shared server state: registry, cached catalog, the locked pipeline and the
//! node tree store.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use crate::catalog::export_catalog;
use crate::config::WireConfig;
use crate::encoder::EncodeError;
use crate::export::export_nodetree;
use crate::fifo_lock::FifoLock;
use crate::import::{NodeTreeImportError, import_nodetree};
use crate::registry::FunctionRegistry;
use crate::store::{NodeTreeStore, PROFILE_COUNT, StoreError};
use crate::types::{NodeTreeOut, Pipeline, SchemaOut};

#[derive(Debug, Error)]
pub enum ProgramError {
  #[error("catalog cannot be exported: {0}")]
  Catalog(#[from] EncodeError),
  #[error(transparent)]
  Import(#[from] NodeTreeImportError),
  #[error(transparent)]
  Store(#[from] StoreError),
}

pub struct Program {
  registry: Arc<FunctionRegistry>,
  catalog: SchemaOut,
  config: WireConfig,
  pipeline: Arc<FifoLock<Pipeline>>,
  store: tokio::sync::Mutex<Box<dyn NodeTreeStore>>,
}

impl Program {
  /// Builds the catalog up front; a registry with an unencodable parameter
  /// type is rejected here rather than on every request.
  pub fn new(
    registry: Arc<FunctionRegistry>,
    config: WireConfig,
    store: impl NodeTreeStore + 'static,
  ) -> Result<Self, ProgramError> {
    let catalog = export_catalog(&registry, &config)?;
    Ok(Self {
      registry,
      catalog,
      config,
      pipeline: Arc::new(FifoLock::new(Pipeline::new())),
      store: tokio::sync::Mutex::new(Box::new(store)),
    })
  }

  pub fn catalog(&self) -> &SchemaOut {
    &self.catalog
  }

  pub fn config(&self) -> &WireConfig {
    &self.config
  }

  pub fn registry(&self) -> &FunctionRegistry {
    &self.registry
  }

  /// The lock the execution loop competes on.
  pub fn pipeline(&self) -> Arc<FifoLock<Pipeline>> {
    self.pipeline.clone()
  }

  pub async fn export_nodetree(&self) -> NodeTreeOut {
    let pipeline = self.pipeline.lock().await;
    export_nodetree(&pipeline, &self.config)
  }

  /// Reconciles the pipeline with `tree` in one critical section.
  #[instrument(level = "trace", skip(self, tree))]
  pub async fn import_nodetree(&self, tree: &NodeTreeOut) -> Result<(), NodeTreeImportError> {
    let mut pipeline = self.pipeline.lock().await;
    import_nodetree(&mut pipeline, &self.registry, &self.config, tree)
  }

  /// Imports `tree` and, only if that succeeds, stores it under the current
  /// profile.
  ///
  /// The store stays locked across the import, so a concurrent profile switch
  /// cannot land between the two. Lock order is always store, then pipeline.
  pub async fn save_nodetree(&self, tree: &NodeTreeOut) -> Result<(), ProgramError> {
    let mut store = self.store.lock().await;
    self.import_nodetree(tree).await?;
    store.save(tree)?;
    Ok(())
  }

  /// Imports whatever the current profile holds.
  pub async fn load_current(&self) -> Result<u32, ProgramError> {
    let store = self.store.lock().await;
    let tree = store.load()?;
    self.import_nodetree(&tree).await?;
    Ok(store.profile())
  }

  /// Switches to `profile` and imports its tree. Profiles past the last one
  /// are ignored and yield `None`.
  #[instrument(level = "trace", skip(self))]
  pub async fn select_profile(&self, profile: u32) -> Result<Option<u32>, ProgramError> {
    if profile >= PROFILE_COUNT {
      return Ok(None);
    }
    let mut store = self.store.lock().await;
    store.set_profile(profile)?;
    let tree = store.load()?;
    self.import_nodetree(&tree).await?;
    info!(profile, nodes = tree.nodes.len(), "profile selected");
    Ok(Some(profile))
  }

  pub async fn profile(&self) -> u32 {
    self.store.lock().await.profile()
  }
}
