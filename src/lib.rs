//! # visionweave
//!
//! Live configuration of a vision processing pipeline.
//!
//! A pipeline is a graph of nodes, each an instance of a typed function
//! (image operator) with concrete settings and per-input links. Clients read
//! the function catalog and the current node tree over HTTP and submit a
//! desired tree, which is reconciled into the live pipeline under strict
//! validation. An execution loop on its own thread evaluates the pipeline
//! every frame.
//!
//! ## Architecture
//!
//! - `types`: pipeline graph model and wire shapes.
//! - `encoder`, `catalog`: parameter types and the registry in wire form.
//! - `export`, `import`: live pipeline to node tree and back.
//! - `fifo_lock`: first-come-first-served lock shared by API requests and the
//!   execution loop.
//! - `program`, `store`, `api`: server state, profile persistence, routes.

pub mod api;
pub mod catalog;
#[cfg(test)]
mod catalog_test;
pub mod config;
pub mod encoder;
pub mod execution_loop;
pub mod export;
pub mod fifo_lock;
#[cfg(test)]
mod fifo_lock_test;
pub mod import;
pub mod program;
#[cfg(test)]
mod program_test;
pub mod registry;
#[cfg(test)]
mod registry_test;
pub mod store;
#[cfg(test)]
mod store_test;
pub mod types;

pub use api::router;
pub use config::WireConfig;
pub use execution_loop::{ExecutionLoop, FrameEvaluator, PlanEvaluator};
pub use fifo_lock::{FifoGuard, FifoLock};
pub use import::{ImportErrorKind, NodeTreeImportError};
pub use program::{Program, ProgramError};
pub use registry::FunctionRegistry;
pub use store::{FileStore, MemoryStore, NodeTreeStore};
pub use types::{Link, Node, NodeTreeOut, Pipeline};
