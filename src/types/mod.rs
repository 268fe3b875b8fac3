//! Pipeline graph model and the wire shapes it is exchanged in.
//!
//! The pipeline owns every [Node]; nodes refer to each other only through
//! [Link::Node] ids, so reference cycles never become ownership cycles.

mod function_type;
mod link;
mod node;
mod param_type;
mod pipeline;
mod wire;

pub use function_type::{FunctionType, NamedTypes};
pub use link::Link;
pub use node::{Node, Settings};
pub use param_type::{CoerceError, ParamType, Range, RangeError, RangeType, SlideType, Value};
pub use pipeline::{InvalidLink, Pipeline, PlanError};
pub use wire::{
  FunctionOut, InputN, InputOut, LinkOut, ModuleOut, NodeOut, NodeTreeOut, SchemaOut,
  TypeDescriptor,
};

/// Caller-assigned node identifier, unique within a pipeline.
pub type NodeId = String;
