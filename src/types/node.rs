//! A function instance inside the pipeline.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{FunctionType, Link, NodeId, Value};

/// Concrete settings of a node, keyed by setting name.
pub type Settings = BTreeMap<String, Value>;

/// One instance of a function type with its settings and input links.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
  pub id: NodeId,
  pub func_type: Arc<FunctionType>,
  /// `None` until settings are first applied.
  pub settings: Option<Settings>,
  pub input_links: BTreeMap<String, Link>,
}

impl Node {
  /// Creates a node with no settings and every declared input unconnected.
  pub fn new(id: impl Into<NodeId>, func_type: Arc<FunctionType>) -> Self {
    let input_links = func_type
      .inputs
      .keys()
      .map(|name| (name.clone(), Link::NoLink))
      .collect();
    Self {
      id: id.into(),
      func_type,
      settings: None,
      input_links,
    }
  }

  pub fn type_name(&self) -> &str {
    &self.func_type.type_name
  }

  pub fn link(&self, input: &str) -> Option<&Link> {
    self.input_links.get(input)
  }

  /// Iterates the ids this node reads from.
  pub fn dependencies(&self) -> impl Iterator<Item = &str> {
    self.input_links.values().filter_map(Link::target)
  }
}
