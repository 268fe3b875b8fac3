//! Connection of a node input.

use super::{NodeId, Value};

/// What a node input is connected to.
///
/// A `Node` link only names its target; the pipeline owns every node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Link {
  /// Input left unconnected.
  #[default]
  NoLink,
  /// Literal supplied directly.
  Static(Value),
  /// Named output of another node, resolved by id on use.
  Node { target: NodeId, output: String },
}

impl Link {
  pub fn node(target: impl Into<NodeId>, output: impl Into<String>) -> Self {
    Link::Node {
      target: target.into(),
      output: output.into(),
    }
  }

  /// Target id when this link references another node.
  pub fn target(&self) -> Option<&str> {
    match self {
      Link::Node { target, .. } => Some(target),
      Link::NoLink | Link::Static(_) => None,
    }
  }

  pub fn is_connected(&self) -> bool {
    !matches!(self, Link::NoLink)
  }
}
