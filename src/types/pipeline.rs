//! The live processing graph.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use thiserror::Error;

use super::{FunctionType, Link, Node, NodeId};

/// A node link that does not resolve to a declared output of an existing node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLink {
  pub node: NodeId,
  pub input: String,
  pub target: NodeId,
  pub output: String,
}

/// The pipeline has no evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
  #[error("reference cycle through nodes {0:?}")]
  Cycle(Vec<NodeId>),
}

/// Owns every node, keyed by id. Links between nodes are ids, never handles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pipeline {
  nodes: BTreeMap<NodeId, Node>,
}

impl Pipeline {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn contains(&self, id: &str) -> bool {
    self.nodes.contains_key(id)
  }

  pub fn node(&self, id: &str) -> Option<&Node> {
    self.nodes.get(id)
  }

  pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
    self.nodes.get_mut(id)
  }

  pub fn nodes(&self) -> impl Iterator<Item = &Node> {
    self.nodes.values()
  }

  pub fn ids(&self) -> impl Iterator<Item = &str> {
    self.nodes.keys().map(String::as_str)
  }

  /// Inserts a fresh node, replacing any node that had the same id.
  pub fn create_node(&mut self, id: impl Into<NodeId>, func_type: Arc<FunctionType>) -> &mut Node {
    let id = id.into();
    let node = Node::new(id.clone(), func_type);
    match self.nodes.entry(id) {
      Entry::Occupied(mut slot) => {
        slot.insert(node);
        slot.into_mut()
      }
      Entry::Vacant(slot) => slot.insert(node),
    }
  }

  /// Removes a node and disconnects every input that referenced it.
  pub fn remove_node(&mut self, id: &str) -> Option<Node> {
    let removed = self.nodes.remove(id)?;
    let gone: HashSet<NodeId> = std::iter::once(removed.id.clone()).collect();
    self.clear_links_to(&gone);
    Some(removed)
  }

  /// Removes every node whose id is not in `keep`, then disconnects inputs
  /// that referenced a removed node. Returns the removed ids.
  pub fn prune(&mut self, keep: &HashSet<&str>) -> Vec<NodeId> {
    let removed: Vec<NodeId> = self
      .nodes
      .keys()
      .filter(|id| !keep.contains(id.as_str()))
      .cloned()
      .collect();
    for id in &removed {
      self.nodes.remove(id);
    }
    let gone: HashSet<NodeId> = removed.iter().cloned().collect();
    self.clear_links_to(&gone);
    removed
  }

  /// Resets links whose target is in `gone` to [Link::NoLink]. Returns how
  /// many links were cleared.
  fn clear_links_to(&mut self, gone: &HashSet<NodeId>) -> usize {
    let mut cleared = 0;
    for node in self.nodes.values_mut() {
      for link in node.input_links.values_mut() {
        if link.target().is_some_and(|t| gone.contains(t)) {
          *link = Link::NoLink;
          cleared += 1;
        }
      }
    }
    cleared
  }

  /// Resolves a node link to its target node and output name.
  pub fn resolve<'a>(&'a self, link: &'a Link) -> Option<(&'a Node, &'a str)> {
    match link {
      Link::Node { target, output } => {
        let node = self.nodes.get(target)?;
        node
          .func_type
          .outputs
          .contains_key(output)
          .then_some((node, output.as_str()))
      }
      Link::NoLink | Link::Static(_) => None,
    }
  }

  /// Node links of `id` that do not resolve.
  pub fn invalid_links_of(&self, id: &str) -> Vec<InvalidLink> {
    let Some(node) = self.nodes.get(id) else {
      return vec![];
    };
    node
      .input_links
      .iter()
      .filter_map(|(input, link)| match link {
        Link::Node { target, output } if self.resolve(link).is_none() => Some(InvalidLink {
          node: node.id.clone(),
          input: input.clone(),
          target: target.clone(),
          output: output.clone(),
        }),
        _ => None,
      })
      .collect()
  }

  /// Every node link in the pipeline that does not resolve.
  pub fn invalid_links(&self) -> Vec<InvalidLink> {
    self
      .nodes
      .keys()
      .flat_map(|id| self.invalid_links_of(id))
      .collect()
  }

  /// Orders node ids so every node comes after the nodes it reads from.
  /// Dangling links are ignored; a reference cycle has no order.
  pub fn evaluation_order(&self) -> Result<Vec<NodeId>, PlanError> {
    let mut pending: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for (id, node) in &self.nodes {
      let deps: HashSet<&str> = node
        .dependencies()
        .filter(|d| self.nodes.contains_key(*d))
        .collect();
      pending.insert(id.as_str(), deps.len());
      for dep in deps {
        dependents.entry(dep).or_default().push(id.as_str());
      }
    }

    let mut ready: VecDeque<&str> = self
      .nodes
      .keys()
      .map(String::as_str)
      .filter(|id| pending.get(id) == Some(&0))
      .collect();
    let mut order = Vec::with_capacity(self.nodes.len());
    while let Some(id) = ready.pop_front() {
      order.push(id.to_string());
      for dependent in dependents.get(id).into_iter().flatten() {
        if let Some(count) = pending.get_mut(dependent) {
          *count -= 1;
          if *count == 0 {
            ready.push_back(*dependent);
          }
        }
      }
    }

    if order.len() < self.nodes.len() {
      let mut stuck: Vec<NodeId> = pending
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .map(|(id, _)| id.to_string())
        .collect();
      stuck.sort();
      return Err(PlanError::Cycle(stuck));
    }
    Ok(order)
  }
}
