//! Reconcile the live pipeline with a desired node tree.
//!
//! Steps: prune nodes the tree omits, create nodes it adds, then validate and
//! apply settings and inputs node by node, and finally check that every link
//! resolves. Links to nodes pruned by the same import are cleared; links to
//! ids that never existed fail as dangling.
//!
//! The first failure aborts the import. Mutations made before the failure
//! stay applied; callers re-read the pipeline after an error.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::WireConfig;
use crate::registry::FunctionRegistry;
use crate::types::{
  CoerceError, InputN, InputOut, Link, LinkOut, Node, NodeId, NodeOut, NodeTreeOut, Pipeline,
  Settings,
};

/// Why a node in the tree was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportErrorKind {
  #[error("appears more than once in the node tree")]
  DuplicateNode,
  #[error("is not a known function type")]
  UnknownNodeType,
  #[error("is missing from the pipeline")]
  MissingNode,
  #[error("cannot have a null value in settings (key '{0}')")]
  NullSetting(String),
  #[error("has mismatched settings keys (missing {missing:?}, extra {extra:?})")]
  SettingsKeyMismatch {
    missing: Vec<String>,
    extra: Vec<String>,
  },
  #[error("has an invalid value for setting '{key}': {source}")]
  InvalidSetting {
    key: String,
    #[source]
    source: CoerceError,
  },
  #[error("has no input named '{0}'")]
  UnknownInput(String),
  #[error("has input '{input}' not in {expected} form")]
  UnexpectedInputShape {
    input: String,
    expected: &'static str,
  },
  #[error("has an invalid value for input '{input}': {source}")]
  InvalidInputValue {
    input: String,
    #[source]
    source: CoerceError,
  },
  #[error("links input '{input}' to missing output '{output}' of node '{target}'")]
  DanglingLink {
    input: String,
    target: String,
    output: String,
  },
}

/// A node tree was rejected; names the offending node.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Node '{node_id}' of type '{node_type}' {kind}")]
pub struct NodeTreeImportError {
  pub node_id: String,
  pub node_type: String,
  pub kind: ImportErrorKind,
}

impl NodeTreeImportError {
  pub fn new(node: &NodeOut, kind: ImportErrorKind) -> Self {
    let err = Self {
      node_id: node.id.clone(),
      node_type: node.type_name.clone(),
      kind,
    };
    debug!(error = %err, "node tree import rejected");
    err
  }
}

fn live_node<'a>(
  pipeline: &'a mut Pipeline,
  node: &NodeOut,
) -> Result<&'a mut Node, NodeTreeImportError> {
  pipeline
    .node_mut(&node.id)
    .ok_or_else(|| NodeTreeImportError::new(node, ImportErrorKind::MissingNode))
}

fn apply_settings(pipeline: &mut Pipeline, node: &NodeOut) -> Result<(), NodeTreeImportError> {
  if let Some((key, _)) = node.settings.iter().find(|(_, v)| v.is_null()) {
    return Err(NodeTreeImportError::new(
      node,
      ImportErrorKind::NullSetting(key.clone()),
    ));
  }

  let live = live_node(pipeline, node)?;
  let func = live.func_type.clone();
  let required: BTreeSet<&str> = func.required_settings().collect();
  let given: BTreeSet<&str> = node.settings.keys().map(String::as_str).collect();
  let missing: Vec<String> = required.difference(&given).map(|k| k.to_string()).collect();
  let extra: Vec<String> = given.difference(&required).map(|k| k.to_string()).collect();
  if !missing.is_empty() || !extra.is_empty() {
    return Err(NodeTreeImportError::new(
      node,
      ImportErrorKind::SettingsKeyMismatch { missing, extra },
    ));
  }

  let mut settings = Settings::new();
  for (key, value) in &node.settings {
    let ty = func.settings.get(key).ok_or_else(|| {
      NodeTreeImportError::new(
        node,
        ImportErrorKind::SettingsKeyMismatch {
          missing: vec![],
          extra: vec![key.clone()],
        },
      )
    })?;
    let value = ty.coerce(value).map_err(|source| {
      NodeTreeImportError::new(
        node,
        ImportErrorKind::InvalidSetting {
          key: key.clone(),
          source,
        },
      )
    })?;
    settings.insert(key.clone(), value);
  }
  live.settings = Some(settings);
  Ok(())
}

/// Link to another node's output. A target pruned by this import is cleared;
/// any other missing target is kept and reported by the final link check.
fn node_link(pruned: &HashSet<NodeId>, node: &NodeOut, input: &str, link: &LinkOut) -> Link {
  if pruned.contains(&link.id) {
    debug!(node = %node.id, input, target = %link.id, "dropping link to pruned node");
    Link::NoLink
  } else {
    Link::node(&link.id, &link.name)
  }
}

fn apply_inputs(
  pipeline: &mut Pipeline,
  config: &WireConfig,
  pruned: &HashSet<NodeId>,
  node: &NodeOut,
) -> Result<(), NodeTreeImportError> {
  let live = live_node(pipeline, node)?;
  let func = live.func_type.clone();
  let mut links: BTreeMap<String, Link> = func
    .inputs
    .keys()
    .map(|name| (name.clone(), Link::NoLink))
    .collect();

  for (name, input) in &node.inputs {
    let Some(ty) = func.inputs.get(name) else {
      return Err(NodeTreeImportError::new(
        node,
        ImportErrorKind::UnknownInput(name.clone()),
      ));
    };
    let shape_error = |expected| {
      NodeTreeImportError::new(
        node,
        ImportErrorKind::UnexpectedInputShape {
          input: name.clone(),
          expected,
        },
      )
    };
    let link = if config.links_instead_of_inputs {
      match input {
        InputN::Link(Some(l)) => node_link(pruned, node, name, l),
        InputN::Link(None) => Link::NoLink,
        InputN::Input(_) => return Err(shape_error("link")),
      }
    } else {
      match input {
        InputN::Input(InputOut { link: Some(l), .. }) => node_link(pruned, node, name, l),
        InputN::Input(InputOut { link: None, value }) if value.is_null() => Link::NoLink,
        InputN::Input(InputOut { link: None, value }) => {
          Link::Static(ty.coerce(value).map_err(|source| {
            NodeTreeImportError::new(
              node,
              ImportErrorKind::InvalidInputValue {
                input: name.clone(),
                source,
              },
            )
          })?)
        }
        InputN::Link(_) => return Err(shape_error("link-or-value")),
      }
    };
    links.insert(name.clone(), link);
  }

  live.input_links = links;
  Ok(())
}

/// Mutates `pipeline` until it matches `tree`. Callers hold the pipeline lock
/// for the whole call.
#[instrument(level = "trace", skip(pipeline, registry, tree), fields(nodes = tree.nodes.len()))]
pub fn import_nodetree(
  pipeline: &mut Pipeline,
  registry: &FunctionRegistry,
  config: &WireConfig,
  tree: &NodeTreeOut,
) -> Result<(), NodeTreeImportError> {
  let mut desired: HashSet<&str> = HashSet::with_capacity(tree.nodes.len());
  for node in &tree.nodes {
    if !desired.insert(node.id.as_str()) {
      return Err(NodeTreeImportError::new(node, ImportErrorKind::DuplicateNode));
    }
  }

  let pruned: HashSet<NodeId> = pipeline.prune(&desired).into_iter().collect();

  let mut created = 0usize;
  for node in &tree.nodes {
    if pipeline.node(&node.id).map(Node::type_name) == Some(node.type_name.as_str()) {
      continue;
    }
    let func = registry
      .get(&node.type_name)
      .ok_or_else(|| NodeTreeImportError::new(node, ImportErrorKind::UnknownNodeType))?;
    pipeline.create_node(node.id.clone(), func.clone());
    created += 1;
  }

  for node in &tree.nodes {
    apply_settings(pipeline, node)?;
    apply_inputs(pipeline, config, &pruned, node)?;
  }

  for node in &tree.nodes {
    if let Some(bad) = pipeline.invalid_links_of(&node.id).into_iter().next() {
      return Err(NodeTreeImportError::new(
        node,
        ImportErrorKind::DanglingLink {
          input: bad.input,
          target: bad.target,
          output: bad.output,
        },
      ));
    }
  }

  info!(
    pruned = pruned.len(),
    created,
    nodes = pipeline.len(),
    "node tree imported"
  );
  Ok(())
}
