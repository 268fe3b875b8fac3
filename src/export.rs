//! Export the live pipeline as a node tree.

use tracing::instrument;

use crate::config::WireConfig;
use crate::types::{InputN, InputOut, Link, LinkOut, Node, NodeOut, NodeTreeOut, Pipeline, Settings};

fn export_settings(settings: Option<&Settings>) -> serde_json::Map<String, serde_json::Value> {
  settings
    .map(|s| s.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
    .unwrap_or_default()
}

/// Link-only form: static links have no link to show.
fn export_link(link: &Link) -> Option<LinkOut> {
  match link {
    Link::Node { target, output } => Some(LinkOut {
      id: target.clone(),
      name: output.clone(),
    }),
    Link::NoLink | Link::Static(_) => None,
  }
}

/// Link-or-value form: node links never carry a value.
fn export_input(link: &Link) -> InputOut {
  let value = match link {
    Link::Static(v) => v.to_json(),
    Link::NoLink | Link::Node { .. } => serde_json::Value::Null,
  };
  InputOut {
    link: export_link(link),
    value,
  }
}

fn export_node(node: &Node, config: &WireConfig) -> NodeOut {
  NodeOut {
    type_name: node.type_name().to_string(),
    id: node.id.clone(),
    settings: export_settings(node.settings.as_ref()),
    inputs: node
      .input_links
      .iter()
      .map(|(name, link)| {
        let input = if config.links_instead_of_inputs {
          InputN::Link(export_link(link))
        } else {
          InputN::Input(export_input(link))
        };
        (name.clone(), input)
      })
      .collect(),
  }
}

/// Walks the pipeline into its wire form. Callers hold the pipeline lock.
///
/// Node order follows the pipeline's id order; consumers must not rely on it.
#[instrument(level = "trace", skip(pipeline))]
pub fn export_nodetree(pipeline: &Pipeline, config: &WireConfig) -> NodeTreeOut {
  NodeTreeOut {
    nodes: pipeline.nodes().map(|n| export_node(n, config)).collect(),
  }
}
