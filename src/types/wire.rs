//! Serializable shapes exchanged with the configuration UI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Wire description of a parameter type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
  #[serde(rename = "type")]
  pub name: String,
  #[serde(default)]
  pub params: serde_json::Map<String, serde_json::Value>,
}

impl TypeDescriptor {
  pub fn plain(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      params: serde_json::Map::new(),
    }
  }
}

/// Catalog entry for one function type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionOut {
  pub name: String,
  #[serde(rename = "type")]
  pub type_name: String,
  pub settings: BTreeMap<String, TypeDescriptor>,
  pub inputs: BTreeMap<String, TypeDescriptor>,
  pub outputs: BTreeMap<String, TypeDescriptor>,
}

/// Catalog entry for one module and the functions it provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleOut {
  pub package: String,
  pub version: String,
  pub funcs: Vec<FunctionOut>,
}

/// The function catalog, either flat or grouped by module.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaOut {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub funcs: Option<Vec<FunctionOut>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub modules: Option<Vec<ModuleOut>>,
}

/// Reference to a named output of another node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkOut {
  pub id: String,
  pub name: String,
}

/// Input carrying either a link or a literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputOut {
  #[serde(default)]
  pub link: Option<LinkOut>,
  #[serde(default)]
  pub value: serde_json::Value,
}

/// One node input as it appears on the wire. Which variant is used depends
/// on [crate::config::WireConfig::links_instead_of_inputs].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputN {
  Input(InputOut),
  Link(Option<LinkOut>),
}

/// Wire form of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeOut {
  #[serde(rename = "type")]
  pub type_name: String,
  pub id: String,
  #[serde(default)]
  pub settings: serde_json::Map<String, serde_json::Value>,
  #[serde(default)]
  pub inputs: BTreeMap<String, InputN>,
}

/// Wire form of a whole pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeTreeOut {
  pub nodes: Vec<NodeOut>,
}
