//! Declared signature of a processing function.

use std::collections::BTreeMap;

use super::ParamType;

/// Named parameter types of one side of a function signature.
pub type NamedTypes = BTreeMap<String, ParamType>;

/// A processing function type: name, category tag and typed signature.
///
/// Defined once when the registry is loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
  pub name: String,
  /// Tag used as the node `type` in node trees.
  pub type_name: String,
  pub settings: NamedTypes,
  pub inputs: NamedTypes,
  pub outputs: NamedTypes,
}

impl FunctionType {
  pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      type_name: type_name.into(),
      settings: NamedTypes::new(),
      inputs: NamedTypes::new(),
      outputs: NamedTypes::new(),
    }
  }

  pub fn setting(mut self, name: impl Into<String>, ty: ParamType) -> Self {
    self.settings.insert(name.into(), ty);
    self
  }

  pub fn input(mut self, name: impl Into<String>, ty: ParamType) -> Self {
    self.inputs.insert(name.into(), ty);
    self
  }

  pub fn output(mut self, name: impl Into<String>, ty: ParamType) -> Self {
    self.outputs.insert(name.into(), ty);
    self
  }

  /// Setting keys a node tree must supply: every declared setting except
  /// those of the null type.
  pub fn required_settings(&self) -> impl Iterator<Item = &str> {
    self
      .settings
      .iter()
      .filter(|(_, ty)| !ty.is_null())
      .map(|(name, _)| name.as_str())
  }
}
