//! Encode native parameter types as wire type descriptors.
//!
//! Plain types map through a fixed name table. Parametrized types are offered
//! to an ordered list of recognizers; the first that accepts the type supplies
//! the descriptor, params included.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::instrument;

use crate::types::{NamedTypes, ParamType, TypeDescriptor};

/// A parameter type the catalog cannot describe.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
  #[error("unknown type {0}")]
  UnknownType(String),
  #[error("parameter '{name}': {source}")]
  Parameter {
    name: String,
    #[source]
    source: Box<EncodeError>,
  },
}

/// Wire name of a plain type, `None` for anything else.
pub(crate) fn plain_name(ty: &ParamType) -> Option<&'static str> {
  match ty {
    ParamType::Int => Some("int"),
    ParamType::Dec => Some("dec"),
    ParamType::Boolean => Some("boolean"),
    ParamType::Str => Some("str"),
    ParamType::Mat => Some("Mat"),
    ParamType::MatBW => Some("mbw"),
    ParamType::Contour => Some("cnt"),
    ParamType::Contours => Some("cts"),
    _ => None,
  }
}

/// Names produced by the recognizers.
pub(crate) const PARAMETRIZED_NAMES: [&str; 3] = ["slide", "range", "box"];

type Recognizer = fn(&ParamType) -> Option<TypeDescriptor>;

/// Tried in order; add new parametrized types here.
const RECOGNIZERS: [Recognizer; 3] = [slide, range, choice];

fn with_params(name: &str, params: serde_json::Value) -> TypeDescriptor {
  let params = match params {
    serde_json::Value::Object(map) => map,
    _ => serde_json::Map::new(),
  };
  TypeDescriptor {
    name: name.to_string(),
    params,
  }
}

fn slide(ty: &ParamType) -> Option<TypeDescriptor> {
  match ty {
    ParamType::Slide(s) => serde_json::to_value(s).ok().map(|p| with_params("slide", p)),
    _ => None,
  }
}

fn range(ty: &ParamType) -> Option<TypeDescriptor> {
  match ty {
    ParamType::Range(r) => serde_json::to_value(r).ok().map(|p| with_params("range", p)),
    _ => None,
  }
}

fn choice(ty: &ParamType) -> Option<TypeDescriptor> {
  match ty {
    ParamType::Choice(options) => Some(with_params(
      "box",
      serde_json::json!({ "options": options }),
    )),
    _ => None,
  }
}

/// Encodes one native type.
pub fn encode(ty: &ParamType) -> Result<TypeDescriptor, EncodeError> {
  if let Some(name) = plain_name(ty) {
    return Ok(TypeDescriptor::plain(name));
  }
  RECOGNIZERS
    .iter()
    .find_map(|recognize| recognize(ty))
    .ok_or_else(|| EncodeError::UnknownType(format!("{:?}", ty)))
}

/// Encodes a named-type map, omitting entries of the null type.
#[instrument(level = "trace", skip(types))]
pub fn encode_all(types: &NamedTypes) -> Result<BTreeMap<String, TypeDescriptor>, EncodeError> {
  types
    .iter()
    .filter(|(_, ty)| !ty.is_null())
    .map(|(name, ty)| {
      encode(ty)
        .map(|d| (name.clone(), d))
        .map_err(|e| EncodeError::Parameter {
          name: name.clone(),
          source: Box::new(e),
        })
    })
    .collect()
}
