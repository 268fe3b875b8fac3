//! Native parameter types declared by function types, and the literal values
//! they accept.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::json;
use thiserror::Error;

/// Writes `{min, max, decimal}`, with integer bounds unless `decimal`.
fn serialize_bounds<S: Serializer>(
  serializer: S,
  name: &'static str,
  min: f64,
  max: f64,
  decimal: bool,
) -> Result<S::Ok, S::Error> {
  let mut state = serializer.serialize_struct(name, 3)?;
  if decimal {
    state.serialize_field("min", &min)?;
    state.serialize_field("max", &max)?;
  } else {
    state.serialize_field("min", &(min as i64))?;
    state.serialize_field("max", &(max as i64))?;
  }
  state.serialize_field("decimal", &decimal)?;
  state.end()
}

/// Bounds of a range-typed parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeType {
  pub min: f64,
  pub max: f64,
  pub decimal: bool,
}

/// A concrete `[min, max]` selection inside a [RangeType].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
  pub min: f64,
  pub max: f64,
  /// Rendered with fractional bounds; integer ranges travel as integers.
  pub decimal: bool,
}

/// Rejected construction of a [Range].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
  #[error("range [{min}, {max}] is inverted")]
  Inverted { min: f64, max: f64 },
  #[error("range [{min}, {max}] exceeds bounds [{lower}, {upper}]")]
  OutOfBounds {
    min: f64,
    max: f64,
    lower: f64,
    upper: f64,
  },
  #[error("range bound {0} is not an integer")]
  NotInteger(f64),
}

impl RangeType {
  pub fn new(min: f64, max: f64) -> Self {
    Self {
      min,
      max,
      decimal: false,
    }
  }

  pub fn decimal(min: f64, max: f64) -> Self {
    Self {
      min,
      max,
      decimal: true,
    }
  }

  /// Builds a range selection, checking it against this type's bounds.
  pub fn create(&self, min: f64, max: f64) -> Result<Range, RangeError> {
    if min > max {
      return Err(RangeError::Inverted { min, max });
    }
    if min < self.min || max > self.max {
      return Err(RangeError::OutOfBounds {
        min,
        max,
        lower: self.min,
        upper: self.max,
      });
    }
    if !self.decimal {
      for bound in [min, max] {
        if bound.fract() != 0.0 {
          return Err(RangeError::NotInteger(bound));
        }
      }
    }
    Ok(Range {
      min,
      max,
      decimal: self.decimal,
    })
  }
}

impl Serialize for RangeType {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serialize_bounds(serializer, "RangeType", self.min, self.max, self.decimal)
  }
}

/// Slider control over a bounded numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideType {
  pub min: f64,
  pub max: f64,
  pub decimal: bool,
}

impl SlideType {
  pub fn new(min: f64, max: f64) -> Self {
    Self {
      min,
      max,
      decimal: false,
    }
  }

  pub fn decimal(min: f64, max: f64) -> Self {
    Self {
      min,
      max,
      decimal: true,
    }
  }
}

impl Serialize for SlideType {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serialize_bounds(serializer, "SlideType", self.min, self.max, self.decimal)
  }
}

/// Native type of a setting, input or output.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
  /// The absent type. Parameters of this type are hidden from the catalog.
  Null,
  Int,
  Dec,
  Boolean,
  Str,
  /// Colour image.
  Mat,
  /// Binary image.
  MatBW,
  Contour,
  Contours,
  Range(RangeType),
  Slide(SlideType),
  /// One of a fixed set of literal options.
  Choice(Vec<String>),
  /// A native type with no wire encoding.
  Opaque(String),
}

/// Literal value stored in settings or in a static link.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Int(i64),
  Dec(f64),
  Boolean(bool),
  Text(String),
  Range(Range),
}

impl Value {
  /// Wire form of the value. Ranges travel as `[min, max]`.
  pub fn to_json(&self) -> serde_json::Value {
    match self {
      Value::Int(v) => json!(v),
      Value::Dec(v) => json!(v),
      Value::Boolean(v) => json!(v),
      Value::Text(v) => json!(v),
      Value::Range(r) if r.decimal => json!([r.min, r.max]),
      Value::Range(r) => json!([r.min as i64, r.max as i64]),
    }
  }
}

/// A wire literal that does not fit the declared type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
  #[error("expected {expected}, got {found}")]
  Mismatch {
    expected: &'static str,
    found: serde_json::Value,
  },
  #[error("{0} outside [{1}, {2}]")]
  OutOfBounds(f64, f64, f64),
  #[error("'{0}' is not one of the options")]
  UnknownOption(String),
  #[error(transparent)]
  Range(#[from] RangeError),
  #[error("type {0} cannot be given as a literal")]
  NotLiteral(String),
}

impl ParamType {
  pub fn is_null(&self) -> bool {
    matches!(self, ParamType::Null)
  }

  /// Converts a wire literal into this type's native value.
  pub fn coerce(&self, value: &serde_json::Value) -> Result<Value, CoerceError> {
    let mismatch = |expected| CoerceError::Mismatch {
      expected,
      found: value.clone(),
    };
    match self {
      ParamType::Int => value.as_i64().map(Value::Int).ok_or_else(|| mismatch("integer")),
      ParamType::Dec => value.as_f64().map(Value::Dec).ok_or_else(|| mismatch("number")),
      ParamType::Boolean => value
        .as_bool()
        .map(Value::Boolean)
        .ok_or_else(|| mismatch("boolean")),
      ParamType::Str => value
        .as_str()
        .map(|s| Value::Text(s.to_string()))
        .ok_or_else(|| mismatch("string")),
      ParamType::Slide(slide) => {
        let v = value.as_f64().ok_or_else(|| mismatch("number"))?;
        if v < slide.min || v > slide.max {
          return Err(CoerceError::OutOfBounds(v, slide.min, slide.max));
        }
        if slide.decimal {
          Ok(Value::Dec(v))
        } else {
          value.as_i64().map(Value::Int).ok_or_else(|| mismatch("integer"))
        }
      }
      ParamType::Range(range) => {
        let bounds = value
          .as_array()
          .filter(|a| a.len() == 2)
          .ok_or_else(|| mismatch("[min, max]"))?;
        let min = bounds[0].as_f64().ok_or_else(|| mismatch("[min, max]"))?;
        let max = bounds[1].as_f64().ok_or_else(|| mismatch("[min, max]"))?;
        Ok(Value::Range(range.create(min, max)?))
      }
      ParamType::Choice(options) => {
        let s = value.as_str().ok_or_else(|| mismatch("string"))?;
        if options.iter().any(|o| o == s) {
          Ok(Value::Text(s.to_string()))
        } else {
          Err(CoerceError::UnknownOption(s.to_string()))
        }
      }
      other => Err(CoerceError::NotLiteral(format!("{:?}", other))),
    }
  }
}
