//! Function registry: modules of function types, looked up by type tag.
//!
//! Only declarations live here; operator bodies belong to the frame evaluator.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::types::{FunctionType, ParamType, RangeType, SlideType};

/// Registry construction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
  #[error("function type '{type_name}' declared by both '{first}' and '{second}'")]
  DuplicateType {
    type_name: String,
    first: String,
    second: String,
  },
}

/// One module and the function types it provides.
#[derive(Debug, Clone)]
pub struct ModuleItem {
  pub package: String,
  pub version: String,
  pub funcs: BTreeMap<String, Arc<FunctionType>>,
}

impl ModuleItem {
  pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
    Self {
      package: package.into(),
      version: version.into(),
      funcs: BTreeMap::new(),
    }
  }

  pub fn with(mut self, func: FunctionType) -> Self {
    self.funcs.insert(func.type_name.clone(), Arc::new(func));
    self
  }
}

/// Every loaded module plus a flat index by type tag. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
  modules: BTreeMap<String, ModuleItem>,
  funcs: BTreeMap<String, Arc<FunctionType>>,
}

impl FunctionRegistry {
  pub fn new(modules: impl IntoIterator<Item = ModuleItem>) -> Result<Self, RegistryError> {
    let mut registry = Self::default();
    let mut owners: BTreeMap<String, String> = BTreeMap::new();
    for module in modules {
      for type_name in module.funcs.keys() {
        if let Some(first) = owners.insert(type_name.clone(), module.package.clone()) {
          return Err(RegistryError::DuplicateType {
            type_name: type_name.clone(),
            first,
            second: module.package.clone(),
          });
        }
      }
      registry.insert(module);
    }
    Ok(registry)
  }

  fn insert(&mut self, module: ModuleItem) {
    for (type_name, func) in &module.funcs {
      self.funcs.insert(type_name.clone(), func.clone());
    }
    self.modules.insert(module.package.clone(), module);
  }

  /// Looks up a function type by its tag.
  pub fn get(&self, type_name: &str) -> Option<&Arc<FunctionType>> {
    self.funcs.get(type_name)
  }

  pub fn funcs(&self) -> impl Iterator<Item = &Arc<FunctionType>> {
    self.funcs.values()
  }

  pub fn modules(&self) -> impl Iterator<Item = &ModuleItem> {
    self.modules.values()
  }

  /// Registry of the built-in vision operators.
  pub fn builtin() -> Self {
    let mut registry = Self::default();
    for module in Self::builtin_modules() {
      registry.insert(module);
    }
    registry
  }

  /// Declarations of the built-in vision operators, one item per module.
  pub fn builtin_modules() -> [ModuleItem; 2] {
    let cv = ModuleItem::new("visionweave.cv", env!("CARGO_PKG_VERSION"))
      .with(FunctionType::new("CameraInput", "CameraInput").output("img", ParamType::Mat))
      .with(
        FunctionType::new("Blur", "Blur")
          .setting("radius", ParamType::Int)
          .input("img", ParamType::Mat)
          .output("img", ParamType::Mat),
      )
      .with(
        FunctionType::new("Resize", "Resize")
          .setting("scale", ParamType::Slide(SlideType::decimal(0.1, 1.0)))
          .input("img", ParamType::Mat)
          .output("img", ParamType::Mat),
      )
      .with(
        FunctionType::new("ColorThreshold", "ColorThreshold")
          .setting("hue", ParamType::Range(RangeType::new(0.0, 179.0)))
          .setting("sat", ParamType::Range(RangeType::new(0.0, 255.0)))
          .setting("val", ParamType::Range(RangeType::new(0.0, 255.0)))
          .input("img", ParamType::Mat)
          .output("imgBW", ParamType::MatBW),
      )
      .with(
        FunctionType::new("FindContours", "FindContours")
          .input("imgBW", ParamType::MatBW)
          .output("contours", ParamType::Contours),
      )
      .with(
        FunctionType::new("FilterContours", "FilterContours")
          .setting("keep_largest", ParamType::Boolean)
          .input("contours", ParamType::Contours)
          .input("min_area", ParamType::Dec)
          .output("contours", ParamType::Contours)
          .output("largest", ParamType::Contour),
      )
      .with(
        FunctionType::new("Crop", "Crop")
          .input("img", ParamType::Mat)
          .input("x", ParamType::Range(RangeType::decimal(0.0, 1.0)))
          .input("y", ParamType::Range(RangeType::decimal(0.0, 1.0)))
          .output("img", ParamType::Mat),
      );

    let draw = ModuleItem::new("visionweave.draw", env!("CARGO_PKG_VERSION"))
      .with(
        FunctionType::new("DrawContours", "DrawContours")
          .setting(
            "color",
            ParamType::Choice(vec![
              "red".to_string(),
              "green".to_string(),
              "blue".to_string(),
            ]),
          )
          .setting("thickness", ParamType::Slide(SlideType::new(1.0, 10.0)))
          .input("img", ParamType::Mat)
          .input("contours", ParamType::Contours)
          .output("img", ParamType::Mat),
      )
      .with(
        FunctionType::new("Label", "Label")
          .setting("text", ParamType::Str)
          .input("img", ParamType::Mat)
          .output("img", ParamType::Mat),
      );

    [cv, draw]
  }
}
