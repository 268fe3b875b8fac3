//! Tests for catalog export.

use serde_json::json;

use crate::catalog::export_catalog;
use crate::config::WireConfig;
use crate::encoder::EncodeError;
use crate::registry::{FunctionRegistry, ModuleItem};
use crate::types::{FunctionType, ParamType};

fn grouped() -> WireConfig {
  WireConfig {
    funcs_instead_of_mods: false,
    ..WireConfig::default()
  }
}

#[test]
fn flat_catalog_lists_every_function() {
  let r = FunctionRegistry::builtin();
  let schema = export_catalog(&r, &WireConfig::default()).unwrap();
  assert!(schema.modules.is_none());
  let funcs = schema.funcs.unwrap();
  assert_eq!(funcs.len(), r.funcs().count());
  let blur = funcs.iter().find(|f| f.name == "Blur").unwrap();
  assert_eq!(blur.type_name, "Blur");
  assert_eq!(blur.settings["radius"].name, "int");
  assert_eq!(blur.inputs["img"].name, "Mat");
  assert_eq!(blur.outputs["img"].name, "Mat");
}

#[test]
fn grouped_catalog_carries_module_versions() {
  let r = FunctionRegistry::builtin();
  let schema = export_catalog(&r, &grouped()).unwrap();
  assert!(schema.funcs.is_none());
  let modules = schema.modules.unwrap();
  assert_eq!(modules.len(), 2);
  assert_eq!(modules[0].package, "visionweave.cv");
  assert_eq!(modules[0].version, env!("CARGO_PKG_VERSION"));
  assert!(modules[1].funcs.iter().any(|f| f.name == "DrawContours"));
}

#[test]
fn catalog_serializes_descriptors() {
  let module = ModuleItem::new("m", "0.1").with(
    FunctionType::new("Thresh", "Thresh")
      .setting("hue", ParamType::Range(crate::types::RangeType::new(0.0, 179.0)))
      .setting("debug", ParamType::Null),
  );
  let r = FunctionRegistry::new([module]).unwrap();
  let schema = export_catalog(&r, &WireConfig::default()).unwrap();
  assert_eq!(
    serde_json::to_value(&schema).unwrap(),
    json!({"funcs": [{
      "name": "Thresh",
      "type": "Thresh",
      "settings": {"hue": {"type": "range", "params": {"min": 0, "max": 179, "decimal": false}}},
      "inputs": {},
      "outputs": {}
    }]})
  );
}

#[test]
fn unknown_parameter_type_fails_catalog() {
  let module = ModuleItem::new("m", "0.1").with(
    FunctionType::new("DrawCircles", "DrawCircles")
      .input("circles", ParamType::Opaque("Circles".to_string())),
  );
  let r = FunctionRegistry::new([module]).unwrap();
  assert!(matches!(
    export_catalog(&r, &WireConfig::default()),
    Err(EncodeError::Parameter { .. })
  ));
  assert!(export_catalog(&r, &grouped()).is_err());
}
