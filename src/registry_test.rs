//! Tests for `FunctionRegistry`.

use crate::registry::{FunctionRegistry, ModuleItem, RegistryError};
use crate::types::{FunctionType, ParamType};

#[test]
fn builtin_looks_up_by_type_tag() {
  let r = FunctionRegistry::builtin();
  let blur = r.get("Blur").unwrap();
  assert_eq!(blur.name, "Blur");
  assert_eq!(blur.settings.get("radius"), Some(&ParamType::Int));
  assert!(r.get("Nope").is_none());
}

#[test]
fn builtin_groups_by_module() {
  let r = FunctionRegistry::builtin();
  let packages: Vec<&str> = r.modules().map(|m| m.package.as_str()).collect();
  assert_eq!(packages, vec!["visionweave.cv", "visionweave.draw"]);
  let total: usize = r.modules().map(|m| m.funcs.len()).sum();
  assert_eq!(total, r.funcs().count());
}

#[test]
fn builtin_modules_pass_the_duplicate_check() {
  let checked = FunctionRegistry::new(FunctionRegistry::builtin_modules()).unwrap();
  let builtin = FunctionRegistry::builtin();
  let tags = |r: &FunctionRegistry| r.funcs().map(|f| f.type_name.clone()).collect::<Vec<_>>();
  assert_eq!(tags(&checked), tags(&builtin));
}

#[test]
fn new_rejects_duplicate_type_tags() {
  let a = ModuleItem::new("a", "1").with(FunctionType::new("X", "X"));
  let b = ModuleItem::new("b", "1").with(FunctionType::new("X", "X"));
  assert_eq!(
    FunctionRegistry::new([a, b]).unwrap_err(),
    RegistryError::DuplicateType {
      type_name: "X".to_string(),
      first: "a".to_string(),
      second: "b".to_string(),
    }
  );
}

#[test]
fn new_indexes_every_module() {
  let a = ModuleItem::new("a", "1").with(FunctionType::new("X", "a.X"));
  let b = ModuleItem::new("b", "2").with(FunctionType::new("Y", "b.Y"));
  let r = FunctionRegistry::new([a, b]).unwrap();
  assert_eq!(r.get("a.X").unwrap().name, "X");
  assert_eq!(r.get("b.Y").unwrap().name, "Y");
}
