//! Export the function registry as the wire catalog.

use tracing::instrument;

use crate::config::WireConfig;
use crate::encoder::{EncodeError, encode_all};
use crate::registry::{FunctionRegistry, ModuleItem};
use crate::types::{FunctionOut, FunctionType, ModuleOut, SchemaOut};

fn export_function(func: &FunctionType) -> Result<FunctionOut, EncodeError> {
  Ok(FunctionOut {
    name: func.name.clone(),
    type_name: func.type_name.clone(),
    settings: encode_all(&func.settings)?,
    inputs: encode_all(&func.inputs)?,
    outputs: encode_all(&func.outputs)?,
  })
}

fn export_module(module: &ModuleItem) -> Result<ModuleOut, EncodeError> {
  Ok(ModuleOut {
    package: module.package.clone(),
    version: module.version.clone(),
    funcs: module
      .funcs
      .values()
      .map(|f| export_function(f))
      .collect::<Result<_, _>>()?,
  })
}

/// Builds the catalog in the shape selected by `config`.
///
/// Fails if any declared parameter type has no wire encoding; the registry is
/// static, so callers build this once at startup.
#[instrument(level = "trace", skip(registry))]
pub fn export_catalog(
  registry: &FunctionRegistry,
  config: &WireConfig,
) -> Result<SchemaOut, EncodeError> {
  if config.funcs_instead_of_mods {
    Ok(SchemaOut {
      funcs: Some(
        registry
          .funcs()
          .map(|f| export_function(f))
          .collect::<Result<_, _>>()?,
      ),
      modules: None,
    })
  } else {
    Ok(SchemaOut {
      funcs: None,
      modules: Some(
        registry
          .modules()
          .map(export_module)
          .collect::<Result<_, _>>()?,
      ),
    })
  }
}
