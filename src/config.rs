//! Process-wide wire shape switches.

/// Wire shapes used by the catalog, the exporter and the importer.
///
/// Fixed for the lifetime of a process; exporter and importer must see the
/// same value. The server binary fills both fields from its command line or
/// the `FUNC_INSTEAD_OF_MODS` and `LINKS_INSTEAD_OF_INPUTS` environment
/// variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireConfig {
  /// List functions flat instead of grouped by module.
  pub funcs_instead_of_mods: bool,
  /// Represent inputs as `LinkOut | null` instead of `InputOut`.
  pub links_instead_of_inputs: bool,
}

impl Default for WireConfig {
  fn default() -> Self {
    Self {
      funcs_instead_of_mods: true,
      links_instead_of_inputs: true,
    }
  }
}

impl WireConfig {
  /// Link-or-value inputs, flat catalog.
  pub fn with_values() -> Self {
    Self {
      links_instead_of_inputs: false,
      ..Self::default()
    }
  }
}
