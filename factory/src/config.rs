//! Runtime switches for a `Factory`.

use crate::error::{FactoryError, Result};
use serde::Deserialize;

/// Behavioural options for a `Factory`.
///
/// Usually built with `FactoryConfig::default()`, but can also be loaded from
/// YAML:
///
/// ```
/// use fibre_factory::FactoryConfig;
///
/// let config = FactoryConfig::from_yaml_str("self_registration: false").unwrap();
/// assert!(!config.self_registration);
/// assert!(config.reject_self_referring_parameters);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactoryConfig {
  /// Bind an unregistered but concrete class to itself the first time it is requested.
  pub self_registration: bool,
  /// Reject constructor parameters typed as the class being registered.
  pub reject_self_referring_parameters: bool,
}

impl Default for FactoryConfig {
  fn default() -> Self {
    Self {
      self_registration: true,
      reject_self_referring_parameters: true,
    }
  }
}

impl FactoryConfig {
  /// Parses a configuration from a YAML document. Missing keys take their defaults.
  pub fn from_yaml_str(source: &str) -> Result<Self> {
    // An empty document deserializes to unit, not to an empty mapping.
    if source.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(source).map_err(|e| FactoryError::Config(e.to_string()))
  }
}
