use serde::{Deserialize, Serialize};
use std::env;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

pub const MAX_REFERENCE_DEPTH_VAR: &str = "LIFT_COACH_MAX_REFERENCE_DEPTH";
pub const LOG_FILTER_VAR: &str = "LIFT_COACH_LOG";
const DEFAULT_MAX_REFERENCE_DEPTH: usize = 16;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
  #[error("Invalid configuration {key}={value}: {reason}")]
  Invalid {
    key: String,
    value: String,
    reason: String,
  },
}

impl Serialize for ConfigError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Engine Configuration
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
  /// Reference hops followed before a field is treated as unresolved
  pub max_reference_depth: usize,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
    }
  }
}

impl EngineConfig {
  /// Read overrides from the environment (and `.env`), falling back to defaults
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();

    let max_reference_depth = match env::var(MAX_REFERENCE_DEPTH_VAR) {
      Ok(raw) => parse_depth(&raw)?,
      Err(_) => DEFAULT_MAX_REFERENCE_DEPTH,
    };

    Ok(Self {
      max_reference_depth,
    })
  }
}

fn parse_depth(raw: &str) -> Result<usize, ConfigError> {
  let invalid = |reason: &str| ConfigError::Invalid {
    key: MAX_REFERENCE_DEPTH_VAR.to_string(),
    value: raw.to_string(),
    reason: reason.to_string(),
  };

  let depth: usize = raw
    .trim()
    .parse()
    .map_err(|_| invalid("expected a non-negative integer"))?;
  if depth == 0 {
    return Err(invalid("depth must be at least 1"));
  }
  Ok(depth)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
