pub mod commands;
pub mod config;
pub mod grammar;
pub mod models;
pub mod resolution;
pub mod schedule;
pub mod schema;
pub mod state;

#[cfg(test)]
mod test_utils;

pub use config::{ConfigError, EngineConfig};
pub use models::{
  Channel, DerivedFieldSet, LineField, LineReference, MaxLift, MaxLiftType, Program,
  ProgramExercise, ProgramLine, ResolvedLine, ScheduleSlot,
};
pub use resolution::{resolve_field, resolve_program, FieldResolver, ReferenceLookup};
pub use schedule::{move_program_exercise, MoveOptions, ScheduleError};
pub use schema::render_schema;
pub use state::AppState;

use tracing_subscriber::EnvFilter;

/// Load `.env`, install logging and build the shared state for the UI layer
pub fn init() -> Result<AppState, ConfigError> {
  dotenvy::dotenv().ok();

  let filter = EnvFilter::try_from_env(config::LOG_FILTER_VAR)
    .unwrap_or_else(|_| EnvFilter::new("info"));
  // The host may already have installed a global subscriber
  let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

  let config = EngineConfig::from_env()?;
  tracing::info!(
    max_reference_depth = config.max_reference_depth,
    "lift coach engine ready"
  );
  Ok(AppState::new(Program::default(), config))
}
