//! Resolution and rendering entry points for the athlete view

use crate::models::ResolvedLine;
use crate::resolution::{resolve_program as resolve_all, FieldResolver};
use crate::schema::render_schema;
use crate::state::AppState;

/// Resolve one line of the current program
pub fn resolve_program_line(state: &AppState, line_uid: &str) -> Result<ResolvedLine, String> {
  let program = state.lock_program()?;
  let line = program
    .find_line(line_uid)
    .ok_or_else(|| format!("Program line not found: {}", line_uid))?;
  Ok(FieldResolver::with_config(&*program, &state.config).resolve_line(line))
}

/// Resolve every line of the current program
pub fn resolve_program(state: &AppState) -> Result<Vec<ResolvedLine>, String> {
  let program = state.lock_program()?;
  Ok(resolve_all(&program, &state.config))
}

/// Shorthand schema for one line, e.g. `70% (5RM) 5x5s @6.5`
pub fn render_program_line(state: &AppState, line_uid: &str) -> Result<String, String> {
  let program = state.lock_program()?;
  let line = program
    .find_line(line_uid)
    .ok_or_else(|| format!("Program line not found: {}", line_uid))?;
  Ok(render_schema(line, &*program))
}
