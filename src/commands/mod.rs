pub mod lines;
pub mod schedule;

use crate::models::{MaxLift, Program};
use crate::state::AppState;

pub fn get_program(state: &AppState) -> Result<Program, String> {
  Ok(state.lock_program()?.clone())
}

/// Replace the program being edited with one handed over as JSON
pub fn load_program(state: &AppState, program_json: &str) -> Result<(), String> {
  let program = Program::from_json(program_json)?;
  tracing::info!(
    exercises = program.program_exercises.len(),
    max_lifts = program.max_lifts.len(),
    "loaded program"
  );
  *state.lock_program()? = program;
  Ok(())
}

/// Add a personal-best record, or replace the one with the same uid
pub fn record_max_lift(state: &AppState, record: MaxLift) -> Result<(), String> {
  if record.numeric_value().is_none() {
    return Err(format!("Max lift value is not a number: {}", record.value));
  }

  let mut program = state.lock_program()?;
  match program.max_lifts.iter_mut().find(|m| m.uid == record.uid) {
    Some(existing) => *existing = record,
    None => program.max_lifts.push(record),
  }
  Ok(())
}
