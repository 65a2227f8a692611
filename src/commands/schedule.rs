//! Schedule editing entry points

use crate::models::ScheduleSlot;
use crate::schedule::{move_program_exercise, move_program_line, MoveOptions};
use crate::state::AppState;

/// Delete, insert, move or duplicate an exercise; returns the placed exercise uid
pub fn move_exercise(
  state: &AppState,
  exercise_uid: Option<String>,
  destination: Option<ScheduleSlot>,
  duplicate: bool,
  options: Option<MoveOptions>,
) -> Result<Option<String>, String> {
  let mut program = state.lock_program()?;
  move_program_exercise(
    &mut program,
    exercise_uid.as_deref(),
    destination,
    duplicate,
    options.unwrap_or_default(),
  )
  .map_err(|e| format!("Failed to move exercise: {}", e))
}

/// Reorder a line inside its exercise
pub fn move_line(state: &AppState, exercise_uid: String, from: usize, to: usize) -> Result<(), String> {
  let mut program = state.lock_program()?;
  move_program_line(&mut program, &exercise_uid, from, to)
    .map_err(|e| format!("Failed to move line: {}", e))
}
