//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Program fixtures (lines, exercises, schedule grids)
//! - Mock personal-best records
//! - Helper assertions

use crate::models::{
  Channel, LineField, LineReference, MaxLift, MaxLiftType, Program, ProgramExercise, ProgramLine,
};

/// ---------------------------------------------------------------------------
/// Program Fixtures
/// ---------------------------------------------------------------------------

/// A line with a single prescribed channel
pub fn line_with(
  uid: &str,
  channel: Channel,
  base_value: &str,
  reference: Option<LineReference>,
) -> ProgramLine {
  let field = match reference {
    Some(reference) => LineField::referencing(base_value, reference),
    None => LineField::new(base_value),
  };
  ProgramLine::new(uid).with_field(channel, field)
}

/// All lines in one squat exercise at week 1, day 1, order 1
pub fn program_with_lines(lines: Vec<ProgramLine>) -> Program {
  let mut exercise = ProgramExercise::new("ex1", "squat", 1, 1, 1);
  for line in lines {
    exercise.push_line(line);
  }
  Program {
    name: "Test Block".to_string(),
    program_exercises: vec![exercise],
    ..Default::default()
  }
}

/// One exercise per `(uid, week, day, order)`, each with a `<uid>-1` line
pub fn program_with_schedule(slots: &[(&str, u32, u32, u32)]) -> Program {
  let program_exercises = slots
    .iter()
    .map(|(uid, week, day, order)| {
      let mut exercise = ProgramExercise::new(uid, "bench press", *week, *day, *order);
      exercise.push_line(
        ProgramLine::new(&format!("{}-1", uid))
          .with_field(Channel::Load, LineField::new("80kg"))
          .with_field(Channel::Reps, LineField::new("5"))
          .with_field(Channel::Sets, LineField::new("3")),
      );
      exercise
    })
    .collect();

  Program {
    name: "Test Schedule".to_string(),
    program_exercises,
    ..Default::default()
  }
}

/// Current `schedule_order` of an exercise (panics if it is missing)
pub fn order_of(program: &Program, uid: &str) -> String {
  program
    .find_exercise(uid)
    .unwrap_or_else(|| panic!("exercise {} not in program", uid))
    .schedule_order
    .clone()
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn mock_max_lift(uid: &str, lift_type: MaxLiftType, value: &str) -> MaxLift {
  MaxLift::new(uid, "squat", lift_type, value)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_program_with_lines_places_lines_in_order() {
    let program = program_with_lines(vec![
      line_with("a", Channel::Load, "100kg", None),
      line_with("b", Channel::Reps, "5", None),
    ]);
    let exercise = &program.program_exercises[0];
    assert_eq!(exercise.lines.len(), 2);
    assert_eq!(exercise.lines[1].line_order, 1);
    assert_eq!(exercise.lines[0].position_tag(), "W1D1L1");
  }

  #[test]
  fn test_program_with_schedule_builds_one_line_per_exercise() {
    let program = program_with_schedule(&[("a", 1, 1, 1), ("b", 2, 3, 4)]);
    assert_eq!(program.program_exercises.len(), 2);
    assert_eq!(order_of(&program, "b"), "4");
    assert_eq!(program.find_line("b-1").unwrap().schedule_day, "3");
  }
}
