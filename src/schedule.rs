//! Placement of exercises and lines in the weekly schedule grid
//!
//! Exercises sharing a (week, day) bucket keep a dense 1-based
//! `schedule_order`. Every mutation here leaves buckets gap-free and keeps
//! the owned lines' coordinates in sync with their exercise.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{Channel, LineReference, Program, ProgramExercise, ScheduleSlot};

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ScheduleError {
  #[error("Exercise not found: {0}")]
  ExerciseNotFound(String),

  #[error("Invalid {field} '{value}' on exercise {uid}")]
  InvalidCoordinate {
    uid: String,
    field: &'static str,
    value: String,
  },

  #[error("Line position {position} out of range for exercise {uid} ({len} lines)")]
  LineOutOfRange {
    uid: String,
    position: usize,
    len: usize,
  },
}

impl Serialize for ScheduleError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Move Options
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOptions {
  /// Append to the destination bucket instead of shifting when the order is taken
  #[serde(default)]
  pub loose_order: bool,
  /// Without a destination, place relative to the source instead of deleting
  #[serde(default)]
  pub source_fallback: bool,
  /// Order offset from the source used with `source_fallback`
  #[serde(default)]
  pub source_offset: i32,
}

impl MoveOptions {
  /// Options for "insert a copy right after the original"
  pub fn after_source() -> Self {
    Self {
      loose_order: false,
      source_fallback: true,
      source_offset: 1,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Coordinates
/// ---------------------------------------------------------------------------

fn parse_coordinate(uid: &str, field: &'static str, raw: &str) -> Result<u32, ScheduleError> {
  raw
    .trim()
    .parse::<u32>()
    .map_err(|_| ScheduleError::InvalidCoordinate {
      uid: uid.to_string(),
      field,
      value: raw.to_string(),
    })
}

/// Numeric coordinates of an exercise
pub fn slot_of(exercise: &ProgramExercise) -> Result<ScheduleSlot, ScheduleError> {
  Ok(ScheduleSlot {
    week: parse_coordinate(&exercise.uid, "schedule_week", &exercise.schedule_week)?,
    day: parse_coordinate(&exercise.uid, "schedule_day", &exercise.schedule_day)?,
    order: parse_coordinate(&exercise.uid, "schedule_order", &exercise.schedule_order)?,
  })
}

/// Indices and orders of the exercises in a (week, day) bucket.
///
/// Exercises whose week or day does not parse cannot belong to any bucket and
/// are skipped. A member of the bucket with a malformed order is an error.
fn bucket(program: &Program, week: u32, day: u32) -> Result<Vec<(usize, u32)>, ScheduleError> {
  let mut members = Vec::new();
  for (idx, exercise) in program.program_exercises.iter().enumerate() {
    let position = parse_coordinate(&exercise.uid, "schedule_week", &exercise.schedule_week)
      .and_then(|w| Ok((w, parse_coordinate(&exercise.uid, "schedule_day", &exercise.schedule_day)?)));
    match position {
      Ok((w, d)) if w == week && d == day => {
        let order = parse_coordinate(&exercise.uid, "schedule_order", &exercise.schedule_order)?;
        members.push((idx, order));
      }
      Ok(_) => {}
      Err(err) => {
        tracing::warn!(uid = exercise.uid.as_str(), error = %err, "skipping unplaceable exercise");
      }
    }
  }
  Ok(members)
}

fn set_order(exercise: &mut ProgramExercise, order: u32) {
  exercise.schedule_order = order.to_string();
  exercise.sync_lines();
}

/// Shift down every exercise ordered after a vacated slot
fn close_gap(program: &mut Program, vacated: ScheduleSlot) -> Result<(), ScheduleError> {
  for (idx, order) in bucket(program, vacated.week, vacated.day)? {
    if order > vacated.order {
      set_order(&mut program.program_exercises[idx], order - 1);
    }
  }
  Ok(())
}

/// Place an exercise (not yet in the program) at a destination slot
fn insert_at(
  program: &mut Program,
  mut exercise: ProgramExercise,
  destination: ScheduleSlot,
  options: MoveOptions,
) -> Result<Option<String>, ScheduleError> {
  let members = bucket(program, destination.week, destination.day)?;
  let max_order = members.iter().map(|(_, order)| *order).max().unwrap_or(0);

  let mut order = destination.order.clamp(1, max_order + 1);
  let occupied = members.iter().any(|(_, o)| *o == order);

  if options.loose_order && occupied {
    order = max_order + 1;
  } else {
    for (idx, existing) in members {
      if existing >= order {
        set_order(&mut program.program_exercises[idx], existing + 1);
      }
    }
  }

  exercise.schedule_week = destination.week.to_string();
  exercise.schedule_day = destination.day.to_string();
  exercise.schedule_order = order.to_string();
  exercise.sync_lines();

  tracing::info!(
    uid = exercise.uid.as_str(),
    week = destination.week,
    day = destination.day,
    requested = destination.order,
    order,
    "placed exercise"
  );

  let uid = exercise.uid.clone();
  program.program_exercises.push(exercise);
  Ok(Some(uid))
}

/// ---------------------------------------------------------------------------
/// Duplication
/// ---------------------------------------------------------------------------

fn fresh_uid() -> String {
  Uuid::new_v4().to_string()
}

/// Deep copy with fresh identities. References between lines of the copied
/// exercise are redirected to the copies; everything else keeps its target.
pub fn duplicate_exercise(source: &ProgramExercise) -> ProgramExercise {
  let renamed: HashMap<&str, String> = source
    .lines
    .iter()
    .map(|line| (line.uid.as_str(), fresh_uid()))
    .collect();

  let mut copy = source.clone();
  copy.uid = fresh_uid();
  for line in copy.lines.iter_mut() {
    if let Some(new_uid) = renamed.get(line.uid.as_str()) {
      line.uid = new_uid.clone();
    }
    for channel in Channel::ALL {
      if let Some(LineReference::Line(target)) = &mut line.field_mut(channel).reference {
        if let Some(new_target) = renamed.get(target.as_str()) {
          *target = new_target.clone();
        }
      }
    }
  }
  copy
}

/// ---------------------------------------------------------------------------
/// Exercise Placement
/// ---------------------------------------------------------------------------

/// Delete, insert, move or duplicate one exercise.
///
/// - no exercise, no destination: nothing happens
/// - exercise only: removed, unless `source_fallback` turns the source slot
///   (shifted by `source_offset`) into the destination
/// - destination only: a new placeholder exercise is inserted there
/// - both: moved (or copied when `duplicate`) with insertion semantics
///
/// Returns the uid of the exercise now sitting at the destination. On error
/// the program is left exactly as it was.
pub fn move_program_exercise(
  program: &mut Program,
  exercise_uid: Option<&str>,
  destination: Option<ScheduleSlot>,
  duplicate: bool,
  options: MoveOptions,
) -> Result<Option<String>, ScheduleError> {
  let mut working = program.clone();
  let placed = apply_move(&mut working, exercise_uid, destination, duplicate, options)?;
  *program = working;
  Ok(placed)
}

fn apply_move(
  program: &mut Program,
  exercise_uid: Option<&str>,
  destination: Option<ScheduleSlot>,
  duplicate: bool,
  options: MoveOptions,
) -> Result<Option<String>, ScheduleError> {
  let source = match exercise_uid {
    Some(uid) => {
      let idx = program
        .program_exercises
        .iter()
        .position(|e| e.uid == uid)
        .ok_or_else(|| ScheduleError::ExerciseNotFound(uid.to_string()))?;
      Some((idx, slot_of(&program.program_exercises[idx])?))
    }
    None => None,
  };

  let destination = match (destination, source) {
    (Some(destination), _) => Some(destination),
    (None, Some((_, slot))) if options.source_fallback => {
      let order = (slot.order as i64 + options.source_offset as i64).max(1);
      Some(ScheduleSlot {
        order: u32::try_from(order).unwrap_or(u32::MAX),
        ..slot
      })
    }
    (None, _) => None,
  };

  match (source, destination) {
    (None, None) => Ok(None),
    (Some((idx, slot)), None) => {
      let removed = program.program_exercises.remove(idx);
      close_gap(program, slot)?;
      tracing::info!(uid = removed.uid.as_str(), week = slot.week, day = slot.day, "removed exercise");
      Ok(None)
    }
    (None, Some(destination)) => {
      let placeholder = ProgramExercise {
        uid: fresh_uid(),
        ..Default::default()
      };
      insert_at(program, placeholder, destination, options)
    }
    (Some((idx, _)), Some(destination)) if duplicate => {
      let copy = duplicate_exercise(&program.program_exercises[idx]);
      insert_at(program, copy, destination, options)
    }
    (Some((idx, slot)), Some(destination)) => {
      let moved = program.program_exercises.remove(idx);
      close_gap(program, slot)?;
      insert_at(program, moved, destination, options)
    }
  }
}

/// Rewrite a bucket to dense 1-based orders, keeping relative order
pub fn renumber_bucket(program: &mut Program, week: u32, day: u32) -> Result<(), ScheduleError> {
  let mut members = bucket(program, week, day)?;
  members.sort_by_key(|(idx, order)| (*order, *idx));
  for (position, (idx, _)) in members.into_iter().enumerate() {
    set_order(&mut program.program_exercises[idx], position as u32 + 1);
  }
  Ok(())
}

/// Exercises of a bucket sorted by order
pub fn exercises_in_bucket(
  program: &Program,
  week: u32,
  day: u32,
) -> Result<Vec<&ProgramExercise>, ScheduleError> {
  let mut members = bucket(program, week, day)?;
  members.sort_by_key(|(idx, order)| (*order, *idx));
  Ok(
    members
      .into_iter()
      .map(|(idx, _)| &program.program_exercises[idx])
      .collect(),
  )
}

/// ---------------------------------------------------------------------------
/// Line Placement
/// ---------------------------------------------------------------------------

/// Move a line inside its exercise; `to` is clamped to the last position
pub fn move_program_line(
  program: &mut Program,
  exercise_uid: &str,
  from: usize,
  to: usize,
) -> Result<(), ScheduleError> {
  let exercise = program
    .find_exercise_mut(exercise_uid)
    .ok_or_else(|| ScheduleError::ExerciseNotFound(exercise_uid.to_string()))?;

  let len = exercise.lines.len();
  if from >= len {
    return Err(ScheduleError::LineOutOfRange {
      uid: exercise_uid.to_string(),
      position: from,
      len,
    });
  }

  exercise.lines.sort_by_key(|l| l.line_order);
  let line = exercise.lines.remove(from);
  let to = to.min(len - 1);
  exercise.lines.insert(to, line);
  exercise.sync_lines();
  Ok(())
}
