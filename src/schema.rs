//! Shorthand rendering of a program line for the athlete view
//!
//! `<load> <reps>x<sets>s @<rpe>`, e.g. `70% (5RM) 5x5s @6.5`.

use crate::grammar::{classify, FieldSyntax};
use crate::models::{Channel, LineReference, ProgramExercise, ProgramLine};
use crate::resolution::ReferenceLookup;

/// Base value decorated with where its reference points
fn annotate<L: ReferenceLookup + ?Sized>(line: &ProgramLine, channel: Channel, lookup: &L) -> String {
  let field = line.field(channel);
  let base = field.base_value.trim();

  match &field.reference {
    Some(LineReference::Line(uid)) => match lookup.line(uid) {
      Some(referenced) => format!("{}{}", referenced.position_tag(), base),
      None => base.to_string(),
    },
    // Only an unsigned percentage names the record type
    Some(LineReference::MaxLift(uid)) => match lookup.max_lift(uid) {
      Some(record)
        if matches!(
          classify(channel, base),
          Some(FieldSyntax::PercentOfReference { .. })
        ) =>
      {
        format!("{} ({})", base, record.lift_type)
      }
      _ => base.to_string(),
    },
    None => base.to_string(),
  }
}

/// Render one line; empty reps/sets read as 1, empty load/RPE are left out
pub fn render_schema<L: ReferenceLookup + ?Sized>(line: &ProgramLine, lookup: &L) -> String {
  let mut parts = Vec::with_capacity(3);

  if !line.load.is_empty() {
    parts.push(annotate(line, Channel::Load, lookup));
  }

  let reps = if line.reps.is_empty() {
    "1".to_string()
  } else {
    annotate(line, Channel::Reps, lookup)
  };
  let sets = if line.sets.is_empty() {
    "1".to_string()
  } else {
    annotate(line, Channel::Sets, lookup)
  };
  parts.push(format!("{}x{}s", reps, sets));

  if !line.rpe.is_empty() {
    parts.push(format!("@{}", annotate(line, Channel::Rpe, lookup)));
  }

  parts.join(" ")
}

/// Render every line of an exercise in line order
pub fn render_exercise<L: ReferenceLookup + ?Sized>(
  exercise: &ProgramExercise,
  lookup: &L,
) -> Vec<String> {
  let mut lines: Vec<&ProgramLine> = exercise.lines.iter().collect();
  lines.sort_by_key(|l| l.line_order);
  lines.into_iter().map(|l| render_schema(l, lookup)).collect()
}
