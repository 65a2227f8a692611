use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::max_lift::{MaxLift, MaxLiftType};

/// ---------------------------------------------------------------------------
/// Field Channels
/// ---------------------------------------------------------------------------

/// The four independently prescribed fields of a program line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
  Load,
  Reps,
  Sets,
  Rpe,
}

impl Channel {
  pub const ALL: [Channel; 4] = [Channel::Load, Channel::Reps, Channel::Sets, Channel::Rpe];

  pub fn as_str(&self) -> &'static str {
    match self {
      Channel::Load => "load",
      Channel::Reps => "reps",
      Channel::Sets => "sets",
      Channel::Rpe => "rpe",
    }
  }
}

impl std::fmt::Display for Channel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Non-owning link from a field to whatever it is computed against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "uid", rename_all = "snake_case")]
pub enum LineReference {
  Line(String),
  MaxLift(String),
}

/// One channel of a line: the coach's annotated text plus its optional reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineField {
  pub base_value: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reference: Option<LineReference>,
}

impl LineField {
  pub fn new(base_value: &str) -> Self {
    Self {
      base_value: base_value.to_string(),
      reference: None,
    }
  }

  pub fn referencing(base_value: &str, reference: LineReference) -> Self {
    Self {
      base_value: base_value.to_string(),
      reference: Some(reference),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.base_value.trim().is_empty()
  }
}

/// ---------------------------------------------------------------------------
/// Program Line
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramLine {
  pub uid: String,
  #[serde(default)]
  pub load: LineField,
  #[serde(default)]
  pub reps: LineField,
  #[serde(default)]
  pub sets: LineField,
  #[serde(default)]
  pub rpe: LineField,
  pub schedule_week: String,
  pub schedule_day: String,
  pub schedule_order: String,
  /// 0-based position inside the owning exercise
  #[serde(default)]
  pub line_order: usize,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
}

impl ProgramLine {
  pub fn new(uid: &str) -> Self {
    Self {
      uid: uid.to_string(),
      ..Default::default()
    }
  }

  pub fn field(&self, channel: Channel) -> &LineField {
    match channel {
      Channel::Load => &self.load,
      Channel::Reps => &self.reps,
      Channel::Sets => &self.sets,
      Channel::Rpe => &self.rpe,
    }
  }

  pub fn field_mut(&mut self, channel: Channel) -> &mut LineField {
    match channel {
      Channel::Load => &mut self.load,
      Channel::Reps => &mut self.reps,
      Channel::Sets => &mut self.sets,
      Channel::Rpe => &mut self.rpe,
    }
  }

  pub fn with_field(mut self, channel: Channel, field: LineField) -> Self {
    *self.field_mut(channel) = field;
    self
  }

  pub fn at(mut self, week: u32, day: u32, order: u32, line_order: usize) -> Self {
    self.schedule_week = week.to_string();
    self.schedule_day = day.to_string();
    self.schedule_order = order.to_string();
    self.line_order = line_order;
    self
  }

  /// Positional tag used when another line points at this one, e.g. `W1D2L3`
  pub fn position_tag(&self) -> String {
    format!(
      "W{}D{}L{}",
      self.schedule_week.trim(),
      self.schedule_day.trim(),
      self.line_order + 1
    )
  }
}

/// ---------------------------------------------------------------------------
/// Exercise In Schedule
/// ---------------------------------------------------------------------------

/// Exercise placed in the weekly grid; owns its lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramExercise {
  pub uid: String,
  /// None for a freshly inserted placeholder
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub exercise: Option<String>,
  pub schedule_week: String,
  pub schedule_day: String,
  pub schedule_order: String,
  #[serde(default)]
  pub lines: Vec<ProgramLine>,
}

impl ProgramExercise {
  pub fn new(uid: &str, exercise: &str, week: u32, day: u32, order: u32) -> Self {
    Self {
      uid: uid.to_string(),
      exercise: Some(exercise.to_string()),
      schedule_week: week.to_string(),
      schedule_day: day.to_string(),
      schedule_order: order.to_string(),
      lines: Vec::new(),
    }
  }

  /// Append a line, stamping it with this exercise's coordinates
  pub fn push_line(&mut self, mut line: ProgramLine) {
    line.line_order = self.lines.len();
    line.schedule_week = self.schedule_week.clone();
    line.schedule_day = self.schedule_day.clone();
    line.schedule_order = self.schedule_order.clone();
    self.lines.push(line);
  }

  /// Copy the exercise coordinates onto every owned line and re-densify line order
  pub fn sync_lines(&mut self) {
    for (idx, line) in self.lines.iter_mut().enumerate() {
      line.schedule_week = self.schedule_week.clone();
      line.schedule_day = self.schedule_day.clone();
      line.schedule_order = self.schedule_order.clone();
      line.line_order = idx;
    }
  }
}

/// Numeric schedule coordinates (week, day, 1-based order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleSlot {
  pub week: u32,
  pub day: u32,
  pub order: u32,
}

impl ScheduleSlot {
  pub fn new(week: u32, day: u32, order: u32) -> Self {
    Self { week, day, order }
  }
}

/// ---------------------------------------------------------------------------
/// Program
/// ---------------------------------------------------------------------------

/// Caller-owned arena: exercises (and their lines) plus the athlete's records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub uid: Option<String>,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub program_exercises: Vec<ProgramExercise>,
  #[serde(default)]
  pub max_lifts: Vec<MaxLift>,
}

impl Program {
  pub fn from_json(json: &str) -> Result<Self, String> {
    serde_json::from_str(json).map_err(|e| format!("Failed to parse program: {}", e))
  }

  pub fn to_json(&self) -> String {
    serde_json::to_string(self).unwrap_or_default()
  }

  pub fn lines(&self) -> impl Iterator<Item = &ProgramLine> {
    self.program_exercises.iter().flat_map(|e| e.lines.iter())
  }

  pub fn find_line(&self, uid: &str) -> Option<&ProgramLine> {
    self.lines().find(|l| l.uid == uid)
  }

  pub fn find_exercise(&self, uid: &str) -> Option<&ProgramExercise> {
    self.program_exercises.iter().find(|e| e.uid == uid)
  }

  pub fn find_exercise_mut(&mut self, uid: &str) -> Option<&mut ProgramExercise> {
    self.program_exercises.iter_mut().find(|e| e.uid == uid)
  }

  pub fn find_max_lift(&self, uid: &str) -> Option<&MaxLift> {
    self.max_lifts.iter().find(|m| m.uid == uid)
  }

  /// Most recent record of a type for an exercise; undated records lose to dated ones
  pub fn latest_max_lift(&self, exercise: &str, lift_type: MaxLiftType) -> Option<&MaxLift> {
    self
      .max_lifts
      .iter()
      .filter(|m| m.lift_type == lift_type && m.exercise.eq_ignore_ascii_case(exercise))
      .max_by_key(|m| m.recorded_on.unwrap_or(NaiveDate::MIN))
  }
}
