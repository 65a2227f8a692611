use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of personal-best record an athlete can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaxLiftType {
  #[serde(rename = "1RM")]
  OneRm,
  #[serde(rename = "3RM")]
  ThreeRm,
  #[serde(rename = "5RM")]
  FiveRm,
  #[serde(rename = "6RM")]
  SixRm,
  #[serde(rename = "8RM")]
  EightRm,
  #[serde(rename = "10RM")]
  TenRm,
  MaxReps,
  MaxTime,
}

impl MaxLiftType {
  pub const ALL: [MaxLiftType; 8] = [
    MaxLiftType::OneRm,
    MaxLiftType::ThreeRm,
    MaxLiftType::FiveRm,
    MaxLiftType::SixRm,
    MaxLiftType::EightRm,
    MaxLiftType::TenRm,
    MaxLiftType::MaxReps,
    MaxLiftType::MaxTime,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      MaxLiftType::OneRm => "1RM",
      MaxLiftType::ThreeRm => "3RM",
      MaxLiftType::FiveRm => "5RM",
      MaxLiftType::SixRm => "6RM",
      MaxLiftType::EightRm => "8RM",
      MaxLiftType::TenRm => "10RM",
      MaxLiftType::MaxReps => "MaxReps",
      MaxLiftType::MaxTime => "MaxTime",
    }
  }

  /// Rep-max records carry a load; MaxReps/MaxTime carry a count or duration
  pub fn is_rep_max(&self) -> bool {
    !matches!(self, MaxLiftType::MaxReps | MaxLiftType::MaxTime)
  }
}

impl std::fmt::Display for MaxLiftType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for MaxLiftType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    MaxLiftType::ALL
      .iter()
      .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
      .copied()
      .ok_or_else(|| format!("Unknown max lift type: {}", s))
  }
}

/// Personal-best record a program line can be computed against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxLift {
  pub uid: String,
  pub exercise: String,
  #[serde(rename = "type")]
  pub lift_type: MaxLiftType,
  /// Numeric-as-string, `,` accepted as decimal separator
  pub value: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub recorded_on: Option<NaiveDate>,
}

impl MaxLift {
  pub fn new(uid: &str, exercise: &str, lift_type: MaxLiftType, value: &str) -> Self {
    Self {
      uid: uid.to_string(),
      exercise: exercise.to_string(),
      lift_type,
      value: value.to_string(),
      recorded_on: None,
    }
  }

  /// Raw record value as a number (None when the stored string is not numeric)
  pub fn numeric_value(&self) -> Option<f64> {
    let value: f64 = self.value.trim().replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
  }
}
