use serde::{Deserialize, Serialize};

use super::program::Channel;

/// Values derived for one channel of a line. Computed, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFieldSet {
  /// Athlete input is needed to pin the value down
  pub require: bool,
  pub value: Option<f64>,
  pub computed_value: Option<f64>,
  pub supposed_value: Option<f64>,
  pub range_min: Option<f64>,
  pub range_max: Option<f64>,
  /// Canonical relation to the reference, e.g. `*0.7` or `-10`
  pub operation: Option<String>,
}

impl DerivedFieldSet {
  /// The number a dependent line should build on: exact first, estimate second
  pub fn best_estimate(&self) -> Option<f64> {
    self.value.or(self.supposed_value)
  }

  pub fn is_unresolved(&self) -> bool {
    self.value.is_none()
      && self.supposed_value.is_none()
      && self.range_min.is_none()
      && self.range_max.is_none()
  }
}

/// All four channels of one line after resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLine {
  pub uid: String,
  pub load: DerivedFieldSet,
  pub reps: DerivedFieldSet,
  pub sets: DerivedFieldSet,
  pub rpe: DerivedFieldSet,
}

impl ResolvedLine {
  pub fn channel(&self, channel: Channel) -> &DerivedFieldSet {
    match channel {
      Channel::Load => &self.load,
      Channel::Reps => &self.reps,
      Channel::Sets => &self.sets,
      Channel::Rpe => &self.rpe,
    }
  }

  pub fn channel_mut(&mut self, channel: Channel) -> &mut DerivedFieldSet {
    match channel {
      Channel::Load => &mut self.load,
      Channel::Reps => &mut self.reps,
      Channel::Sets => &mut self.sets,
      Channel::Rpe => &mut self.rpe,
    }
  }

  /// Planned tonnage: load x reps x sets, using estimates where values are open.
  /// An empty sets field counts as a single set.
  pub fn estimated_volume(&self) -> Option<f64> {
    let load = self.load.best_estimate()?;
    let reps = self.reps.best_estimate()?;
    let sets = if self.sets.is_unresolved() && !self.sets.require && self.sets.operation.is_none() {
      1.0
    } else {
      self.sets.best_estimate()?
    };
    Some(load * reps * sets)
  }
}
