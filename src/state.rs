use std::sync::{Mutex, MutexGuard};

use crate::config::EngineConfig;
use crate::models::Program;

/// Application state shared with the UI layer: the program being edited
pub struct AppState {
  pub program: Mutex<Program>,
  pub config: EngineConfig,
}

impl AppState {
  pub fn new(program: Program, config: EngineConfig) -> Self {
    Self {
      program: Mutex::new(program),
      config,
    }
  }

  pub fn lock_program(&self) -> Result<MutexGuard<'_, Program>, String> {
    self
      .program
      .lock()
      .map_err(|e| format!("Program state unavailable: {}", e))
  }
}

impl Default for AppState {
  fn default() -> Self {
    Self::new(Program::default(), EngineConfig::default())
  }
}
