pub mod derived;
pub mod max_lift;
pub mod program;

pub use derived::{DerivedFieldSet, ResolvedLine};
pub use max_lift::{MaxLift, MaxLiftType};
pub use program::{
  Channel, LineField, LineReference, Program, ProgramExercise, ProgramLine, ScheduleSlot,
};
