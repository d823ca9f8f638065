use std::io;
use std::str::FromStr;

use crate::arch::pe::PeParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
  /// Step the PE directly.
  Func,
  /// Drive the PE through the discrete-event engine.
  Cycle,
}

impl FromStr for RunMode {
  type Err = io::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "func" => Ok(RunMode::Func),
      "cycle" => Ok(RunMode::Cycle),
      _ => Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("Unknown run mode: {} (expected func or cycle)", s),
      )),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
  Continuous,
  Step,
}

#[derive(Debug, Clone)]
pub struct SimConfig {
  pub run_mode: RunMode,
  pub quiet: bool,
  pub step_mode: StepMode,
  pub trace_file: Option<String>,
  pub pe: PeParams,
}

impl Default for SimConfig {
  fn default() -> Self {
    Self {
      run_mode: RunMode::Func,
      quiet: false,
      step_mode: StepMode::Continuous,
      trace_file: None,
      pe: PeParams::default(),
    }
  }
}
