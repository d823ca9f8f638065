//! Cycle-accurate model of a multiply-accumulate processing element with a
//! small weight register file, plus the driver used to exercise it.

pub mod arch;
pub mod builtin;
pub mod simulator;

pub use arch::pe::{PeInput, PeOutput, PeParams, ProcessingElement, RegAddr};
pub use simulator::sim::mode::{RunMode, SimConfig, StepMode};
pub use simulator::utils::log;
