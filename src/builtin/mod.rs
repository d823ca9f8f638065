/// Building blocks shared by clocked hardware models
pub mod port;

pub use port::Wire;

/// A clocked hardware module.
///
/// `run` is one rising clock edge: the module samples its input wires,
/// updates its registers and drives its output wires.
pub trait Module {
  /// Advance by one clock edge.
  fn run(&mut self);

  /// Return every register and wire to its power-up value.
  fn reset(&mut self);

  fn name(&self) -> &str;
}
