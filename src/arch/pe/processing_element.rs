// ===========================================
// Processing Element (PE) Module
// ===========================================

use std::io;

use super::params::PeParams;
use super::pipeline::IssueSlot;
use super::signals::{PeInput, PeOutput, REGFILE_SLOTS};
use super::state::PeState;
use crate::builtin::{Module, Wire};

/// Processing Element (PE) - multiply-accumulate cell with a weight register file
#[derive(Debug, Clone)]
pub struct ProcessingElement {
  name: String,
  params: PeParams,
  /// Registers after the last edge
  state: PeState,
  /// Operation latched but not yet committed
  slot: IssueSlot,
  /// Edges seen since power-up or the last `Module::reset`
  cycle: u64,

  // 输入：本周期采样的信号
  pub input: Wire<PeInput>,

  // 输出：本周期结束后的 out / regfile
  pub output: Wire<PeOutput>,
}

impl ProcessingElement {
  /// Create a new processing element
  ///
  /// # Arguments
  /// * `name` - Instance name used in logs
  /// * `params` - Accumulator width and pipeline latency
  ///
  /// # Returns
  /// A PE with every register at zero, or `InvalidInput` for bad parameters
  pub fn new(name: impl Into<String>, params: PeParams) -> io::Result<Self> {
    params.validate()?;
    Ok(Self {
      name: name.into(),
      params,
      state: PeState::default(),
      slot: IssueSlot::new(params.latency),
      cycle: 0,
      input: Wire::default(),
      output: Wire::default(),
    })
  }

  /// Apply one clock edge
  ///
  /// # Arguments
  /// * `input` - Signals sampled on this edge
  ///
  /// # Returns
  /// The output latch and register file after the edge
  pub fn step(&mut self, input: PeInput) -> PeOutput {
    self.cycle += 1;

    let committed = if input.reset {
      self.slot.flush();
      Some(input)
    } else {
      self.slot.advance(input)
    };

    let output = match &committed {
      Some(op) => {
        let (next, output) = self.state.next(op, &self.params);
        self.state = next;
        output
      },
      None => self.state.output(),
    };

    for hazard in &output.hazards {
      log::warn!("[{}] cycle {}: {}", self.name, self.cycle, hazard);
    }
    match &committed {
      Some(op) => log::debug!(
        "[{}] cycle {}: sampled [{}] committed [{}] -> out={} regfile={:?}",
        self.name,
        self.cycle,
        input,
        op,
        output.out,
        output.regfile
      ),
      None => log::debug!(
        "[{}] cycle {}: sampled [{}] busy={} -> out={} regfile={:?}",
        self.name,
        self.cycle,
        input,
        self.slot.busy(),
        output.out,
        output.regfile
      ),
    }

    output
  }

  /// Output latch
  pub fn out(&self) -> u32 {
    self.state.out
  }

  /// Running dot product (register-file slot 0)
  pub fn acc(&self) -> u32 {
    self.state.acc
  }

  /// Register file view, readable at any time
  pub fn regfile(&self) -> [u32; REGFILE_SLOTS] {
    self.state.regfile()
  }

  pub fn state(&self) -> &PeState {
    &self.state
  }

  pub fn params(&self) -> &PeParams {
    &self.params
  }

  pub fn cycle_count(&self) -> u64 {
    self.cycle
  }

  /// Whether an operation is in flight
  pub fn busy(&self) -> bool {
    self.slot.busy()
  }
}

impl Module for ProcessingElement {
  fn run(&mut self) {
    // 未驱动的输入线等价于全部信号为低
    let input = self.input.take().unwrap_or_default();
    let output = self.step(input);
    self.output.set(output);
  }

  fn reset(&mut self) {
    self.state = PeState::default();
    self.slot = IssueSlot::new(self.params.latency);
    self.cycle = 0;
    self.input = Wire::default();
    self.output = Wire::default();
  }

  fn name(&self) -> &str {
    &self.name
  }
}
