// PE register state and its per-edge transition function.
//
// The transition is a pure function of (state, input): every read sees the
// state from before the edge, and the returned value is the state after it.

use serde::{Deserialize, Serialize};

use super::params::PeParams;
use super::signals::{Hazard, PeInput, PeOutput, REGFILE_SLOTS, WEIGHT_SLOTS};

/// Every register the PE owns.
///
/// The register file is kept as an accumulator plus a separate weight cache;
/// `regfile()` assembles the 4-slot view with the accumulator in slot 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeState {
  /// Running dot product (register-file slot 0).
  pub acc: u32,
  /// Cached weights (register-file slots 1-3).
  pub weights: [u8; WEIGHT_SLOTS],
  /// Output latch.
  pub out: u32,
}

impl PeState {
  /// Register file as seen from outside.
  pub fn regfile(&self) -> [u32; REGFILE_SLOTS] {
    let mut view = [0u32; REGFILE_SLOTS];
    view[0] = self.acc;
    for (slot, weight) in view[1..].iter_mut().zip(self.weights.iter()) {
      *slot = u32::from(*weight);
    }
    view
  }

  /// Output latch and register file as they stand, with no edge applied.
  pub fn output(&self) -> PeOutput {
    self.observe(Vec::new())
  }

  /// Compute the state after one clock edge.
  ///
  /// Reset wins over everything else. Otherwise the edge always adds one
  /// MAC term; `store` also caches the live weight, `reuse` swaps in a cached
  /// weight as operand B, and `finish` moves the new sum into the output
  /// latch and clears the accumulator.
  pub fn next(&self, input: &PeInput, params: &PeParams) -> (PeState, PeOutput) {
    if input.reset {
      let cleared = PeState::default();
      return (cleared, cleared.output());
    }

    let hazards = Self::hazards(input);
    let slot = input.address.weight_slot();

    let operand_b = match (input.reuse, slot) {
      (true, Some(index)) => self.weights[index],
      _ => input.weight,
    };
    let product = u32::from(input.activation) * u32::from(operand_b);
    let sum = self.acc.wrapping_add(product) & params.acc_mask();

    let mut next = *self;
    if let (true, Some(index)) = (input.store, slot) {
      next.weights[index] = input.weight;
    }
    if input.finish {
      next.out = sum;
      next.acc = 0;
    } else {
      next.acc = sum;
    }

    (next, next.observe(hazards))
  }

  fn hazards(input: &PeInput) -> Vec<Hazard> {
    let mut hazards = Vec::new();
    if (input.store || input.reuse) && input.address.weight_slot().is_none() {
      hazards.push(Hazard::AccumulatorAddressed {
        store: input.store,
        reuse: input.reuse,
      });
    }
    if input.store && input.reuse {
      hazards.push(Hazard::StoreReuseConflict {
        address: input.address,
      });
    }
    hazards
  }

  fn observe(&self, hazards: Vec<Hazard>) -> PeOutput {
    PeOutput {
      out: self.out,
      regfile: self.regfile(),
      hazards,
    }
  }
}
