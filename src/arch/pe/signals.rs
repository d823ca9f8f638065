use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of register-file slots, slot 0 included.
pub const REGFILE_SLOTS: usize = 4;

/// Number of weight slots (register-file slots 1..=3).
pub const WEIGHT_SLOTS: usize = REGFILE_SLOTS - 1;

/// 2-bit register-file address.
///
/// Slot 0 aliases the accumulator, slots 1-3 are weight slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RegAddr(u8);

impl RegAddr {
  pub const ACC: RegAddr = RegAddr(0);
  pub const SLOT1: RegAddr = RegAddr(1);
  pub const SLOT2: RegAddr = RegAddr(2);
  pub const SLOT3: RegAddr = RegAddr(3);

  pub fn index(self) -> usize {
    self.0 as usize
  }

  /// Index into the weight cache, `None` for the accumulator slot.
  pub fn weight_slot(self) -> Option<usize> {
    match self.0 {
      0 => None,
      n => Some(n as usize - 1),
    }
  }
}

impl TryFrom<u8> for RegAddr {
  type Error = String;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    if (value as usize) < REGFILE_SLOTS {
      Ok(RegAddr(value))
    } else {
      Err(format!("register address {} out of range 0..=3", value))
    }
  }
}

impl From<RegAddr> for u8 {
  fn from(addr: RegAddr) -> u8 {
    addr.0
  }
}

impl fmt::Display for RegAddr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "r{}", self.0)
  }
}

/// Signals sampled by the PE on one clock edge.
///
/// The default value is the idle input: every signal low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeInput {
  /// MAC operand A.
  #[serde(alias = "act")]
  pub activation: u8,
  /// MAC operand B, and the payload of `store`.
  #[serde(alias = "wgt")]
  pub weight: u8,
  /// Write `weight` into `regfile[address]`.
  pub store: bool,
  /// Use `regfile[address]` as operand B instead of `weight`.
  pub reuse: bool,
  #[serde(alias = "addr")]
  pub address: RegAddr,
  /// Latch the accumulator to `out` and clear it (a.k.a. `update_out`).
  #[serde(alias = "update_out")]
  pub finish: bool,
  /// Synchronous clear of every register.
  #[serde(alias = "rst")]
  pub reset: bool,
}

impl PeInput {
  /// A plain multiply-accumulate of `activation * weight`.
  pub fn mac(activation: u8, weight: u8) -> Self {
    Self {
      activation,
      weight,
      ..Self::default()
    }
  }

  /// The reset input; every other signal low.
  pub fn reset() -> Self {
    Self {
      reset: true,
      ..Self::default()
    }
  }

  pub fn with_finish(mut self) -> Self {
    self.finish = true;
    self
  }

  /// Also store the live weight into `address`.
  pub fn with_store(mut self, address: RegAddr) -> Self {
    self.store = true;
    self.address = address;
    self
  }

  /// Take operand B from `address` instead of the weight input.
  pub fn with_reuse(mut self, address: RegAddr) -> Self {
    self.reuse = true;
    self.address = address;
    self
  }

  pub fn is_idle(&self) -> bool {
    *self == Self::default()
  }
}

impl fmt::Display for PeInput {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "act={} wgt={} store={} reuse={} addr={} finish={} reset={}",
      self.activation,
      self.weight,
      self.store as u8,
      self.reuse as u8,
      self.address,
      self.finish as u8,
      self.reset as u8
    )
  }
}

/// Control combinations whose resolution is implementation-defined.
///
/// They are resolved deterministically and reported, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hazard {
  /// `store` and `reuse` on the same edge. Reuse reads the slot's value
  /// from before the edge, then store overwrites it.
  StoreReuseConflict { address: RegAddr },
  /// `store` or `reuse` aimed at slot 0. The store is dropped and reuse
  /// falls back to the live weight input.
  AccumulatorAddressed { store: bool, reuse: bool },
}

impl fmt::Display for Hazard {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Hazard::StoreReuseConflict { address } => {
        write!(f, "store and reuse both target {}", address)
      },
      Hazard::AccumulatorAddressed { store, reuse } => {
        let op = match (store, reuse) {
          (true, true) => "store+reuse",
          (true, false) => "store",
          _ => "reuse",
        };
        write!(f, "{} addressed the accumulator slot r0", op)
      },
    }
  }
}

/// What the PE shows after an edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeOutput {
  /// Output latch.
  pub out: u32,
  /// Register file view: accumulator in slot 0, weights in slots 1-3.
  pub regfile: [u32; REGFILE_SLOTS],
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub hazards: Vec<Hazard>,
}

impl PeOutput {
  pub fn acc(&self) -> u32 {
    self.regfile[0]
  }
}
