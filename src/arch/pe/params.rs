use serde::{Deserialize, Serialize};
use std::io;

/// Narrowest accumulator that still holds one 8x8-bit product.
pub const MIN_ACC_BITS: u32 = 16;
/// The accumulator is stored in a `u32`.
pub const MAX_ACC_BITS: u32 = 32;

/// PE build parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeParams {
  /// Width of the accumulator and the output latch.
  pub acc_bits: u32,
  /// Edges from sampling an input to its effect on the registers.
  pub latency: usize,
}

impl PeParams {
  pub fn new(acc_bits: u32, latency: usize) -> io::Result<Self> {
    let params = Self { acc_bits, latency };
    params.validate()?;
    Ok(params)
  }

  pub fn validate(&self) -> io::Result<()> {
    if !(MIN_ACC_BITS..=MAX_ACC_BITS).contains(&self.acc_bits) {
      return Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!(
          "acc_bits={} out of range {}..={}",
          self.acc_bits, MIN_ACC_BITS, MAX_ACC_BITS
        ),
      ));
    }
    if self.latency == 0 {
      return Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        "latency must be at least 1 edge",
      ));
    }
    Ok(())
  }

  /// Mask that truncates a sum to the accumulator width.
  pub fn acc_mask(&self) -> u32 {
    if self.acc_bits >= MAX_ACC_BITS {
      u32::MAX
    } else {
      (1u32 << self.acc_bits) - 1
    }
  }
}

impl Default for PeParams {
  fn default() -> Self {
    Self {
      acc_bits: MAX_ACC_BITS,
      latency: 1,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_params_validation() {
    assert!(PeParams::new(16, 1).is_ok());
    assert!(PeParams::new(32, 3).is_ok());

    let err = PeParams::new(12, 1).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    assert!(PeParams::new(33, 1).is_err());
    assert!(PeParams::new(20, 0).is_err());
  }

  #[test]
  fn test_acc_mask() {
    assert_eq!(PeParams::new(16, 1).unwrap().acc_mask(), 0xffff);
    assert_eq!(PeParams::new(20, 1).unwrap().acc_mask(), 0xf_ffff);
    assert_eq!(PeParams::default().acc_mask(), u32::MAX);
  }
}
