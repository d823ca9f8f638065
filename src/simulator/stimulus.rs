// Stimulus programs: an ordered list of operations, each holding a set of
// input signals for a number of clock edges and then checking the outputs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::arch::pe::{PeInput, PeOutput, RegAddr};

/// Values to check after an operation's last edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Expect {
  pub out: Option<u32>,
  /// Accumulator, register-file slot 0.
  pub acc: Option<u32>,
  pub slot1: Option<u32>,
  pub slot2: Option<u32>,
  pub slot3: Option<u32>,
}

impl Expect {
  /// Compare against an observed output, yielding (signal, expected, actual)
  /// for every mismatching check.
  pub fn check(&self, output: &PeOutput) -> Vec<(&'static str, u32, u32)> {
    let checks = [
      ("out", self.out, output.out),
      ("regfile[0]", self.acc, output.acc()),
      ("regfile[1]", self.slot1, output.regfile[1]),
      ("regfile[2]", self.slot2, output.regfile[2]),
      ("regfile[3]", self.slot3, output.regfile[3]),
    ];
    checks
      .into_iter()
      .filter_map(|(signal, expected, actual)| match expected {
        Some(expected) if expected != actual => Some((signal, expected, actual)),
        _ => None,
      })
      .collect()
  }

  /// Number of signals this expectation checks.
  pub fn count(&self) -> usize {
    [self.out, self.acc, self.slot1, self.slot2, self.slot3]
      .iter()
      .filter(|check| check.is_some())
      .count()
  }
}

/// One driver operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Op {
  #[serde(default, alias = "act")]
  pub activation: u8,
  #[serde(default, alias = "wgt")]
  pub weight: u8,
  #[serde(default)]
  pub store: bool,
  #[serde(default)]
  pub reuse: bool,
  #[serde(default, alias = "addr")]
  pub address: RegAddr,
  #[serde(default, alias = "update_out")]
  pub finish: bool,
  #[serde(default, alias = "rst")]
  pub reset: bool,
  /// Edges to hold the inputs for.
  #[serde(default = "default_cycles")]
  pub cycles: u32,
  #[serde(default)]
  pub expect: Expect,
}

fn default_cycles() -> u32 {
  1
}

impl Op {
  pub fn input(&self) -> PeInput {
    PeInput {
      activation: self.activation,
      weight: self.weight,
      store: self.store,
      reuse: self.reuse,
      address: self.address,
      finish: self.finish,
      reset: self.reset,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Program {
  #[serde(default, rename = "op")]
  pub ops: Vec<Op>,
}

impl Program {
  pub fn total_cycles(&self) -> u64 {
    self.ops.iter().map(|op| u64::from(op.cycles)).sum()
  }
}

fn invalid(msg: String) -> io::Error {
  io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// Parse a stimulus program from TOML text.
///
/// Syntax errors carry the TOML line and column; errors inside an operation
/// name its index.
pub fn parse_program(content: &str) -> io::Result<Program> {
  let mut table: toml::Table =
    toml::from_str(content).map_err(|e| invalid(format!("Failed to parse stimulus: {}", e)))?;

  let values = match table.remove("op") {
    None => Vec::new(),
    Some(toml::Value::Array(values)) => values,
    Some(_) => return Err(invalid("`op` must be an array of tables ([[op]])".to_string())),
  };
  if let Some(key) = table.keys().next() {
    return Err(invalid(format!("unknown top-level key `{}`", key)));
  }

  let ops = values
    .into_iter()
    .enumerate()
    .map(|(index, value)| {
      let op: Op = value.try_into().map_err(|e| invalid(format!("op {}: {}", index, e)))?;
      if op.cycles == 0 {
        return Err(invalid(format!("op {}: cycles must be at least 1", index)));
      }
      Ok(op)
    })
    .collect::<io::Result<Vec<_>>>()?;

  Ok(Program { ops })
}

/// Load a stimulus program from a TOML file.
pub fn load_program(path: &Path) -> io::Result<Program> {
  let content = fs::read_to_string(path)
    .map_err(|e| io::Error::new(e.kind(), format!("Cannot read stimulus {:?}: {}", path, e)))?;
  parse_program(&content)
}

/// A failed expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
  pub op: usize,
  pub cycle: u64,
  pub signal: &'static str,
  pub expected: u32,
  pub actual: u32,
}

impl fmt::Display for Mismatch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "op {} (cycle {}): {} expected {} got {}",
      self.op, self.cycle, self.signal, self.expected, self.actual
    )
  }
}

/// Outcome of running a program.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
  pub ops: usize,
  pub cycles: u64,
  pub checks: usize,
  pub mismatches: Vec<Mismatch>,
  /// Output after the last edge.
  pub last: PeOutput,
}

impl RunReport {
  pub fn passed(&self) -> bool {
    self.mismatches.is_empty()
  }
}
