use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

use crate::arch::pe::PeParams;
use crate::simulator::sim::mode::{RunMode, SimConfig, StepMode};

const DEFAULT_CONFIG: &str = include_str!("default.toml");

/// PE parameters section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PeSection {
  #[serde(default = "default_acc_bits")]
  pub acc_bits: u32,
  #[serde(default = "default_latency")]
  pub latency: usize,
}

fn default_acc_bits() -> u32 {
  PeParams::default().acc_bits
}

fn default_latency() -> usize {
  PeParams::default().latency
}

impl Default for PeSection {
  fn default() -> Self {
    Self {
      acc_bits: default_acc_bits(),
      latency: default_latency(),
    }
  }
}

/// Simulation section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSection {
  #[serde(default = "default_run_mode")]
  pub run_mode: String,
  #[serde(default)]
  pub quiet: bool,
  #[serde(default)]
  pub step_mode: bool,
  #[serde(default)]
  pub trace_file: String,
}

fn default_run_mode() -> String {
  "func".to_string()
}

impl Default for SimulationSection {
  fn default() -> Self {
    Self {
      run_mode: default_run_mode(),
      quiet: false,
      step_mode: false,
      trace_file: String::new(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
  #[serde(default)]
  pub pe: PeSection,
  #[serde(default)]
  pub simulation: SimulationSection,
}

/// Values given on the command line; `None`/`false` leaves the config alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides<'a> {
  pub quiet: bool,
  pub step: bool,
  pub trace_file: Option<&'a str>,
  pub run_mode: Option<&'a str>,
  pub latency: Option<usize>,
  pub acc_bits: Option<u32>,
}

fn invalid_data(e: config::ConfigError) -> io::Error {
  io::Error::new(io::ErrorKind::InvalidData, format!("Failed to load config: {}", e))
}

/// Load the layered configuration: built-in defaults, then `path` if given,
/// then `PESIM_*` environment variables.
pub fn load_config(path: Option<&Path>) -> io::Result<AppConfig> {
  let env = Environment::with_prefix("PESIM")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true);
  build_config(path, Some(env))
}

fn build_config(path: Option<&Path>, env: Option<Environment>) -> io::Result<AppConfig> {
  let mut builder = Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

  if let Some(path) = path {
    if !path.exists() {
      return Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("Cannot read config file {:?}", path),
      ));
    }
    builder = builder.add_source(File::from(path).format(FileFormat::Toml));
  }

  if let Some(env) = env {
    builder = builder.add_source(env);
  }

  builder
    .build()
    .map_err(invalid_data)?
    .try_deserialize::<AppConfig>()
    .map_err(invalid_data)
}

/// Apply CLI overrides on top of the loaded configuration
pub fn apply_cli_overrides(config: &mut AppConfig, cli: &CliOverrides) {
  if cli.quiet {
    config.simulation.quiet = true;
  }
  if cli.step {
    config.simulation.step_mode = true;
  }
  if let Some(trace_file) = cli.trace_file {
    config.simulation.trace_file = trace_file.to_string();
  }
  if let Some(run_mode) = cli.run_mode {
    config.simulation.run_mode = run_mode.to_string();
  }
  if let Some(latency) = cli.latency {
    config.pe.latency = latency;
  }
  if let Some(acc_bits) = cli.acc_bits {
    config.pe.acc_bits = acc_bits;
  }
}

impl AppConfig {
  /// Validate and convert into the runtime configuration.
  pub fn to_sim_config(&self) -> io::Result<SimConfig> {
    let pe = PeParams::new(self.pe.acc_bits, self.pe.latency)?;
    let run_mode = self.simulation.run_mode.parse::<RunMode>()?;
    let step_mode = if self.simulation.step_mode {
      StepMode::Step
    } else {
      StepMode::Continuous
    };
    let trace_file = match self.simulation.trace_file.trim() {
      "" => None,
      path => Some(path.to_string()),
    };

    Ok(SimConfig {
      run_mode,
      quiet: self.simulation.quiet,
      step_mode,
      trace_file,
      pe,
    })
  }
}
