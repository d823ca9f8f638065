use clap::Parser;
use pesim::log::init_log;
use pesim::simulator::config::{apply_cli_overrides, load_config, CliOverrides};
use pesim::simulator::stimulus::load_program;
use pesim::simulator::utils::report::print_report;
use pesim::simulator::Simulator;
use std::path::PathBuf;
use std::process::ExitCode;

/// pesim - cycle-accurate processing element simulator
#[derive(Parser, Debug)]
#[command(name = "pesim")]
#[command(version = "0.1.0")]
#[command(about = "Drive a MAC processing element with a stimulus program", long_about = None)]
struct Args {
  /// Stimulus program (TOML). Without one, step mode starts directly.
  #[arg(value_name = "STIMULUS")]
  stimulus: Option<PathBuf>,

  /// Enable step mode (interactive stepping)
  #[arg(short, long)]
  step: bool,

  /// Quiet mode (warnings and errors only)
  #[arg(short, long)]
  quiet: bool,

  /// Configuration file layered over the built-in defaults
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Output trace file path (JSON lines)
  #[arg(long, value_name = "FILE")]
  trace_file: Option<String>,

  /// Run mode: func (direct) or cycle (discrete-event engine)
  #[arg(short, long, value_name = "MODE")]
  mode: Option<String>,

  /// Edges from sampling an input to its effect
  #[arg(long, value_name = "N")]
  latency: Option<usize>,

  /// Accumulator width in bits (16..=32)
  #[arg(long, value_name = "BITS")]
  acc_bits: Option<u32>,
}

fn main() -> std::io::Result<ExitCode> {
  let args = Args::parse();

  let mut app_config = load_config(args.config.as_deref())?;
  apply_cli_overrides(
    &mut app_config,
    &CliOverrides {
      quiet: args.quiet,
      step: args.step || args.stimulus.is_none(),
      trace_file: args.trace_file.as_deref(),
      run_mode: args.mode.as_deref(),
      latency: args.latency,
      acc_bits: args.acc_bits,
    },
  );
  let config = app_config.to_sim_config()?;

  init_log(config.quiet);

  let program = match &args.stimulus {
    Some(path) => Some(load_program(path)?),
    None => None,
  };

  let mut simulator = Simulator::new(config)?;

  let Some(program) = program else {
    simulator.run_step_mode(None)?;
    return Ok(ExitCode::SUCCESS);
  };

  let report = simulator.run(&program)?;
  print_report(&report);
  if report.passed() {
    Ok(ExitCode::SUCCESS)
  } else {
    Ok(ExitCode::FAILURE)
  }
}
