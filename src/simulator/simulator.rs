use std::fs::File;
use std::io::{self, BufWriter, Result};

use super::sim::mode::{RunMode, SimConfig, StepMode};
use super::sim::model::CycleDriver;
use super::sim::shell::{apply_assignment, Command, Shell};
use super::stimulus::{Mismatch, Program, RunReport};
use super::utils::report::{open_trace, print_simulation_records, write_edge_trace};
use crate::arch::pe::main::PE_MODEL_ID;
use crate::arch::pe::{PeInput, PeOutput, ProcessingElement};

/// Where the PE lives while it is being driven
enum Backend {
  Func(ProcessingElement),
  Cycle(CycleDriver),
}

/// Stimulus driver around one PE
pub struct Simulator {
  config: SimConfig,
  backend: Backend,
  trace_writer: Option<BufWriter<File>>,
  cycle: u64,
  last: PeOutput,
}

impl Simulator {
  pub fn new(config: SimConfig) -> Result<Self> {
    let backend = match config.run_mode {
      RunMode::Func => Backend::Func(ProcessingElement::new(PE_MODEL_ID, config.pe)?),
      RunMode::Cycle => Backend::Cycle(CycleDriver::new(config.pe)?),
    };
    let trace_writer = open_trace(config.trace_file.as_deref())?;

    log::info!(
      "PE configured: acc_bits={}, latency={}, mode={:?}",
      config.pe.acc_bits,
      config.pe.latency,
      config.run_mode
    );

    Ok(Self {
      config,
      backend,
      trace_writer,
      cycle: 0,
      last: PeOutput::default(),
    })
  }

  /// Apply one clock edge with `input` on the PE ports.
  pub fn edge(&mut self, input: &PeInput) -> Result<PeOutput> {
    let output = match &mut self.backend {
      Backend::Func(pe) => {
        let output = pe.step(*input);
        if let Some(writer) = self.trace_writer.as_mut() {
          write_edge_trace(writer, self.cycle + 1, input, &output)?;
        }
        output
      },
      // The DEVS engine traces its own messages.
      Backend::Cycle(driver) => driver.drive_edge(input, &mut self.trace_writer)?,
    };

    self.cycle += 1;
    self.last = output.clone();
    Ok(output)
  }

  /// Output after the most recent edge.
  pub fn last_output(&self) -> &PeOutput {
    &self.last
  }

  pub fn cycle_count(&self) -> u64 {
    self.cycle
  }

  /// Run a whole program, or hand it to the step shell in step mode.
  pub fn run(&mut self, program: &Program) -> Result<RunReport> {
    match self.config.step_mode {
      StepMode::Continuous => self.run_program(program),
      StepMode::Step => self.run_step_mode(Some(program)),
    }
  }

  /// Play every op of `program`, checking expectations after each op's last
  /// edge. Mismatches are collected, never fatal.
  pub fn run_program(&mut self, program: &Program) -> Result<RunReport> {
    log::info!(
      "Running {} ops over {} edges",
      program.ops.len(),
      program.total_cycles()
    );
    let mut report = RunReport::default();
    for index in 0..program.ops.len() {
      self.run_op(program, index, &mut report)?;
    }
    self.finish_report(&mut report);
    Ok(report)
  }

  fn run_op(&mut self, program: &Program, index: usize, report: &mut RunReport) -> Result<()> {
    let op = &program.ops[index];
    let input = op.input();
    let mut output = self.last.clone();
    for _ in 0..op.cycles {
      output = self.edge(&input)?;
    }

    report.ops += 1;
    report.checks += op.expect.count();

    for (signal, expected, actual) in op.expect.check(&output) {
      let mismatch = Mismatch {
        op: index,
        cycle: self.cycle,
        signal,
        expected,
        actual,
      };
      log::error!("{}", mismatch);
      report.mismatches.push(mismatch);
    }
    Ok(())
  }

  fn finish_report(&mut self, report: &mut RunReport) {
    report.cycles = self.cycle;
    report.last = self.last.clone();

    if let Backend::Cycle(driver) = &mut self.backend {
      if !self.config.quiet {
        print_simulation_records(driver.simulation());
      }
    }
  }

  /// Interactive stepping. With a program each step plays one op, without
  /// one each step is a single edge with the signals set in the shell.
  pub fn run_step_mode(&mut self, program: Option<&Program>) -> Result<RunReport> {
    let mut shell = Shell::new()?;
    let mut report = RunReport::default();
    let mut input = PeInput::default();
    let mut next_op = 0;
    let op_count = program.map(|p| p.ops.len()).unwrap_or(0);

    println!("Step mode - Enter steps once, 'si N' steps N, 'set k=v', 'show', 'c' continues, 'q' quits");

    loop {
      match shell.read_command()? {
        Command::Quit => break,
        Command::Show => self.print_state(),
        Command::Set(assignments) => {
          for (key, value) in assignments {
            if let Err(msg) = apply_assignment(&mut input, &key, &value) {
              eprintln!("Error: {}", msg);
            }
          }
        },
        Command::Step(n) => {
          for _ in 0..n {
            match program {
              Some(program) if next_op < op_count => {
                self.run_op(program, next_op, &mut report)?;
                next_op += 1;
              },
              Some(_) => {
                println!("Program finished");
                break;
              },
              None => {
                self.edge(&input)?;
              },
            }
          }
          self.print_state();
        },
        Command::Continue => match program {
          Some(program) => {
            while next_op < op_count {
              self.run_op(program, next_op, &mut report)?;
              next_op += 1;
            }
            self.print_state();
            break;
          },
          None => eprintln!("Error: 'c' needs a stimulus program"),
        },
      }
    }

    self.finish_report(&mut report);
    Ok(report)
  }

  fn print_state(&self) {
    println!(
      "cycle {}: out={} regfile={:?}",
      self.cycle, self.last.out, self.last.regfile
    );
    for hazard in &self.last.hazards {
      println!("  hazard: {}", hazard);
    }
  }
}

impl Drop for Simulator {
  fn drop(&mut self) {
    if let Some(writer) = self.trace_writer.as_mut() {
      if let Err(e) = io::Write::flush(writer) {
        log::warn!("Failed to flush trace: {}", e);
      }
    }
  }
}
