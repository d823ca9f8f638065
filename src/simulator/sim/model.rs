use log::LevelFilter;
use sim::simulator::{Message, Simulation};
use std::fs::File;
use std::io::{self, BufWriter, Result, Write};

use crate::arch::pe::main::{DRIVE_PORT, OBSERVE_PORT, PE_MODEL_ID};
use crate::arch::pe::{create_simulation, PeInput, PeOutput, PeParams};

/// Steps needed per edge: one to deliver the drive message, one to reach the
/// PE's internal event. Anything beyond that means the model went quiet.
const MAX_STEPS_PER_EDGE: usize = 4;

/// Advance the simulation by one step, logging and tracing its messages.
pub fn model_step(simulation: &mut Simulation, trace_writer: &mut Option<BufWriter<File>>) -> Result<Vec<Message>> {
  let messages = simulation
    .step()
    .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Simulation error: {:?}", e)))?;

  if log::max_level() >= LevelFilter::Debug {
    for msg in messages.iter() {
      log::debug!(
        "[MSG] t={:.1} {}:{} -> {}:{} | {}",
        msg.time(),
        msg.source_id(),
        msg.source_port(),
        msg.target_id(),
        msg.target_port(),
        msg.content()
      );
    }
  }

  if let Some(writer) = trace_writer {
    for msg in messages.iter() {
      let trace_entry = serde_json::json!({
        "time": msg.time(),
        "source": msg.source_id(),
        "source_port": msg.source_port(),
        "target": msg.target_id(),
        "target_port": msg.target_port(),
        "content": msg.content()
      });
      writeln!(writer, "{}", trace_entry)?;
    }
    writer.flush()?;
  }

  Ok(messages)
}

/// Drives a PE that lives inside the discrete-event engine, one edge at a time.
pub struct CycleDriver {
  simulation: Simulation,
}

impl CycleDriver {
  pub fn new(params: PeParams) -> Result<Self> {
    Ok(Self {
      simulation: create_simulation(params)?,
    })
  }

  /// Send one set of signals to the PE and wait for the edge it produces.
  pub fn drive_edge(&mut self, input: &PeInput, trace_writer: &mut Option<BufWriter<File>>) -> Result<PeOutput> {
    let content = serde_json::to_string(input)?;
    let msg = Message::new(
      String::from("driver"),
      String::from("stimulus"),
      String::from(PE_MODEL_ID),
      String::from(DRIVE_PORT),
      self.simulation.get_global_time(),
      content,
    );
    self.simulation.inject_input(msg);

    for _ in 0..MAX_STEPS_PER_EDGE {
      let messages = model_step(&mut self.simulation, trace_writer)?;
      let observed = messages
        .iter()
        .find(|msg| msg.source_id() == PE_MODEL_ID && msg.source_port() == OBSERVE_PORT);
      if let Some(msg) = observed {
        return serde_json::from_str::<PeOutput>(msg.content()).map_err(io::Error::from);
      }
    }

    Err(io::Error::new(
      io::ErrorKind::Other,
      format!("PE produced no output within {} steps", MAX_STEPS_PER_EDGE),
    ))
  }

  pub fn global_time(&self) -> f64 {
    self.simulation.get_global_time()
  }

  pub fn simulation(&mut self) -> &mut Simulation {
    &mut self.simulation
  }
}
