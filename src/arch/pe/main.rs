use sim::models::Model;
use sim::simulator::{Connector, Simulation};
use std::io;

use super::devs::{Monitor, PeModel};
use super::params::PeParams;
use super::processing_element::ProcessingElement;

pub const PE_MODEL_ID: &str = "pe";
pub const MONITOR_MODEL_ID: &str = "monitor";
pub const DRIVE_PORT: &str = "drive";
pub const OBSERVE_PORT: &str = "observe";
pub const SAMPLE_PORT: &str = "sample";

/// One clock period in simulation time units.
pub const CLOCK_PERIOD: f64 = 1.0;

/// Build a simulation holding one PE and the monitor that samples it.
pub fn create_simulation(params: PeParams) -> io::Result<Simulation> {
  let pe = ProcessingElement::new(PE_MODEL_ID, params)?;

  let models = vec![
    Model::new(
      String::from(PE_MODEL_ID),
      Box::new(PeModel::new(
        pe,
        String::from(DRIVE_PORT),
        String::from(OBSERVE_PORT),
        CLOCK_PERIOD,
      )),
    ),
    Model::new(
      String::from(MONITOR_MODEL_ID),
      Box::new(Monitor::new(String::from(SAMPLE_PORT))),
    ),
  ];

  let connectors = vec![Connector::new(
    String::from("pe_monitor"),
    String::from(PE_MODEL_ID),      // source_id
    String::from(MONITOR_MODEL_ID), // target_id
    String::from(OBSERVE_PORT),     // source_port
    String::from(SAMPLE_PORT),      // target_port
  )];

  Ok(Simulation::post(models, connectors))
}
