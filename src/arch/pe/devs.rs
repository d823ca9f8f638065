use serde::{Deserialize, Serialize};
use sim::models::model_trait::{DevsModel, Reportable, ReportableModel, SerializableModel};
use sim::models::{ModelMessage, ModelRecord};
use sim::simulator::Services;
use sim::utils::errors::SimulationError;
use std::collections::VecDeque;
use std::f64::INFINITY;

use super::processing_element::ProcessingElement;
use super::signals::{PeInput, PeOutput};
use crate::builtin::Module;
use crate::model_record;

/// The PE as a discrete-event model.
///
/// Each message on the drive port is one set of signals; the model applies
/// it one clock period later and publishes the resulting `PeOutput` on the
/// observe port. Messages carry JSON.
#[derive(Debug, Clone)]
pub struct PeModel {
  pe: ProcessingElement,
  drive_port: String,
  observe_port: String,
  period: f64,
  pending: VecDeque<PeInput>,
  until_next_event: f64,
  records: Vec<ModelRecord>,
}

impl PeModel {
  pub fn new(pe: ProcessingElement, drive_port: String, observe_port: String, period: f64) -> Self {
    Self {
      pe,
      drive_port,
      observe_port,
      period,
      pending: VecDeque::new(),
      until_next_event: INFINITY,
      records: Vec::new(),
    }
  }

  pub fn pe(&self) -> &ProcessingElement {
    &self.pe
  }
}

impl DevsModel for PeModel {
  fn events_ext(&mut self, incoming_message: &ModelMessage, services: &mut Services) -> Result<(), SimulationError> {
    if incoming_message.port_name != self.drive_port {
      return Ok(());
    }

    match serde_json::from_str::<PeInput>(&incoming_message.content) {
      Ok(input) => {
        self.pending.push_back(input);
        if self.until_next_event == INFINITY {
          self.until_next_event = self.period;
        }
        model_record!(self, services, "drive", incoming_message.content.as_str());
      },
      Err(e) => {
        log::warn!("[{}] dropping malformed drive message: {}", self.pe.name(), e);
        model_record!(self, services, "drop", format!("malformed input: {}", e));
      },
    }
    Ok(())
  }

  fn events_int(&mut self, services: &mut Services) -> Result<Vec<ModelMessage>, SimulationError> {
    let mut messages = Vec::new();

    if let Some(input) = self.pending.pop_front() {
      let output = self.pe.step(input);
      match serde_json::to_string(&output) {
        Ok(content) => {
          model_record!(self, services, "edge", content.as_str());
          messages.push(ModelMessage {
            content,
            port_name: self.observe_port.clone(),
          });
        },
        Err(e) => {
          log::warn!("[{}] failed to serialize output: {}", self.pe.name(), e);
        },
      }
    }

    self.until_next_event = if self.pending.is_empty() {
      INFINITY
    } else {
      self.period
    };

    Ok(messages)
  }

  fn time_advance(&mut self, time_delta: f64) {
    self.until_next_event -= time_delta;
  }

  fn until_next_event(&self) -> f64 {
    self.until_next_event
  }
}

impl Reportable for PeModel {
  fn status(&self) -> String {
    format!(
      "cycle={}, out={}, regfile={:?}, busy={}, pending={}",
      self.pe.cycle_count(),
      self.pe.out(),
      self.pe.regfile(),
      self.pe.busy(),
      self.pending.len()
    )
  }

  fn records(&self) -> &Vec<ModelRecord> {
    &self.records
  }
}

impl ReportableModel for PeModel {}

impl SerializableModel for PeModel {
  fn get_type(&self) -> &'static str {
    "ProcessingElement"
  }
}

/// Sink that samples the PE output port, like a verification monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monitor {
  sample_port: String,
  samples: usize,
  last: Option<PeOutput>,
  records: Vec<ModelRecord>,
}

impl Monitor {
  pub fn new(sample_port: String) -> Self {
    Self {
      sample_port,
      samples: 0,
      last: None,
      records: Vec::new(),
    }
  }
}

impl DevsModel for Monitor {
  fn events_ext(&mut self, incoming_message: &ModelMessage, services: &mut Services) -> Result<(), SimulationError> {
    if incoming_message.port_name != self.sample_port {
      return Ok(());
    }

    match serde_json::from_str::<PeOutput>(&incoming_message.content) {
      Ok(output) => {
        self.samples += 1;
        model_record!(self, services, "sample", format!("out={}, regfile={:?}", output.out, output.regfile));
        self.last = Some(output);
      },
      Err(e) => {
        log::warn!("[monitor] dropping malformed sample: {}", e);
        model_record!(self, services, "drop", format!("malformed output: {}", e));
      },
    }
    Ok(())
  }

  fn events_int(&mut self, _services: &mut Services) -> Result<Vec<ModelMessage>, SimulationError> {
    Ok(Vec::new())
  }

  fn time_advance(&mut self, _time_delta: f64) {}

  fn until_next_event(&self) -> f64 {
    INFINITY
  }
}

impl Reportable for Monitor {
  fn status(&self) -> String {
    match &self.last {
      Some(output) => format!("samples={}, out={}, regfile={:?}", self.samples, output.out, output.regfile),
      None => format!("samples={}", self.samples),
    }
  }

  fn records(&self) -> &Vec<ModelRecord> {
    &self.records
  }
}

impl ReportableModel for Monitor {}

impl SerializableModel for Monitor {
  fn get_type(&self) -> &'static str {
    "Monitor"
  }
}
