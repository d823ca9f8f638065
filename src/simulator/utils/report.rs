use sim::models::{Model, Reportable};
use sim::simulator::Simulation;
use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::arch::pe::{PeInput, PeOutput};
use crate::simulator::stimulus::RunReport;

/// Open the JSON-lines trace file, if one was requested.
pub fn open_trace(path: Option<&str>) -> io::Result<Option<BufWriter<File>>> {
  match path {
    Some(path) => {
      let file = File::create(path)
        .map_err(|e| io::Error::new(e.kind(), format!("Cannot create trace file {}: {}", path, e)))?;
      Ok(Some(BufWriter::new(file)))
    },
    None => Ok(None),
  }
}

/// Append one edge to the trace.
pub fn write_edge_trace(writer: &mut BufWriter<File>, cycle: u64, input: &PeInput, output: &PeOutput) -> io::Result<()> {
  let trace_entry = serde_json::json!({
    "cycle": cycle,
    "input": input,
    "output": output,
  });
  writeln!(writer, "{}", trace_entry)
}

pub fn print_simulation_records(simulation: &mut Simulation) {
  println!("\n--- Simulation Records ---");

  for model in simulation.models().iter() {
    print_model_records(model);
  }

  println!("--- End Records ---\n");
}

fn print_model_records(model: &Model) {
  let records = model.records();
  if records.is_empty() {
    return;
  }

  println!("\n[{}] {}", model.id(), model.status());
  for record in records {
    println!("  Time {:.1}: {} {}", record.time, record.action, record.subject);
  }
}

/// Summarise a run on stdout.
pub fn print_report(report: &RunReport) {
  println!(
    "{} ops, {} cycles, {} checks, {} mismatches",
    report.ops,
    report.cycles,
    report.checks,
    report.mismatches.len()
  );
  for mismatch in &report.mismatches {
    println!("  FAIL {}", mismatch);
  }
  println!(
    "final: out={} regfile={:?}",
    report.last.out, report.last.regfile
  );
  println!("{}", if report.passed() { "PASS" } else { "FAIL" });
}
