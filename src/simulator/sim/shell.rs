use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Result};

use crate::arch::pe::{PeInput, RegAddr};

pub enum Command {
  Step(u32), // Step N edges
  Set(Vec<(String, String)>),
  Show,
  Quit,
  Continue,
}

pub struct Shell {
  editor: DefaultEditor,
}

impl Shell {
  pub fn new() -> Result<Self> {
    let editor = DefaultEditor::new().map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(Self { editor })
  }

  pub fn read_command(&mut self) -> Result<Command> {
    loop {
      match self.editor.readline("(pesim) ") {
        Ok(line) => {
          let trimmed = line.trim();

          if !trimmed.is_empty() {
            let _ = self.editor.add_history_entry(trimmed);
          }

          match parse_command(trimmed) {
            Ok(cmd) => return Ok(cmd),
            Err(msg) => eprintln!("Error: {}", msg),
          }
        },
        // Ctrl-C / Ctrl-D: quit
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(Command::Quit),
        Err(err) => return Err(io::Error::new(io::ErrorKind::Other, err)),
      }
    }
  }
}

/// Parse one shell line. Empty input steps once.
pub fn parse_command(line: &str) -> std::result::Result<Command, String> {
  if line.is_empty() {
    return Ok(Command::Step(1));
  }

  if let Some(rest) = line.strip_prefix("si") {
    let num_str = rest.trim();
    if num_str.is_empty() {
      return Err("'si' requires a number, e.g., 'si 10'".to_string());
    }
    return match num_str.parse::<u32>() {
      Ok(n) if n > 0 => Ok(Command::Step(n)),
      Ok(_) => Err("step count must be greater than 0".to_string()),
      Err(e) => Err(format!("invalid number '{}': {}", num_str, e)),
    };
  }

  if let Some(rest) = line.strip_prefix("set") {
    let mut assignments = Vec::new();
    for pair in rest.split_whitespace() {
      match pair.split_once('=') {
        Some((key, value)) => assignments.push((key.to_string(), value.to_string())),
        None => return Err(format!("expected key=value, got '{}'", pair)),
      }
    }
    if assignments.is_empty() {
      return Err("'set' requires assignments, e.g., 'set act=3 wgt=4'".to_string());
    }
    return Ok(Command::Set(assignments));
  }

  match line {
    "show" => Ok(Command::Show),
    "q" => Ok(Command::Quit),
    "c" => Ok(Command::Continue),
    _ => Err(format!(
      "Unknown command: '{}'. Use Enter to step, 'si N' to step N edges, 'set k=v ..', 'show', 'c' to continue, 'q' to quit",
      line
    )),
  }
}

/// Drive one signal of `input` from a shell assignment.
pub fn apply_assignment(input: &mut PeInput, key: &str, value: &str) -> std::result::Result<(), String> {
  let as_u8 = || value.parse::<u8>().map_err(|e| format!("{}={}: {}", key, value, e));
  let as_bit = || match value {
    "1" | "true" => Ok(true),
    "0" | "false" => Ok(false),
    _ => Err(format!("{}={}: expected 0 or 1", key, value)),
  };

  match key {
    "act" | "activation" => input.activation = as_u8()?,
    "wgt" | "weight" => input.weight = as_u8()?,
    "addr" | "address" => input.address = RegAddr::try_from(as_u8()?)?,
    "store" => input.store = as_bit()?,
    "reuse" => input.reuse = as_bit()?,
    "finish" | "update_out" => input.finish = as_bit()?,
    "rst" | "reset" => input.reset = as_bit()?,
    _ => return Err(format!("unknown signal '{}'", key)),
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_step_commands() {
    assert!(matches!(parse_command(""), Ok(Command::Step(1))));
    assert!(matches!(parse_command("si 12"), Ok(Command::Step(12))));
    assert!(parse_command("si").is_err());
    assert!(parse_command("si 0").is_err());
    assert!(parse_command("si x").is_err());
    assert!(matches!(parse_command("q"), Ok(Command::Quit)));
    assert!(matches!(parse_command("c"), Ok(Command::Continue)));
    assert!(matches!(parse_command("show"), Ok(Command::Show)));
    assert!(parse_command("run").is_err());
  }

  #[test]
  fn test_parse_set() {
    match parse_command("set act=3 wgt=4") {
      Ok(Command::Set(pairs)) => {
        assert_eq!(pairs, vec![("act".to_string(), "3".to_string()), ("wgt".to_string(), "4".to_string())]);
      },
      _ => panic!("expected set command"),
    }
    assert!(parse_command("set").is_err());
    assert!(parse_command("set act").is_err());
  }

  #[test]
  fn test_apply_assignment() {
    let mut input = PeInput::default();
    apply_assignment(&mut input, "act", "200").unwrap();
    apply_assignment(&mut input, "wgt", "3").unwrap();
    apply_assignment(&mut input, "addr", "2").unwrap();
    apply_assignment(&mut input, "update_out", "1").unwrap();
    assert_eq!(input.activation, 200);
    assert_eq!(input.weight, 3);
    assert_eq!(input.address, RegAddr::SLOT2);
    assert!(input.finish);

    assert!(apply_assignment(&mut input, "act", "256").is_err());
    assert!(apply_assignment(&mut input, "addr", "4").is_err());
    assert!(apply_assignment(&mut input, "store", "yes").is_err());
    assert!(apply_assignment(&mut input, "clk", "1").is_err());
  }
}
