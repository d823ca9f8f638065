use super::signals::PeInput;

/// The operation a multi-cycle PE is working on.
///
/// A PE with latency `n` is busy for `n` edges per operation: it latches a
/// non-idle input on the first edge and commits it to the registers on the
/// `n`-th. Inputs sampled while busy are ignored, so a driver may hold an
/// operation's signals for all `n` edges. Idle inputs never start an
/// operation.
#[derive(Debug, Clone)]
pub struct IssueSlot {
  latency: usize,
  pending: Option<PeInput>,
  remaining: usize,
}

impl IssueSlot {
  pub fn new(latency: usize) -> Self {
    Self {
      latency: latency.max(1),
      pending: None,
      remaining: 0,
    }
  }

  /// Sample `input` on this edge and return the operation that commits on
  /// it, if any.
  pub fn advance(&mut self, input: PeInput) -> Option<PeInput> {
    if self.pending.is_none() {
      if input.is_idle() {
        return None;
      }
      self.pending = Some(input);
      self.remaining = self.latency;
    }

    self.remaining = self.remaining.saturating_sub(1);
    if self.remaining == 0 {
      self.pending.take()
    } else {
      None
    }
  }

  /// Drop the operation in flight.
  pub fn flush(&mut self) {
    self.pending = None;
    self.remaining = 0;
  }

  /// Whether an operation is latched and waiting to commit.
  pub fn busy(&self) -> bool {
    self.pending.is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_single_cycle_commits_every_edge() {
    let mut slot = IssueSlot::new(1);
    let input = PeInput::mac(1, 2);
    assert_eq!(slot.advance(input), Some(input));
    assert_eq!(slot.advance(input), Some(input));
    assert!(!slot.busy());
  }

  #[test]
  fn test_held_input_commits_once() {
    let mut slot = IssueSlot::new(3);
    let a = PeInput::mac(1, 1);
    let b = PeInput::mac(2, 2);

    assert_eq!(slot.advance(a), None);
    assert!(slot.busy());
    assert_eq!(slot.advance(a), None);
    assert_eq!(slot.advance(a), Some(a));
    assert!(!slot.busy());

    // A different input while busy does not replace the latched one.
    assert_eq!(slot.advance(b), None);
    assert_eq!(slot.advance(a), None);
    assert_eq!(slot.advance(PeInput::default()), Some(b));
  }

  #[test]
  fn test_idle_does_not_occupy() {
    let mut slot = IssueSlot::new(2);
    assert_eq!(slot.advance(PeInput::default()), None);
    assert!(!slot.busy());

    let input = PeInput::mac(4, 5);
    assert_eq!(slot.advance(input), None);
    assert_eq!(slot.advance(input), Some(input));
  }

  #[test]
  fn test_flush_drops_in_flight() {
    let mut slot = IssueSlot::new(2);
    slot.advance(PeInput::mac(9, 9));
    assert!(slot.busy());
    slot.flush();
    assert!(!slot.busy());
    assert_eq!(slot.advance(PeInput::default()), None);
  }
}
