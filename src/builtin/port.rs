/// Port and signal types for module interconnection

/// A wire/signal that carries data between modules.
/// Every wire carries a valid flag next to its value.
#[derive(Clone, Debug, PartialEq)]
pub struct Wire<T: Clone> {
  pub value: T,
  pub valid: bool,
}

impl<T: Clone> Wire<T> {
  /// Drive a value onto the wire and mark it valid.
  pub fn set(&mut self, value: T) {
    self.value = value;
    self.valid = true;
  }

  /// Take the value if it is valid, clearing the flag.
  pub fn take(&mut self) -> Option<T> {
    if self.valid {
      self.valid = false;
      Some(self.value.clone())
    } else {
      None
    }
  }
}

impl<T: Clone + Default> Default for Wire<T> {
  fn default() -> Self {
    Self {
      value: T::default(),
      valid: false,
    }
  }
}
