// sagaflow/src/core/result.rs

//! Defines `StepResult`, the outcome of a single step or compensation invocation.

use super::value::Value;
use std::any::Any;

/// Outcome of one step invocation: success with optional output, or a reported failure.
///
/// A reported failure is ordinary control flow. Faults are returned as `Err` from
/// the step instead and never appear here.
#[derive(Debug, Clone)]
pub struct StepResult {
  output: Option<Value>,
  error: Option<String>,
}

impl StepResult {
  /// Success without output.
  pub fn success() -> Self {
    Self { output: None, error: None }
  }

  pub fn success_with<T: Any + Send + Sync>(output: T) -> Self {
    Self {
      output: Some(Value::new(output)),
      error: None,
    }
  }

  pub fn failure(error: impl Into<String>) -> Self {
    Self {
      output: None,
      error: Some(error.into()),
    }
  }

  pub fn is_success(&self) -> bool {
    self.error.is_none()
  }

  pub fn is_failure(&self) -> bool {
    self.error.is_some()
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn output(&self) -> Option<&Value> {
    self.output.as_ref()
  }

  /// Typed view of the output; `None` if absent or of another type.
  pub fn output_as<T: Any>(&self) -> Option<&T> {
    self.output.as_ref().and_then(Value::downcast_ref::<T>)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn failure_is_determined_by_error_presence() {
    assert!(StepResult::success().is_success());
    assert!(StepResult::success_with(7_i32).is_success());

    let failed = StepResult::failure("boom");
    assert!(failed.is_failure());
    assert_eq!(failed.error(), Some("boom"));
    assert!(failed.output().is_none());
  }

  #[test]
  fn output_is_typed() {
    let result = StepResult::success_with(String::from("user-1"));
    assert_eq!(result.output_as::<String>().map(String::as_str), Some("user-1"));
    assert!(result.output_as::<u64>().is_none());
  }
}
