// sagaflow/src/core/status.rs

//! Lifecycle status of a workflow execution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of one workflow run.
///
/// A run starts `Running` and ends in exactly one of `Succeeded`, `Failed` or
/// `Canceled`. `Pending` and `Compensated` are available to custom executors and
/// stores; the built-in executor leaves rolled-back runs `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowStatus {
  /// Initialized but not started.
  Pending,
  Running,
  /// Every step completed without failure.
  Succeeded,
  /// A step reported failure or faulted.
  Failed,
  /// Rolled back via compensation.
  Compensated,
  /// Cancellation was observed before a step started.
  Canceled,
}

impl WorkflowStatus {
  pub fn is_terminal(self) -> bool {
    !matches!(self, WorkflowStatus::Pending | WorkflowStatus::Running)
  }
}

impl fmt::Display for WorkflowStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      WorkflowStatus::Pending => "Pending",
      WorkflowStatus::Running => "Running",
      WorkflowStatus::Succeeded => "Succeeded",
      WorkflowStatus::Failed => "Failed",
      WorkflowStatus::Compensated => "Compensated",
      WorkflowStatus::Canceled => "Canceled",
    };
    f.write_str(label)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_pending_and_running_are_open() {
    assert!(!WorkflowStatus::Pending.is_terminal());
    assert!(!WorkflowStatus::Running.is_terminal());
    for status in [
      WorkflowStatus::Succeeded,
      WorkflowStatus::Failed,
      WorkflowStatus::Compensated,
      WorkflowStatus::Canceled,
    ] {
      assert!(status.is_terminal(), "{} should be terminal", status);
    }
  }
}
