// sagaflow/src/compensation.rs

//! Defines the `CompensationStrategy` seam and the default reverse-order,
//! best-effort strategy.

use crate::cancellation::CancellationToken;
use crate::core::context::WorkflowContext;
use crate::core::step::StepDefinition;
use crate::registry::StepResolver;
use crate::workflow::definition::Workflow;
use async_trait::async_trait;
use tracing::{event, span, Instrument, Level};

/// One compensation that did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationFailure {
  /// Name of the step being undone.
  pub step: String,
  pub compensation: String,
  pub message: String,
  /// `true` for faults (including resolution failures), `false` for reported failures.
  pub faulted: bool,
}

/// What a compensation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompensationReport {
  /// Compensation names in invocation order.
  pub attempted: Vec<String>,
  pub failures: Vec<CompensationFailure>,
}

impl CompensationReport {
  pub fn is_clean(&self) -> bool {
    self.failures.is_empty()
  }

  /// Attempted compensations that did not fail. Saturates for hand-built reports.
  pub fn succeeded(&self) -> usize {
    self.attempted.len().saturating_sub(self.failures.len())
  }
}

/// Unwinds the steps of a failed or canceled run.
///
/// Implementations never change the status of the execution record; the
/// executor owns every status transition.
#[async_trait]
pub trait CompensationStrategy: Send + Sync {
  async fn compensate(
    &self,
    workflow: &Workflow,
    executed_steps: &[StepDefinition],
    context: &mut WorkflowContext,
    resolver: &dyn StepResolver,
    cancellation: &CancellationToken,
  ) -> CompensationReport;
}

/// Invokes each executed step's compensation in reverse execution order.
///
/// Steps without a compensation are skipped. Every invocation is isolated: a
/// fault or reported failure is recorded and the remaining compensations still run.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCompensationStrategy;

#[async_trait]
impl CompensationStrategy for DefaultCompensationStrategy {
  async fn compensate(
    &self,
    workflow: &Workflow,
    executed_steps: &[StepDefinition],
    context: &mut WorkflowContext,
    resolver: &dyn StepResolver,
    cancellation: &CancellationToken,
  ) -> CompensationReport {
    event!(
      Level::DEBUG,
      workflow = workflow.name(),
      executed = executed_steps.len(),
      "Compensation starting."
    );
    let mut report = CompensationReport::default();

    for step_def in executed_steps.iter().rev() {
      let Some(compensation_kind) = step_def.compensation_kind() else {
        event!(Level::TRACE, step = step_def.step_name(), "No compensation declared, skipping.");
        continue;
      };
      let step_name = step_def.step_name().to_string();
      let compensation_name = compensation_kind.name().to_string();
      report.attempted.push(compensation_name.clone());

      let compensation_span = span!(
        Level::INFO,
        "compensation_execution",
        step_name = %step_name,
        compensation = %compensation_name
      );

      let outcome = match resolver.resolve_compensation(compensation_kind) {
        Ok(compensator) => {
          compensator
            .compensate(context, cancellation)
            .instrument(compensation_span.clone())
            .await
        }
        Err(e) => Err(anyhow::Error::new(e)),
      };

      compensation_span.in_scope(|| match outcome {
        Ok(result) if result.is_success() => {
          event!(Level::DEBUG, "Compensation completed.");
        }
        Ok(result) => {
          let message = result.error().unwrap_or_default().to_string();
          event!(Level::WARN, error = %message, "Compensation reported failure.");
          report.failures.push(CompensationFailure {
            step: step_name,
            compensation: compensation_name,
            message,
            faulted: false,
          });
        }
        Err(e) => {
          event!(Level::ERROR, error = %e, "Compensation faulted.");
          report.failures.push(CompensationFailure {
            step: step_name,
            compensation: compensation_name,
            message: e.to_string(),
            faulted: true,
          });
        }
      });
    }

    event!(
      Level::DEBUG,
      attempted = report.attempted.len(),
      failed = report.failures.len(),
      "Compensation finished."
    );
    report
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn failure(step: &str) -> CompensationFailure {
    CompensationFailure {
      step: step.to_string(),
      compensation: format!("Undo{}", step),
      message: "gone".to_string(),
      faulted: false,
    }
  }

  #[test]
  fn report_counts_successes() {
    let report = CompensationReport {
      attempted: vec!["UndoA".to_string(), "UndoB".to_string()],
      failures: vec![failure("B")],
    };
    assert!(!report.is_clean());
    assert_eq!(report.succeeded(), 1);
    assert!(CompensationReport::default().is_clean());
  }

  #[test]
  fn hand_built_report_with_excess_failures_does_not_underflow() {
    let report = CompensationReport {
      attempted: Vec::new(),
      failures: vec![failure("A"), failure("B")],
    };
    assert_eq!(report.succeeded(), 0);
  }
}
