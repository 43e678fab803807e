// sagaflow_core/examples/cancellation.rs

use async_trait::async_trait;
use sagaflow::{
  CancellationToken, CompensableStep, SagaError, Services, StepRegistry, StepResult, WorkflowBuilder,
  WorkflowContext, WorkflowExecutor, WorkflowStatus, WorkflowStep,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Default)]
struct SlowStep;

#[async_trait]
impl WorkflowStep for SlowStep {
  async fn execute(&self, _context: &mut WorkflowContext, cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    for _ in 0..5 {
      if cancellation.is_cancelled() {
        // Stop early; the executor notices before the next step.
        break;
      }
      tokio::time::sleep(Duration::from_millis(20)).await;
    }
    info!("Slow step done.");
    Ok(StepResult::success())
  }
}

#[derive(Default)]
struct UndoSlowStep;

#[async_trait]
impl CompensableStep for UndoSlowStep {
  async fn compensate(&self, _context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    info!("Slow step undone.");
    Ok(StepResult::success())
  }
}

#[tokio::main]
async fn main() -> Result<(), SagaError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Cancellation Example ---");

  let registry = Arc::new(StepRegistry::new());
  registry
    .register_step_default::<SlowStep>()
    .register_compensation_default::<UndoSlowStep>();
  let executor = WorkflowExecutor::new(registry, Arc::new(Services::new()));

  let workflow = WorkflowBuilder::new("slow")
    .add_step_with_compensation::<SlowStep, UndoSlowStep>()
    .add_step_with_compensation::<SlowStep, UndoSlowStep>()
    .add_step_with_compensation::<SlowStep, UndoSlowStep>()
    .build()?;

  let token = CancellationToken::new();
  let canceller = token.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(150)).await;
    canceller.cancel("user pressed stop");
  });

  let outcome = executor.execute(&workflow, &mut executor.new_context(), &token).await?;
  if outcome.status == WorkflowStatus::Canceled {
    info!(reason = ?token.reason(), "Workflow was canceled and rolled back.");
  } else {
    info!(status = %outcome.status, "Workflow finished before the cancellation landed.");
  }
  Ok(())
}
