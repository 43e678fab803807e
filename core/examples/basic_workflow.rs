// sagaflow_core/examples/basic_workflow.rs

use async_trait::async_trait;
use sagaflow::{
  CancellationToken, SagaError, Services, StepRegistry, StepResult, WorkflowBuilder, WorkflowContext,
  WorkflowExecutor, WorkflowStep, WorkflowStore,
};
use std::sync::Arc;
use tracing::info;

// 1. Define steps. Each one reads and writes the shared context.
#[derive(Default)]
struct ReserveStock;

#[async_trait]
impl WorkflowStep for ReserveStock {
  async fn execute(&self, context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    context.set_output("ReservationId", 4711_u64);
    info!("Stock reserved.");
    Ok(StepResult::success())
  }
}

#[derive(Default)]
struct ShipOrder;

#[async_trait]
impl WorkflowStep for ShipOrder {
  async fn execute(&self, context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    let reservation = context.get_output::<u64>("ReservationId")?.copied().unwrap_or_default();
    info!(reservation, "Order shipped.");
    Ok(StepResult::success_with(format!("parcel-{}", reservation)))
  }
}

#[tokio::main]
async fn main() -> Result<(), SagaError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Workflow Example ---");

  // 2. Register step factories.
  let registry = Arc::new(StepRegistry::new());
  registry
    .register_step_default::<ReserveStock>()
    .register_step_default::<ShipOrder>();

  // 3. Build the executor with the default in-memory store.
  let executor = WorkflowExecutor::new(registry, Arc::new(Services::new()));

  // 4. Describe the workflow.
  let workflow = WorkflowBuilder::new("fulfil_order")
    .add_step::<ReserveStock>()
    .add_step::<ShipOrder>()
    .build()?;

  // 5. Run it.
  let mut context = executor.new_context();
  let outcome = executor.execute(&workflow, &mut context, &CancellationToken::new()).await?;
  info!(status = %outcome.status, "Workflow finished.");

  if let Some(record) = executor.store().get_execution(outcome.execution_id, &CancellationToken::new()).await? {
    info!(steps = ?record.executed_steps(), "Execution record.");
  }
  Ok(())
}
