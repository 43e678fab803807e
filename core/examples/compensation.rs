// sagaflow_core/examples/compensation.rs

use async_trait::async_trait;
use parking_lot::Mutex;
use sagaflow::{
  CancellationToken, CompensableStep, SagaError, Services, StepRegistry, StepResult, WorkflowBuilder,
  WorkflowContext, WorkflowExecutor, WorkflowStep,
};
use std::sync::Arc;
use tracing::{info, warn};

/// A pretend bank shared by every execution.
#[derive(Default)]
struct Bank {
  balance: Mutex<i64>,
}

struct Debit {
  bank: Arc<Bank>,
}

#[async_trait]
impl WorkflowStep for Debit {
  async fn execute(&self, _context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    *self.bank.balance.lock() -= 100;
    info!("Debited 100.");
    Ok(StepResult::success())
  }
}

struct Refund {
  bank: Arc<Bank>,
}

#[async_trait]
impl CompensableStep for Refund {
  async fn compensate(&self, _context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    *self.bank.balance.lock() += 100;
    info!("Refunded 100.");
    Ok(StepResult::success())
  }
}

#[derive(Default)]
struct BookFlight;

#[async_trait]
impl WorkflowStep for BookFlight {
  async fn execute(&self, _context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    warn!("No seats left.");
    Ok(StepResult::failure("Flight is fully booked"))
  }
}

#[tokio::main]
async fn main() -> Result<(), SagaError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Compensation Example ---");

  let services = Arc::new(Services::new());
  services.add_singleton(Arc::new(Bank::default()));

  let registry = Arc::new(StepRegistry::new());
  registry
    .register_step(|scope| Ok(Debit { bank: scope.get::<Bank>()? }))
    .register_compensation(|scope| Ok(Refund { bank: scope.get::<Bank>()? }))
    .register_step_default::<BookFlight>();

  let executor = WorkflowExecutor::new(registry, services.clone());
  let workflow = WorkflowBuilder::new("book_trip")
    .add_step_with_compensation::<Debit, Refund>()
    .add_step::<BookFlight>()
    .build()?;

  let outcome = executor
    .execute(&workflow, &mut executor.new_context(), &CancellationToken::new())
    .await?;

  let balance = *services.create_scope().get::<Bank>()?.balance.lock();
  info!(status = %outcome.status, balance, "Trip booking finished; the debit was refunded.");
  Ok(())
}
