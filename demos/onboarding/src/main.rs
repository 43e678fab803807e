// demos/onboarding/src/main.rs

mod config;
mod errors;
mod services;
mod workflows;

use crate::config::AppConfig;
use crate::errors::Result as AppResult;
use crate::services::UserDirectory;
use crate::workflows::onboarding::OnboardingWorkflow;
use sagaflow::{CancellationToken, Services, StepRegistry, WorkflowExecutor, WorkflowStatus, WorkflowStore};
use std::sync::Arc;
use tracing::Level;

#[tokio::main]
async fn main() -> AppResult<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .init();

  tracing::info!("Starting onboarding demo...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(e);
    }
  };

  let directory = Arc::new(UserDirectory::default());
  let services = Arc::new(Services::new());
  services
    .add_singleton(directory.clone())
    .add_singleton(app_config.clone());

  let registry = Arc::new(StepRegistry::new());
  workflows::register_all(&registry);

  let executor = WorkflowExecutor::new(registry, services);
  let token = CancellationToken::new();
  let outcome = executor.execute_definition::<OnboardingWorkflow>(&token).await?;

  match outcome.status {
    WorkflowStatus::Succeeded => tracing::info!(execution_id = %outcome.execution_id, "Onboarding succeeded."),
    WorkflowStatus::Canceled => {
      tracing::warn!(execution_id = %outcome.execution_id, reason = ?token.reason(), "Onboarding canceled.")
    }
    status => tracing::warn!(execution_id = %outcome.execution_id, %status, "Onboarding did not succeed."),
  }

  if let Some(record) = executor
    .store()
    .get_execution(outcome.execution_id, &CancellationToken::new())
    .await?
  {
    tracing::info!(
      workflow = record.workflow_name(),
      status = %record.status(),
      steps = ?record.executed_steps(),
      started_at = %record.started_at(),
      completed_at = ?record.completed_at(),
      "Persisted execution record."
    );
  }
  tracing::info!(users = directory.len(), "Users remaining in directory.");
  for user in directory.snapshot() {
    tracing::info!(user_id = %user.id, name = %user.name, groups = ?user.groups, "Directory entry.");
  }
  Ok(())
}
