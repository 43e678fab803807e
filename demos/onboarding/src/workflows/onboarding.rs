// demos/onboarding/src/workflows/onboarding.rs

//! New-user onboarding: create the account, then put it in its groups.
//! A failed or canceled run deletes the account again.

use crate::config::AppConfig;
use crate::services::UserDirectory;
use async_trait::async_trait;
use sagaflow::{
  CancellationToken, CompensableStep, SagaResult, StepResult, Workflow, WorkflowBuilder, WorkflowContext,
  WorkflowDefinition, WorkflowStep,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const USER_ID: &str = "UserId";
pub const GROUPS: &str = "Groups";

const DEFAULT_GROUPS: [&str; 2] = ["everyone", "staff"];

async fn simulate_latency(config: &AppConfig) {
  if config.step_delay_ms > 0 {
    tokio::time::sleep(Duration::from_millis(config.step_delay_ms)).await;
  }
}

pub struct CreateUserStep {
  pub directory: Arc<UserDirectory>,
  pub config: Arc<AppConfig>,
}

#[async_trait]
impl WorkflowStep for CreateUserStep {
  async fn execute(&self, context: &mut WorkflowContext, cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    simulate_latency(&self.config).await;
    let user_id = self.directory.create(&self.config.user_name);
    context.set_output(USER_ID, user_id);

    if self.config.cancel_before_groups {
      cancellation.cancel("ONBOARDING_CANCEL_BEFORE_GROUPS is set");
    }
    Ok(StepResult::success_with(user_id))
  }
}

pub struct AddUserToGroupsStep {
  pub directory: Arc<UserDirectory>,
  pub config: Arc<AppConfig>,
}

#[async_trait]
impl WorkflowStep for AddUserToGroupsStep {
  async fn execute(&self, context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    simulate_latency(&self.config).await;
    let Some(user_id) = context.get_output::<Uuid>(USER_ID)?.copied() else {
      return Ok(StepResult::failure("No user was created"));
    };
    if self.config.fail_groups {
      return Ok(StepResult::failure(format!("Group service refused user {}", user_id)));
    }
    self.directory.add_to_groups(user_id, &DEFAULT_GROUPS)?;
    context.set_output(GROUPS, DEFAULT_GROUPS.map(String::from).to_vec());
    Ok(StepResult::success())
  }
}

pub struct DeleteUserStep {
  pub directory: Arc<UserDirectory>,
}

#[async_trait]
impl CompensableStep for DeleteUserStep {
  async fn compensate(&self, context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    match context.get_output::<Uuid>(USER_ID)? {
      Some(user_id) if self.directory.delete(*user_id) => Ok(StepResult::success()),
      Some(user_id) => Ok(StepResult::failure(format!("User {} was already gone", user_id))),
      None => Ok(StepResult::failure("No user id to delete")),
    }
  }
}

#[derive(Debug, Default)]
pub struct OnboardingWorkflow;

impl WorkflowDefinition for OnboardingWorkflow {
  fn build(&self, builder: WorkflowBuilder) -> SagaResult<Workflow> {
    builder
      .add_step_with_compensation::<CreateUserStep, DeleteUserStep>()
      .add_step::<AddUserToGroupsStep>()
      .build()
  }
}
