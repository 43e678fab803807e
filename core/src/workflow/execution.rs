// sagaflow/src/workflow/execution.rs

//! Contains `WorkflowExecution`, the audit record of one workflow run.
//!
//! The record is owned by the executor for the duration of a run. Stores and
//! other collaborators only ever see it through `&WorkflowExecution` or a clone.

use crate::core::status::WorkflowStatus;
use crate::error::{SagaError, SagaResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowExecution {
  id: Uuid,
  workflow_name: String,
  status: WorkflowStatus,
  started_at: DateTime<Utc>,
  completed_at: Option<DateTime<Utc>>,
  executed_steps: Vec<String>,
}

impl WorkflowExecution {
  /// Starts a new record in `Running` state.
  pub fn start(id: Uuid, workflow_name: impl Into<String>) -> Self {
    Self {
      id,
      workflow_name: workflow_name.into(),
      status: WorkflowStatus::Running,
      started_at: Utc::now(),
      completed_at: None,
      executed_steps: Vec::new(),
    }
  }

  pub fn start_new(workflow_name: impl Into<String>) -> Self {
    Self::start(Uuid::new_v4(), workflow_name)
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn workflow_name(&self) -> &str {
    &self.workflow_name
  }

  pub fn status(&self) -> WorkflowStatus {
    self.status
  }

  pub fn started_at(&self) -> DateTime<Utc> {
    self.started_at
  }

  pub fn completed_at(&self) -> Option<DateTime<Utc>> {
    self.completed_at
  }

  pub fn is_completed(&self) -> bool {
    self.completed_at.is_some()
  }

  /// Step names in invocation order, without duplicates.
  pub fn executed_steps(&self) -> &[String] {
    &self.executed_steps
  }

  /// Appends `step_name` unless it is already recorded.
  pub fn mark_step_executed(&mut self, step_name: &str) -> SagaResult<()> {
    self.ensure_open()?;
    if !self.executed_steps.iter().any(|s| s == step_name) {
      self.executed_steps.push(step_name.to_string());
    }
    Ok(())
  }

  pub fn succeed(&mut self) -> SagaResult<()> {
    self.complete(WorkflowStatus::Succeeded)
  }

  pub fn fail(&mut self) -> SagaResult<()> {
    self.complete(WorkflowStatus::Failed)
  }

  pub fn cancel(&mut self) -> SagaResult<()> {
    self.complete(WorkflowStatus::Canceled)
  }

  fn complete(&mut self, status: WorkflowStatus) -> SagaResult<()> {
    self.ensure_open()?;
    self.status = status;
    self.completed_at = Some(Utc::now());
    Ok(())
  }

  fn ensure_open(&self) -> SagaResult<()> {
    if self.is_completed() {
      return Err(SagaError::ExecutionCompleted { id: self.id });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn starts_running_without_completion() {
    let execution = WorkflowExecution::start_new("Onboarding");
    assert_eq!(execution.status(), WorkflowStatus::Running);
    assert_eq!(execution.workflow_name(), "Onboarding");
    assert!(execution.completed_at().is_none());
    assert!(execution.executed_steps().is_empty());
  }

  #[test]
  fn marking_the_same_step_twice_is_a_no_op() {
    let mut execution = WorkflowExecution::start_new("wf");
    execution.mark_step_executed("CreateUser").unwrap();
    execution.mark_step_executed("AddToGroups").unwrap();
    execution.mark_step_executed("CreateUser").unwrap();
    assert_eq!(execution.executed_steps(), ["CreateUser", "AddToGroups"]);
  }

  #[test]
  fn completed_record_rejects_further_mutation() {
    let mut execution = WorkflowExecution::start_new("wf");
    execution.mark_step_executed("A").unwrap();
    execution.succeed().unwrap();

    let completed_at = execution.completed_at();
    assert!(completed_at.is_some());
    assert!(execution.completed_at().unwrap() >= execution.started_at());

    assert!(matches!(execution.fail(), Err(SagaError::ExecutionCompleted { .. })));
    assert!(matches!(execution.mark_step_executed("B"), Err(SagaError::ExecutionCompleted { .. })));
    assert_eq!(execution.status(), WorkflowStatus::Succeeded);
    assert_eq!(execution.completed_at(), completed_at);
    assert_eq!(execution.executed_steps(), ["A"]);
  }

  #[test]
  fn record_serializes_for_external_stores() {
    let mut execution = WorkflowExecution::start_new("Onboarding");
    execution.mark_step_executed("CreateUser").unwrap();
    execution.cancel().unwrap();

    let json = serde_json::to_value(&execution).unwrap();
    assert_eq!(json["status"], "Canceled");
    assert_eq!(json["executed_steps"], serde_json::json!(["CreateUser"]));

    let restored: WorkflowExecution = serde_json::from_value(json).unwrap();
    assert_eq!(restored, execution);
  }
}
