// sagaflow/src/store/memory.rs

//! In-memory `WorkflowStore` for development and testing.

use super::WorkflowStore;
use crate::cancellation::CancellationToken;
use crate::error::SagaResult;
use crate::workflow::execution::WorkflowExecution;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{event, Level};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryWorkflowStore {
  executions: RwLock<HashMap<Uuid, WorkflowExecution>>,
}

impl InMemoryWorkflowStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.executions.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.executions.read().is_empty()
  }

  /// All records for `workflow_name`, oldest first.
  pub fn executions_for(&self, workflow_name: &str) -> Vec<WorkflowExecution> {
    let mut found: Vec<WorkflowExecution> = self
      .executions
      .read()
      .values()
      .filter(|e| e.workflow_name() == workflow_name)
      .cloned()
      .collect();
    found.sort_by_key(WorkflowExecution::started_at);
    found
  }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
  async fn save_execution(&self, execution: &WorkflowExecution, _cancellation: &CancellationToken) -> SagaResult<()> {
    event!(
      Level::TRACE,
      execution_id = %execution.id(),
      status = %execution.status(),
      "Saving execution."
    );
    self.executions.write().insert(execution.id(), execution.clone());
    Ok(())
  }

  async fn get_execution(&self, id: Uuid, _cancellation: &CancellationToken) -> SagaResult<Option<WorkflowExecution>> {
    Ok(self.executions.read().get(&id).cloned())
  }
}
