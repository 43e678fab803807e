// sagaflow/src/store/mod.rs

//! Persistence contract for `WorkflowExecution` records.

pub mod memory;

use crate::cancellation::CancellationToken;
use crate::error::SagaResult;
use crate::workflow::execution::WorkflowExecution;
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::InMemoryWorkflowStore;

/// Stores execution records keyed by execution id.
///
/// Implementations must be safe for concurrent use by independent executions
/// and must upsert atomically per id. Saves for a single execution are already
/// ordered by the executor.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
  /// Inserts or replaces the record for `execution.id()`.
  async fn save_execution(&self, execution: &WorkflowExecution, cancellation: &CancellationToken) -> SagaResult<()>;

  async fn get_execution(&self, id: Uuid, cancellation: &CancellationToken) -> SagaResult<Option<WorkflowExecution>>;
}
