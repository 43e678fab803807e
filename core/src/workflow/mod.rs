// sagaflow/src/workflow/mod.rs

//! Workflow assembly, the per-run execution record, and the executor.

pub mod builder;
pub mod definition;
pub mod execution;
pub mod executor;

pub use builder::WorkflowBuilder;
pub use definition::{workflow_name_of, Workflow, WorkflowDefinition};
pub use execution::WorkflowExecution;
pub use executor::{ExecutionOutcome, ExecutorBuilder, WorkflowExecutor};
