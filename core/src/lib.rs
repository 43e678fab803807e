// src/lib.rs

//! Sagaflow: an ASYNC saga-style workflow engine for Rust.
//!
//! Sagaflow runs an ordered list of steps over a shared, per-execution context
//! and undoes completed work when a run goes wrong:
//!  - Steps and compensations are plain types implementing `WorkflowStep` / `CompensableStep`.
//!  - A fluent `WorkflowBuilder` pairs each step with an optional compensation.
//!  - On a reported failure, a fault, or cancellation, executed steps are
//!    compensated in reverse order.
//!  - Every run leaves a `WorkflowExecution` record in a pluggable `WorkflowStore`.
//!  - Steps and compensations are built per execution from a type-keyed
//!    `StepRegistry`, against a per-execution `ServiceScope`.

pub mod cancellation;
pub mod compensation;
pub mod core;
pub mod error;
pub mod registry;
pub mod services;
pub mod store;
pub mod workflow;

// --- Re-exports for the Public API ---

pub use crate::cancellation::CancellationToken;
pub use crate::compensation::{
  CompensationFailure, CompensationReport, CompensationStrategy, DefaultCompensationStrategy,
};
pub use crate::core::step::{guard_result, short_type_name};
pub use crate::core::{
  CompensableStep, CompensationKind, Guarded, StepDefinition, StepKind, StepResult, Value, WorkflowContext,
  WorkflowStatus, WorkflowStep,
};
pub use crate::error::{SagaError, SagaResult};
pub use crate::registry::{ScopedResolver, StepRegistry, StepResolver};
pub use crate::services::{ServiceScope, Services};
pub use crate::store::{InMemoryWorkflowStore, WorkflowStore};
pub use crate::workflow::{
  workflow_name_of, ExecutionOutcome, ExecutorBuilder, Workflow, WorkflowBuilder, WorkflowDefinition,
  WorkflowExecution, WorkflowExecutor,
};

/*
    Core Workflow:
    1. Implement `WorkflowStep` for each forward action and `CompensableStep` for each undo.
    2. Register their factories on a `StepRegistry`, and collaborators on `Services`.
    3. Describe the workflow with `WorkflowBuilder` (or a `WorkflowDefinition`):
       `.add_step::<CreateUser>().with_compensation::<DeleteUser>()`.
    4. Build a `WorkflowExecutor` from the registry and services, optionally
       swapping the store or compensation strategy.
    5. Call `executor.execute(&workflow, &mut executor.new_context(), &token).await`
       and inspect the returned status, or look up the record in the store.
*/
