// sagaflow/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SagaError {
  #[error("Workflow name cannot be empty")]
  EmptyWorkflowName,

  #[error("Workflow '{workflow_name}' must have at least one step")]
  EmptyWorkflow { workflow_name: String },

  #[error("Configuration error: {0}")]
  Configuration(String),

  #[error("No step registered for kind '{kind}'")]
  StepNotRegistered { kind: String },

  #[error("No compensation registered for kind '{kind}'")]
  CompensationNotRegistered { kind: String },

  #[error("No workflow definition registered for '{name}'")]
  DefinitionNotRegistered { name: String },

  #[error("Factory for '{kind}' failed. Source: {source}")]
  Resolution {
    kind: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Service of type {type_name} not found")]
  ServiceNotFound { type_name: String },

  #[error("Value for '{key}' has type {actual}, requested {expected}")]
  TypeMismatch {
    key: String,
    expected: String,
    actual: String,
  },

  #[error("Step '{step}' faulted. Source: {source}")]
  StepFault {
    step: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Execution {id} is already completed")]
  ExecutionCompleted { id: Uuid },

  #[error("Workflow store error. Source: {source}")]
  Store {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal sagaflow error: {0}")]
  Internal(String),
}

impl SagaError {
  /// Name of the faulted step, if this error is a step fault.
  pub fn faulted_step(&self) -> Option<&str> {
    match self {
      SagaError::StepFault { step, .. } => Some(step.as_str()),
      _ => None,
    }
  }
}

pub type SagaResult<T, E = SagaError> = std::result::Result<T, E>;
