// demos/onboarding/src/errors.rs

use sagaflow::SagaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Saga Workflow Error: {source}")]
  Workflow {
    #[from] // Allows conversion from sagaflow::SagaError
    source: SagaError,
  },

  #[error("Internal Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError::Internal(err.to_string())
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
