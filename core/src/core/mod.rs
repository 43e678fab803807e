pub mod context;
pub mod result;
pub mod status;
pub mod step;
pub mod value;

// Re-export key types for easier access from other sagaflow modules (and lib.rs)
pub use context::WorkflowContext;
pub use result::StepResult;
pub use status::WorkflowStatus;
pub use step::{CompensableStep, CompensationKind, Guarded, StepDefinition, StepKind, WorkflowStep};
pub use value::Value;
