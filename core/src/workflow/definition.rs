// sagaflow/src/workflow/definition.rs

//! Contains the immutable `Workflow` and the `WorkflowDefinition` trait that
//! describes how to assemble one.

use crate::core::step::{short_type_name, StepDefinition};
use crate::error::{SagaError, SagaResult};
use crate::workflow::builder::WorkflowBuilder;

/// An ordered, non-empty sequence of step definitions plus a name.
///
/// Step order is execution order. A `Workflow` cannot be modified once built;
/// the executor only reads it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workflow {
  name: String,
  steps: Vec<StepDefinition>,
}

impl Workflow {
  pub fn new(name: impl Into<String>, steps: Vec<StepDefinition>) -> SagaResult<Self> {
    let name = name.into();
    if name.trim().is_empty() {
      return Err(SagaError::EmptyWorkflowName);
    }
    if steps.is_empty() {
      return Err(SagaError::EmptyWorkflow { workflow_name: name });
    }
    Ok(Self { name, steps })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn steps(&self) -> &[StepDefinition] {
    &self.steps
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  /// Always false; kept alongside `len` for API symmetry.
  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }
}

/// Declarative description of a workflow, resolved from the registry by
/// `WorkflowExecutor::execute_definition`.
pub trait WorkflowDefinition: Send + Sync {
  /// Adds this workflow's steps to `builder` and builds it.
  fn build(&self, builder: WorkflowBuilder) -> SagaResult<Workflow>;
}

/// The workflow name used for a definition type: its short type name.
pub fn workflow_name_of<D: WorkflowDefinition + 'static>() -> String {
  short_type_name(std::any::type_name::<D>())
}
