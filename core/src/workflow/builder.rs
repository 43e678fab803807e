// sagaflow/src/workflow/builder.rs

//! Fluent assembly of a `Workflow`.
//!
//! Misuse (a compensation with no preceding step, zero steps, an empty name)
//! is recorded as it happens and returned by `build()`, so a bad definition
//! fails before anything executes.

use crate::core::step::{CompensableStep, CompensationKind, StepDefinition, StepKind, WorkflowStep};
use crate::error::{SagaError, SagaResult};
use crate::workflow::definition::{workflow_name_of, Workflow, WorkflowDefinition};
use tracing::{event, Level};

#[derive(Debug)]
pub struct WorkflowBuilder {
  name: String,
  steps: Vec<StepDefinition>,
  error: Option<SagaError>,
}

impl WorkflowBuilder {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      steps: Vec::new(),
      error: None,
    }
  }

  /// A builder named after the definition type `D`.
  pub fn for_definition<D: WorkflowDefinition + 'static>() -> Self {
    Self::new(workflow_name_of::<D>())
  }

  pub fn add_step<S: WorkflowStep + 'static>(self) -> Self {
    self.add_step_kind(StepKind::of::<S>())
  }

  pub fn add_step_kind(mut self, kind: StepKind) -> Self {
    self.steps.push(StepDefinition::new(kind, None));
    self
  }

  /// Appends several steps, in iteration order, none of them compensated.
  pub fn add_steps(self, kinds: impl IntoIterator<Item = StepKind>) -> Self {
    kinds.into_iter().fold(self, WorkflowBuilder::add_step_kind)
  }

  /// Attaches `C` as the compensation of the most recently added step.
  pub fn with_compensation<C: CompensableStep + 'static>(self) -> Self {
    self.with_compensation_kind(CompensationKind::of::<C>())
  }

  pub fn with_compensation_kind(mut self, kind: CompensationKind) -> Self {
    match self.steps.pop() {
      Some(last) => self.steps.push(last.with_compensation(kind)),
      None => {
        event!(Level::ERROR, workflow = %self.name, compensation = %kind, "Compensation added before any step.");
        self.record_error(SagaError::Configuration(format!(
          "No step to attach compensation '{}' to in workflow '{}'",
          kind, self.name
        )));
      }
    }
    self
  }

  pub fn add_step_with_compensation<S, C>(self) -> Self
  where
    S: WorkflowStep + 'static,
    C: CompensableStep + 'static,
  {
    self.add_step::<S>().with_compensation::<C>()
  }

  pub fn step_count(&self) -> usize {
    self.steps.len()
  }

  /// Finalizes the workflow, returning the first recorded misuse if any.
  pub fn build(self) -> SagaResult<Workflow> {
    if let Some(error) = self.error {
      return Err(error);
    }
    Workflow::new(self.name, self.steps)
  }

  fn record_error(&mut self, error: SagaError) {
    if self.error.is_none() {
      self.error = Some(error);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cancellation::CancellationToken;
  use crate::core::{StepResult, WorkflowContext};
  use async_trait::async_trait;

  struct Reserve;
  struct Charge;
  struct Release;

  #[async_trait]
  impl WorkflowStep for Reserve {
    async fn execute(&self, _context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
      Ok(StepResult::success())
    }
  }

  #[async_trait]
  impl WorkflowStep for Charge {
    async fn execute(&self, _context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
      Ok(StepResult::success())
    }
  }

  #[async_trait]
  impl CompensableStep for Release {
    async fn compensate(&self, _context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
      Ok(StepResult::success())
    }
  }

  struct Checkout;

  impl WorkflowDefinition for Checkout {
    fn build(&self, builder: WorkflowBuilder) -> SagaResult<Workflow> {
      builder.add_step_with_compensation::<Reserve, Release>().add_step::<Charge>().build()
    }
  }

  #[test]
  fn compensation_attaches_to_last_step() {
    let workflow = WorkflowBuilder::new("checkout")
      .add_step::<Reserve>()
      .add_step::<Charge>()
      .with_compensation::<Release>()
      .build()
      .unwrap();

    assert_eq!(workflow.name(), "checkout");
    assert_eq!(workflow.len(), 2);
    assert!(workflow.steps()[0].compensation_kind().is_none());
    assert_eq!(workflow.steps()[1].step_name(), "Charge");
    assert_eq!(workflow.steps()[1].compensation_kind(), Some(&CompensationKind::of::<Release>()));
  }

  #[test]
  fn compensation_before_any_step_fails_at_build() {
    let result = WorkflowBuilder::new("broken")
      .with_compensation::<Release>()
      .add_step::<Reserve>()
      .build();
    match result {
      Err(SagaError::Configuration(message)) => assert!(message.contains("Release")),
      other => panic!("Expected Configuration error, got {:?}", other),
    }
  }

  #[test]
  fn zero_steps_fails_at_build() {
    assert!(matches!(
      WorkflowBuilder::new("empty").build(),
      Err(SagaError::EmptyWorkflow { .. })
    ));
  }

  #[test]
  fn blank_name_is_rejected() {
    assert!(matches!(
      WorkflowBuilder::new("  ").add_step::<Reserve>().build(),
      Err(SagaError::EmptyWorkflowName)
    ));
  }

  #[test]
  fn add_steps_keeps_order() {
    let builder = WorkflowBuilder::new("batch").add_steps([StepKind::of::<Charge>(), StepKind::of::<Reserve>()]);
    assert_eq!(builder.step_count(), 2);
    // Attaching a compensation does not add a step.
    let builder = builder.with_compensation::<Release>();
    assert_eq!(builder.step_count(), 2);

    let workflow = builder.build().unwrap();
    let names: Vec<&str> = workflow.steps().iter().map(StepDefinition::step_name).collect();
    assert_eq!(names, vec!["Charge", "Reserve"]);
  }

  #[test]
  fn definition_builds_under_its_type_name() {
    let workflow = Checkout.build(WorkflowBuilder::for_definition::<Checkout>()).unwrap();
    assert_eq!(workflow.name(), "Checkout");
    assert_eq!(workflow.steps()[0].compensation_kind().map(CompensationKind::name), Some("Release"));
  }
}
