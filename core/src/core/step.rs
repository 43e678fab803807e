// sagaflow/src/core/step.rs

//! Step and compensation capabilities, their kind identifiers, and the
//! `StepDefinition` pairing used by a `Workflow`.

use super::context::WorkflowContext;
use super::result::StepResult;
use crate::cancellation::CancellationToken;
use async_trait::async_trait;
use std::any::TypeId;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{event, Level};

/// A unit of forward work in a workflow.
///
/// Returning `Ok(StepResult::failure(..))` reports a failure: the executor
/// compensates and returns `Failed`. Returning `Err` is a fault: the executor
/// compensates and then hands the error back to its caller.
#[async_trait]
pub trait WorkflowStep: Send + Sync {
  async fn execute(&self, context: &mut WorkflowContext, cancellation: &CancellationToken)
    -> anyhow::Result<StepResult>;
}

/// The undo action for a step. Invoked only after that step ran and the run failed or was canceled.
#[async_trait]
pub trait CompensableStep: Send + Sync {
  async fn compensate(&self, context: &mut WorkflowContext, cancellation: &CancellationToken)
    -> anyhow::Result<StepResult>;
}

/// Shortens a `std::any::type_name` by dropping module paths from every segment,
/// e.g. `app::steps::Guarded<app::steps::CreateUser>` becomes `Guarded<CreateUser>`.
pub fn short_type_name(full: &str) -> String {
  fn flush(token: &mut String, out: &mut String) {
    if !token.is_empty() {
      out.push_str(token.rsplit("::").next().unwrap_or(token.as_str()));
      token.clear();
    }
  }

  let mut out = String::with_capacity(full.len());
  let mut token = String::new();
  for ch in full.chars() {
    if ch.is_alphanumeric() || ch == '_' || ch == ':' {
      token.push(ch);
    } else {
      flush(&mut token, &mut out);
      out.push(ch);
    }
  }
  flush(&mut token, &mut out);
  out
}

macro_rules! kind_identifier {
  ($(#[$meta:meta])* $name:ident, $capability:ident) => {
    $(#[$meta])*
    #[derive(Clone, Debug)]
    pub struct $name {
      type_id: TypeId,
      name: Arc<str>,
    }

    impl $name {
      pub fn of<T: $capability + 'static>() -> Self {
        Self {
          type_id: TypeId::of::<T>(),
          name: Arc::from(short_type_name(std::any::type_name::<T>())),
        }
      }

      pub fn type_id(&self) -> TypeId {
        self.type_id
      }

      /// Short display name, also used as the step name in execution records.
      pub fn name(&self) -> &str {
        &self.name
      }
    }

    impl PartialEq for $name {
      fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
      }
    }

    impl Eq for $name {}

    impl Hash for $name {
      fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
      }
    }

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
      }
    }
  };
}

kind_identifier!(
  /// Identifies a type implementing `WorkflowStep`.
  StepKind,
  WorkflowStep
);

kind_identifier!(
  /// Identifies a type implementing `CompensableStep`.
  CompensationKind,
  CompensableStep
);

/// A step kind paired with an optional compensation kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepDefinition {
  step: StepKind,
  compensation: Option<CompensationKind>,
}

impl StepDefinition {
  pub fn new(step: StepKind, compensation: Option<CompensationKind>) -> Self {
    Self { step, compensation }
  }

  pub fn step_kind(&self) -> &StepKind {
    &self.step
  }

  pub fn compensation_kind(&self) -> Option<&CompensationKind> {
    self.compensation.as_ref()
  }

  pub fn step_name(&self) -> &str {
    self.step.name()
  }

  pub(crate) fn with_compensation(self, compensation: CompensationKind) -> Self {
    Self {
      step: self.step,
      compensation: Some(compensation),
    }
  }
}

// --- Fault-to-result translation ---

/// Turns a step fault into a reported failure, leaving results untouched.
pub fn guard_result(step_name: &str, result: anyhow::Result<StepResult>) -> StepResult {
  match result {
    Ok(step_result) => step_result,
    Err(e) => {
      event!(Level::WARN, step_name, error = %e, "Step fault translated into a failure result.");
      StepResult::failure(format!("Exception in step {}: {}", step_name, e))
    }
  }
}

/// Wraps a step so that its faults become reported failures.
///
/// A guarded step never propagates a fault to the executor's caller; the run
/// ends `Failed` with compensation instead.
pub struct Guarded<S> {
  inner: S,
  name: String,
}

impl<S: WorkflowStep + 'static> Guarded<S> {
  pub fn new(inner: S) -> Self {
    Self {
      inner,
      name: short_type_name(std::any::type_name::<S>()),
    }
  }
}

#[async_trait]
impl<S: WorkflowStep + 'static> WorkflowStep for Guarded<S> {
  async fn execute(
    &self,
    context: &mut WorkflowContext,
    cancellation: &CancellationToken,
  ) -> anyhow::Result<StepResult> {
    let result = self.inner.execute(context, cancellation).await;
    Ok(guard_result(&self.name, result))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Noop;

  #[async_trait]
  impl WorkflowStep for Noop {
    async fn execute(&self, _context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
      Ok(StepResult::success())
    }
  }

  struct Undo;

  #[async_trait]
  impl CompensableStep for Undo {
    async fn compensate(&self, _context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
      Ok(StepResult::success())
    }
  }

  #[test]
  fn short_type_name_strips_module_paths() {
    assert_eq!(short_type_name("app::steps::CreateUser"), "CreateUser");
    assert_eq!(
      short_type_name("sagaflow::core::step::Guarded<app::steps::CreateUser>"),
      "Guarded<CreateUser>"
    );
    assert_eq!(short_type_name("u32"), "u32");
  }

  #[test]
  fn kinds_compare_by_type() {
    assert_eq!(StepKind::of::<Noop>(), StepKind::of::<Noop>());
    assert_eq!(StepKind::of::<Noop>().name(), "Noop");
    assert_eq!(StepKind::of::<Guarded<Noop>>().name(), "Guarded<Noop>");
    assert_ne!(StepKind::of::<Noop>(), StepKind::of::<Guarded<Noop>>());
  }

  #[test]
  fn definition_attaches_compensation() {
    let def = StepDefinition::new(StepKind::of::<Noop>(), None);
    assert!(def.compensation_kind().is_none());
    let def = def.with_compensation(CompensationKind::of::<Undo>());
    assert_eq!(def.step_name(), "Noop");
    assert_eq!(def.compensation_kind().map(CompensationKind::name), Some("Undo"));
  }

  #[test]
  fn guard_result_translates_faults_only() {
    let ok = guard_result("S", Ok(StepResult::success()));
    assert!(ok.is_success());

    let reported = guard_result("S", Ok(StepResult::failure("nope")));
    assert_eq!(reported.error(), Some("nope"));

    let faulted = guard_result("S", Err(anyhow::anyhow!("disk full")));
    assert_eq!(faulted.error(), Some("Exception in step S: disk full"));
  }
}
