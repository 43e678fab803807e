// sagaflow/src/workflow/executor.rs

//! Contains `WorkflowExecutor`, which drives a workflow's steps through a shared
//! context, records progress, and unwinds via compensation on failure or
//! cancellation.

use crate::cancellation::CancellationToken;
use crate::compensation::{CompensationStrategy, DefaultCompensationStrategy};
use crate::core::context::WorkflowContext;
use crate::core::result::StepResult;
use crate::core::status::WorkflowStatus;
use crate::core::step::StepDefinition;
use crate::error::{SagaError, SagaResult};
use crate::registry::{ScopedResolver, StepRegistry, StepResolver};
use crate::services::Services;
use crate::store::{InMemoryWorkflowStore, WorkflowStore};
use crate::workflow::builder::WorkflowBuilder;
use crate::workflow::definition::{workflow_name_of, Workflow, WorkflowDefinition};
use crate::workflow::execution::WorkflowExecution;
use std::sync::Arc;
use tracing::{event, instrument, span, Instrument, Level};
use uuid::Uuid;

/// Final status of a run together with the id of its persisted execution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOutcome {
  pub execution_id: Uuid,
  pub status: WorkflowStatus,
}

/// Runs workflows. One executor is meant to be shared (e.g. behind an `Arc`)
/// by any number of concurrent executions; each execution owns its own
/// context, execution record and resolution scope.
pub struct WorkflowExecutor {
  registry: Arc<StepRegistry>,
  services: Arc<Services>,
  store: Arc<dyn WorkflowStore>,
  compensation: Arc<dyn CompensationStrategy>,
}

/// Configures the collaborators of a `WorkflowExecutor`.
pub struct ExecutorBuilder {
  registry: Arc<StepRegistry>,
  services: Arc<Services>,
  store: Option<Arc<dyn WorkflowStore>>,
  compensation: Option<Arc<dyn CompensationStrategy>>,
}

impl ExecutorBuilder {
  /// Replaces the default `InMemoryWorkflowStore`.
  pub fn use_workflow_store(mut self, store: Arc<dyn WorkflowStore>) -> Self {
    self.store = Some(store);
    self
  }

  /// Replaces the default `DefaultCompensationStrategy`.
  pub fn use_compensation_strategy(mut self, strategy: Arc<dyn CompensationStrategy>) -> Self {
    self.compensation = Some(strategy);
    self
  }

  pub fn build(self) -> WorkflowExecutor {
    WorkflowExecutor {
      registry: self.registry,
      services: self.services,
      store: self.store.unwrap_or_else(|| Arc::new(InMemoryWorkflowStore::new())),
      compensation: self
        .compensation
        .unwrap_or_else(|| Arc::new(DefaultCompensationStrategy)),
    }
  }
}

impl WorkflowExecutor {
  /// An executor with the in-memory store and the default compensation strategy.
  pub fn new(registry: Arc<StepRegistry>, services: Arc<Services>) -> Self {
    Self::builder(registry, services).build()
  }

  pub fn builder(registry: Arc<StepRegistry>, services: Arc<Services>) -> ExecutorBuilder {
    ExecutorBuilder {
      registry,
      services,
      store: None,
      compensation: None,
    }
  }

  pub fn store(&self) -> &Arc<dyn WorkflowStore> {
    &self.store
  }

  /// A fresh context bound to a fresh resolution scope of this executor's services.
  pub fn new_context(&self) -> WorkflowContext {
    WorkflowContext::new(Arc::new(self.services.create_scope()))
  }

  /// Executes `workflow` against `context`.
  ///
  /// Returns `Succeeded`, `Failed` (a step reported failure) or `Canceled`.
  /// A step fault, including an unresolvable step kind, is returned as
  /// `Err(SagaError::StepFault)` after compensation has run. The execution
  /// record is persisted under `context.execution_id()`.
  #[instrument(
    name = "WorkflowExecutor::execute",
    skip_all,
    fields(
      workflow = %workflow.name(),
      execution_id = %context.execution_id(),
      num_steps = workflow.len(),
    ),
    err(Display)
  )]
  pub async fn execute(
    &self,
    workflow: &Workflow,
    context: &mut WorkflowContext,
    cancellation: &CancellationToken,
  ) -> SagaResult<ExecutionOutcome> {
    event!(Level::DEBUG, "Workflow execution starting.");

    let mut execution = WorkflowExecution::start(context.execution_id(), workflow.name());
    self.store.save_execution(&execution, cancellation).await?;

    let resolver = self.registry.scoped(Arc::clone(context.scope()));
    // Definitions of invoked steps, in invocation order. Unlike the record's
    // name list this keeps repeats, so a step kind used twice is undone twice.
    let mut executed: Vec<StepDefinition> = Vec::with_capacity(workflow.len());

    for (step_idx, step_def) in workflow.steps().iter().enumerate() {
      let step_name = step_def.step_name();

      if cancellation.is_cancelled() {
        event!(
          Level::INFO,
          step_name,
          reason = ?cancellation.reason(),
          "Cancellation requested; step not started."
        );
        execution.cancel()?;
        self
          .roll_back(workflow, &executed, context, &resolver, &execution)
          .await?;
        return Ok(outcome(&execution));
      }

      let step_span = span!(
        Level::INFO,
        "workflow_step_execution",
        step_name,
        step_index = step_idx,
        compensated = step_def.compensation_kind().is_some()
      );

      let invocation: SagaResult<StepResult> = match resolver.resolve_step(step_def.step_kind()) {
        Ok(step) => {
          let result = step.execute(context, cancellation).instrument(step_span.clone()).await;
          // Recorded before the result is inspected: a step that ran is always compensated.
          executed.push(step_def.clone());
          execution.mark_step_executed(step_name)?;
          result.map_err(|source| SagaError::StepFault {
            step: step_name.to_string(),
            source,
          })
        }
        Err(resolution_error) => Err(SagaError::StepFault {
          step: step_name.to_string(),
          source: resolution_error.into(),
        }),
      };

      match invocation {
        Ok(result) if result.is_success() => {
          step_span.in_scope(|| event!(Level::DEBUG, "Step completed."));
        }
        Ok(result) => {
          step_span.in_scope(|| {
            event!(Level::WARN, error = result.error().unwrap_or_default(), "Step reported failure.")
          });
          execution.fail()?;
          self
            .roll_back(workflow, &executed, context, &resolver, &execution)
            .await?;
          return Ok(outcome(&execution));
        }
        Err(fault) => {
          step_span.in_scope(|| event!(Level::ERROR, error = %fault, "Step faulted."));
          execution.fail()?;
          if let Err(store_error) = self
            .roll_back(workflow, &executed, context, &resolver, &execution)
            .await
          {
            // The fault is what the caller must see.
            event!(Level::ERROR, error = %store_error, "Persisting failed execution also failed.");
          }
          return Err(fault);
        }
      }
    }

    execution.succeed()?;
    // Every step finished, so a cancellation that arrived during the last one
    // must not leave the record unsaved.
    self.store.save_execution(&execution, &CancellationToken::new()).await?;
    event!(Level::DEBUG, "Workflow execution completed successfully.");
    Ok(outcome(&execution))
  }

  /// Resolves definition `D`, builds it under its type name, and executes it in a
  /// fresh context with its own resolution scope.
  #[instrument(
    name = "WorkflowExecutor::execute_definition",
    skip_all,
    fields(definition = %workflow_name_of::<D>()),
    err(Display)
  )]
  pub async fn execute_definition<D>(&self, cancellation: &CancellationToken) -> SagaResult<ExecutionOutcome>
  where
    D: WorkflowDefinition + 'static,
  {
    let scope = Arc::new(self.services.create_scope());
    let workflow = {
      let definition = self.registry.resolve_definition::<D>(&scope)?;
      definition.build(WorkflowBuilder::for_definition::<D>())?
    };
    let mut context = WorkflowContext::new(scope);
    self.execute(&workflow, &mut context, cancellation).await
  }

  /// Persists a terminal (failed or canceled) record, then compensates what ran.
  ///
  /// Both happen under a fresh token so the cancellation that ended the run
  /// cannot abort its own rollback. Compensation runs even if the save fails;
  /// the save error is returned afterwards.
  async fn roll_back(
    &self,
    workflow: &Workflow,
    executed: &[StepDefinition],
    context: &mut WorkflowContext,
    resolver: &ScopedResolver,
    execution: &WorkflowExecution,
  ) -> SagaResult<()> {
    let rollback_token = CancellationToken::new();
    let saved = self.store.save_execution(execution, &rollback_token).await;

    let report = self
      .compensation
      .compensate(workflow, executed, context, resolver as &dyn StepResolver, &rollback_token)
      .await;

    if report.is_clean() {
      event!(
        Level::INFO,
        status = %execution.status(),
        compensated = report.attempted.len(),
        "Rollback completed."
      );
    } else {
      event!(
        Level::ERROR,
        status = %execution.status(),
        attempted = report.attempted.len(),
        succeeded = report.succeeded(),
        failed = report.failures.len(),
        "Rollback completed with compensation failures."
      );
    }
    saved
  }
}

fn outcome(execution: &WorkflowExecution) -> ExecutionOutcome {
  ExecutionOutcome {
    execution_id: execution.id(),
    status: execution.status(),
  }
}
