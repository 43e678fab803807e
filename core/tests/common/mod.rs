// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use parking_lot::Mutex;
use sagaflow::{
  CancellationToken, CompensableStep, InMemoryWorkflowStore, Services, StepRegistry, StepResult,
  WorkflowContext, WorkflowExecutor, WorkflowStep,
};
use std::sync::Arc;
use tracing::Level;

// --- Per-execution call log ---

/// Scoped service: every execution sees its own log.
#[derive(Debug, Default)]
pub struct CallLog {
  entries: Mutex<Vec<String>>,
}

impl CallLog {
  pub fn record(&self, entry: impl Into<String>) {
    self.entries.lock().push(entry.into());
  }

  pub fn entries(&self) -> Vec<String> {
    self.entries.lock().clone()
  }
}

fn record(context: &WorkflowContext, entry: &str) -> anyhow::Result<()> {
  context.get_service::<CallLog>()?.record(entry);
  tracing::debug!(target: "test_steps", entry, "recorded");
  Ok(())
}

pub fn entries_of(context: &WorkflowContext) -> Vec<String> {
  context.get_service::<CallLog>().map(|log| log.entries()).unwrap_or_default()
}

/// Context slot read by the recording steps: once the call log holds this many
/// entries, the step that wrote the last one requests cancellation.
#[derive(Debug, Clone, Copy)]
pub struct CancelAfterSteps(pub usize);

// --- Steps ---

macro_rules! recording_step {
  ($name:ident) => {
    #[derive(Debug, Default)]
    pub struct $name;

    #[async_trait]
    impl WorkflowStep for $name {
      async fn execute(&self, context: &mut WorkflowContext, cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
        record(context, stringify!($name))?;
        if let Some(CancelAfterSteps(limit)) = context.get::<CancelAfterSteps>().copied() {
          if entries_of(context).len() == limit {
            cancellation.cancel(format!("cancel after {} steps", limit));
          }
        }
        Ok(StepResult::success())
      }
    }
  };
}

recording_step!(StepA);
recording_step!(StepB);
recording_step!(StepC);
recording_step!(StepD);

/// Reports a failure without faulting.
#[derive(Debug, Default)]
pub struct ReportingFailure;

#[async_trait]
impl WorkflowStep for ReportingFailure {
  async fn execute(&self, context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    record(context, "ReportingFailure")?;
    Ok(StepResult::failure("quota exceeded"))
  }
}

#[derive(Debug, Default)]
pub struct Faulting;

#[async_trait]
impl WorkflowStep for Faulting {
  async fn execute(&self, context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    record(context, "Faulting")?;
    Err(anyhow::anyhow!("connection reset"))
  }
}

/// Requests cancellation of its own run, then succeeds.
#[derive(Debug, Default)]
pub struct RequestCancel;

#[async_trait]
impl WorkflowStep for RequestCancel {
  async fn execute(&self, context: &mut WorkflowContext, cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    record(context, "RequestCancel")?;
    cancellation.cancel("operator abort");
    Ok(StepResult::success())
  }
}

/// Never registered with the harness registry.
#[derive(Debug, Default)]
pub struct Unregistered;

#[async_trait]
impl WorkflowStep for Unregistered {
  async fn execute(&self, _context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    Ok(StepResult::success())
  }
}

// --- Compensations ---

macro_rules! recording_compensation {
  ($name:ident, $entry:literal) => {
    #[derive(Debug, Default)]
    pub struct $name;

    #[async_trait]
    impl CompensableStep for $name {
      async fn compensate(&self, context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
        record(context, $entry)?;
        Ok(StepResult::success())
      }
    }
  };
}

recording_compensation!(UndoA, "undo:A");
recording_compensation!(UndoB, "undo:B");
recording_compensation!(UndoC, "undo:C");
recording_compensation!(UndoD, "undo:D");
recording_compensation!(UndoFaulting, "undo:Faulting");

#[derive(Debug, Default)]
pub struct FaultingUndo;

#[async_trait]
impl CompensableStep for FaultingUndo {
  async fn compensate(&self, context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    record(context, "undo:faulting")?;
    Err(anyhow::anyhow!("undo endpoint unavailable"))
  }
}

#[derive(Debug, Default)]
pub struct FailingUndo;

#[async_trait]
impl CompensableStep for FailingUndo {
  async fn compensate(&self, context: &mut WorkflowContext, _cancellation: &CancellationToken) -> anyhow::Result<StepResult> {
    record(context, "undo:failing")?;
    Ok(StepResult::failure("already gone"))
  }
}

// --- Harness ---

pub struct Harness {
  pub registry: Arc<StepRegistry>,
  pub services: Arc<Services>,
  pub store: Arc<InMemoryWorkflowStore>,
  pub executor: WorkflowExecutor,
}

/// Registry with every common step and compensation, a scoped `CallLog`, and an inspectable store.
pub fn harness() -> Harness {
  let registry = Arc::new(StepRegistry::new());
  registry
    .register_step_default::<StepA>()
    .register_step_default::<StepB>()
    .register_step_default::<StepC>()
    .register_step_default::<StepD>()
    .register_step_default::<ReportingFailure>()
    .register_step_default::<Faulting>()
    .register_step_default::<RequestCancel>()
    .register_compensation_default::<UndoA>()
    .register_compensation_default::<UndoB>()
    .register_compensation_default::<UndoC>()
    .register_compensation_default::<UndoD>()
    .register_compensation_default::<UndoFaulting>()
    .register_compensation_default::<FaultingUndo>()
    .register_compensation_default::<FailingUndo>();

  let services = Arc::new(Services::new());
  services.add_scoped(|_scope| Ok(CallLog::default()));

  let store = Arc::new(InMemoryWorkflowStore::new());
  let executor = WorkflowExecutor::builder(registry.clone(), services.clone())
    .use_workflow_store(store.clone())
    .build();

  Harness {
    registry,
    services,
    store,
    executor,
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
