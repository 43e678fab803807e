// sagaflow/src/registry.rs

//! Defines `StepRegistry`, a type-keyed registry of factories for steps,
//! compensations and workflow definitions, and the `StepResolver` seam the
//! executor and compensation strategy resolve through.
//!
//! Registration is explicit: nothing is discovered at runtime. Every
//! resolution produces a fresh instance built against the caller's
//! `ServiceScope`.

use crate::core::step::{CompensableStep, CompensationKind, StepKind, WorkflowStep};
use crate::error::{SagaError, SagaResult};
use crate::services::ServiceScope;
use crate::workflow::definition::{workflow_name_of, WorkflowDefinition};
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, instrument, Level};

type Factory<T> = Arc<dyn Fn(&ServiceScope) -> anyhow::Result<Box<T>> + Send + Sync>;

/// Produces step and compensation instances for one execution.
pub trait StepResolver: Send + Sync {
  fn resolve_step(&self, kind: &StepKind) -> SagaResult<Box<dyn WorkflowStep>>;

  fn resolve_compensation(&self, kind: &CompensationKind) -> SagaResult<Box<dyn CompensableStep>>;
}

#[derive(Default)]
pub struct StepRegistry {
  steps: RwLock<HashMap<TypeId, Factory<dyn WorkflowStep>>>,
  compensations: RwLock<HashMap<TypeId, Factory<dyn CompensableStep>>>,
  definitions: RwLock<HashMap<TypeId, Factory<dyn WorkflowDefinition>>>,
}

impl StepRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers the factory for step `S`, replacing any earlier one.
  pub fn register_step<S, F>(&self, factory: F) -> &Self
  where
    S: WorkflowStep + 'static,
    F: Fn(&ServiceScope) -> anyhow::Result<S> + Send + Sync + 'static,
  {
    event!(Level::DEBUG, step = %StepKind::of::<S>(), "Registering step.");
    let erased: Factory<dyn WorkflowStep> = Arc::new(move |scope: &ServiceScope| {
      let step: Box<dyn WorkflowStep> = Box::new(factory(scope)?);
      Ok(step)
    });
    self.steps.write().insert(TypeId::of::<S>(), erased);
    self
  }

  pub fn register_step_default<S>(&self) -> &Self
  where
    S: WorkflowStep + Default + 'static,
  {
    self.register_step(|_scope| Ok(S::default()))
  }

  pub fn register_compensation<C, F>(&self, factory: F) -> &Self
  where
    C: CompensableStep + 'static,
    F: Fn(&ServiceScope) -> anyhow::Result<C> + Send + Sync + 'static,
  {
    event!(Level::DEBUG, compensation = %CompensationKind::of::<C>(), "Registering compensation.");
    let erased: Factory<dyn CompensableStep> = Arc::new(move |scope: &ServiceScope| {
      let compensation: Box<dyn CompensableStep> = Box::new(factory(scope)?);
      Ok(compensation)
    });
    self.compensations.write().insert(TypeId::of::<C>(), erased);
    self
  }

  pub fn register_compensation_default<C>(&self) -> &Self
  where
    C: CompensableStep + Default + 'static,
  {
    self.register_compensation(|_scope| Ok(C::default()))
  }

  pub fn register_definition<D, F>(&self, factory: F) -> &Self
  where
    D: WorkflowDefinition + 'static,
    F: Fn(&ServiceScope) -> anyhow::Result<D> + Send + Sync + 'static,
  {
    event!(Level::DEBUG, definition = %workflow_name_of::<D>(), "Registering workflow definition.");
    let erased: Factory<dyn WorkflowDefinition> = Arc::new(move |scope: &ServiceScope| {
      let definition: Box<dyn WorkflowDefinition> = Box::new(factory(scope)?);
      Ok(definition)
    });
    self.definitions.write().insert(TypeId::of::<D>(), erased);
    self
  }

  pub fn register_definition_default<D>(&self) -> &Self
  where
    D: WorkflowDefinition + Default + 'static,
  {
    self.register_definition(|_scope| Ok(D::default()))
  }

  pub fn contains_step(&self, kind: &StepKind) -> bool {
    self.steps.read().contains_key(&kind.type_id())
  }

  pub fn contains_compensation(&self, kind: &CompensationKind) -> bool {
    self.compensations.read().contains_key(&kind.type_id())
  }

  /// Builds a fresh instance of definition `D` within `scope`.
  #[instrument(
    name = "StepRegistry::resolve_definition",
    skip_all,
    fields(definition = %workflow_name_of::<D>()),
    err(Display)
  )]
  pub fn resolve_definition<D>(&self, scope: &ServiceScope) -> SagaResult<Box<dyn WorkflowDefinition>>
  where
    D: WorkflowDefinition + 'static,
  {
    let factory = self.definitions.read().get(&TypeId::of::<D>()).cloned();
    let factory = factory.ok_or_else(|| SagaError::DefinitionNotRegistered {
      name: workflow_name_of::<D>(),
    })?;
    factory(scope).map_err(|source| SagaError::Resolution {
      kind: workflow_name_of::<D>(),
      source,
    })
  }

  /// Binds this registry to one execution's resolution scope.
  pub fn scoped(self: &Arc<Self>, scope: Arc<ServiceScope>) -> ScopedResolver {
    ScopedResolver {
      registry: Arc::clone(self),
      scope,
    }
  }
}

/// A `StepResolver` that builds instances from a registry within a single scope.
pub struct ScopedResolver {
  registry: Arc<StepRegistry>,
  scope: Arc<ServiceScope>,
}

impl StepResolver for ScopedResolver {
  fn resolve_step(&self, kind: &StepKind) -> SagaResult<Box<dyn WorkflowStep>> {
    // Clone the factory out so no lock is held while user code runs.
    let factory = self.registry.steps.read().get(&kind.type_id()).cloned();
    let factory = factory.ok_or_else(|| {
      event!(Level::ERROR, step = %kind, "No step registered for kind.");
      SagaError::StepNotRegistered {
        kind: kind.name().to_string(),
      }
    })?;
    factory(self.scope.as_ref()).map_err(|source| SagaError::Resolution {
      kind: kind.name().to_string(),
      source,
    })
  }

  fn resolve_compensation(&self, kind: &CompensationKind) -> SagaResult<Box<dyn CompensableStep>> {
    let factory = self.registry.compensations.read().get(&kind.type_id()).cloned();
    let factory = factory.ok_or_else(|| {
      event!(Level::ERROR, compensation = %kind, "No compensation registered for kind.");
      SagaError::CompensationNotRegistered {
        kind: kind.name().to_string(),
      }
    })?;
    factory(self.scope.as_ref()).map_err(|source| SagaError::Resolution {
      kind: kind.name().to_string(),
      source,
    })
  }
}
