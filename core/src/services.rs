// sagaflow/src/services.rs

//! Explicit service container and per-execution resolution scopes.
//!
//! `Services` is populated at start-up with singletons and scoped factories.
//! Every execution gets its own `ServiceScope`; scoped instances are created
//! lazily inside that scope and never shared with another execution.

use crate::error::{SagaError, SagaResult};
use parking_lot::{Mutex, RwLock};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

type AnyService = Arc<dyn Any + Send + Sync>;
type ScopedFactory = Arc<dyn Fn(&ServiceScope) -> anyhow::Result<AnyService> + Send + Sync>;

/// Process-wide service registrations.
#[derive(Default)]
pub struct Services {
  singletons: RwLock<HashMap<TypeId, AnyService>>,
  scoped: RwLock<HashMap<TypeId, ScopedFactory>>,
}

impl Services {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a value shared by every scope. Replaces an earlier registration of `T`.
  pub fn add_singleton<T>(&self, service: Arc<T>) -> &Self
  where
    T: Send + Sync + 'static,
  {
    event!(Level::DEBUG, service_type = %std::any::type_name::<T>(), "Registering singleton service.");
    self.singletons.write().insert(TypeId::of::<T>(), service);
    self
  }

  /// Registers a factory invoked at most once per scope.
  pub fn add_scoped<T, F>(&self, factory: F) -> &Self
  where
    T: Send + Sync + 'static,
    F: Fn(&ServiceScope) -> anyhow::Result<T> + Send + Sync + 'static,
  {
    event!(Level::DEBUG, service_type = %std::any::type_name::<T>(), "Registering scoped service.");
    let erased: ScopedFactory = Arc::new(move |scope: &ServiceScope| {
      let service: AnyService = Arc::new(factory(scope)?);
      Ok(service)
    });
    self.scoped.write().insert(TypeId::of::<T>(), erased);
    self
  }

  pub fn contains<T: 'static>(&self) -> bool {
    let type_id = TypeId::of::<T>();
    self.singletons.read().contains_key(&type_id) || self.scoped.read().contains_key(&type_id)
  }

  /// Opens a fresh resolution scope for one execution.
  pub fn create_scope(self: &Arc<Self>) -> ServiceScope {
    ServiceScope {
      services: Arc::clone(self),
      instances: Mutex::new(HashMap::new()),
    }
  }
}

/// Resolution scope bound to a single workflow execution.
pub struct ServiceScope {
  services: Arc<Services>,
  instances: Mutex<HashMap<TypeId, AnyService>>,
}

impl ServiceScope {
  /// A scope over an empty container, for contexts that need no services.
  pub fn empty() -> Self {
    Arc::new(Services::new()).create_scope()
  }

  /// Resolves `T` as a singleton, or as this scope's instance of a scoped service.
  pub fn get<T>(&self) -> SagaResult<Arc<T>>
  where
    T: Send + Sync + 'static,
  {
    let type_id = TypeId::of::<T>();

    let singleton = self.services.singletons.read().get(&type_id).cloned();
    if let Some(service) = singleton {
      return downcast_service::<T>(service);
    }

    let cached = self.instances.lock().get(&type_id).cloned();
    if let Some(service) = cached {
      return downcast_service::<T>(service);
    }

    let factory = self.services.scoped.read().get(&type_id).cloned();
    let Some(factory) = factory else {
      return Err(SagaError::ServiceNotFound {
        type_name: std::any::type_name::<T>().to_string(),
      });
    };

    // No lock is held here: factories may resolve their own dependencies from this scope.
    let created = factory(self).map_err(|source| SagaError::Resolution {
      kind: std::any::type_name::<T>().to_string(),
      source,
    })?;
    let service = self.instances.lock().entry(type_id).or_insert(created).clone();
    downcast_service::<T>(service)
  }
}

impl std::fmt::Debug for ServiceScope {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ServiceScope")
      .field("instances", &self.instances.lock().len())
      .finish()
  }
}

fn downcast_service<T: Send + Sync + 'static>(service: AnyService) -> SagaResult<Arc<T>> {
  service.downcast::<T>().map_err(|_| {
    SagaError::Internal(format!(
      "Service registered under {} holds a different type",
      std::any::type_name::<T>()
    ))
  })
}
