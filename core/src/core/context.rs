// sagaflow/src/core/context.rs

//! Defines `WorkflowContext`, the per-execution state shared by all steps and
//! compensations of one run.
//!
//! Steps run strictly one after another and receive the context by `&mut`, so
//! no locking is involved. A context is created for a single execution and is
//! never reused.

use super::value::Value;
use crate::error::SagaResult;
use crate::services::ServiceScope;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct WorkflowContext {
  execution_id: Uuid,
  scope: Arc<ServiceScope>,
  typed_values: HashMap<TypeId, Value>,
  named_outputs: HashMap<String, Option<Value>>,
}

impl WorkflowContext {
  /// Creates a context bound to the given resolution scope.
  pub fn new(scope: Arc<ServiceScope>) -> Self {
    Self {
      execution_id: Uuid::new_v4(),
      scope,
      typed_values: HashMap::new(),
      named_outputs: HashMap::new(),
    }
  }

  /// A context with no resolvable services.
  pub fn detached() -> Self {
    Self::new(Arc::new(ServiceScope::empty()))
  }

  pub fn execution_id(&self) -> Uuid {
    self.execution_id
  }

  pub(crate) fn scope(&self) -> &Arc<ServiceScope> {
    &self.scope
  }

  // --- Typed single-value slots ---

  /// Stores `value` in the slot for `T`, overwriting any previous value of that type.
  pub fn set<T: Any + Send + Sync>(&mut self, value: T) {
    self.typed_values.insert(TypeId::of::<T>(), Value::new(value));
  }

  pub fn get<T: Any>(&self) -> Option<&T> {
    self.typed_values.get(&TypeId::of::<T>()).and_then(Value::downcast_ref::<T>)
  }

  pub fn contains<T: Any>(&self) -> bool {
    self.typed_values.contains_key(&TypeId::of::<T>())
  }

  // --- Named outputs ---

  pub fn set_output<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
    self.named_outputs.insert(key.into(), Some(Value::new(value)));
  }

  /// Records `key` with no value. Reads of it behave like reads of a missing key.
  pub fn set_output_none(&mut self, key: impl Into<String>) {
    self.named_outputs.insert(key.into(), None);
  }

  /// Reads a named output as `T`.
  ///
  /// Returns `Ok(None)` when the key is missing or holds no value, and
  /// `SagaError::TypeMismatch` when the stored value is not a `T`.
  pub fn get_output<T: Any>(&self, key: &str) -> SagaResult<Option<&T>> {
    match self.named_outputs.get(key) {
      Some(Some(value)) => value.cast::<T>(key).map(Some),
      Some(None) | None => Ok(None),
    }
  }

  pub fn has_output(&self, key: &str) -> bool {
    self.named_outputs.contains_key(key)
  }

  pub fn output_keys(&self) -> impl Iterator<Item = &str> {
    self.named_outputs.keys().map(String::as_str)
  }

  // --- Services ---

  /// Resolves a collaborator from this execution's resolution scope.
  pub fn get_service<T: Send + Sync + 'static>(&self) -> SagaResult<Arc<T>> {
    self.scope.get::<T>()
  }
}

impl std::fmt::Debug for WorkflowContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WorkflowContext")
      .field("execution_id", &self.execution_id)
      .field("typed_values", &self.typed_values.len())
      .field("named_outputs", &self.named_outputs.keys().collect::<Vec<_>>())
      .finish()
  }
}
