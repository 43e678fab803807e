// sagaflow/src/core/value.rs

//! Type-erased values stored in a `WorkflowContext` or carried by a `StepResult`.

use crate::error::{SagaError, SagaResult};
use std::any::Any;
use std::sync::Arc;

/// A shareable, type-erased value that remembers the name of its concrete type.
#[derive(Clone)]
pub struct Value {
  inner: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Value {
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self {
      inner: Arc::new(value),
      type_name: std::any::type_name::<T>(),
    }
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub fn is<T: Any>(&self) -> bool {
    self.inner.is::<T>()
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.inner.downcast_ref::<T>()
  }

  /// Like `downcast_ref`, but reports a mismatch as `SagaError::TypeMismatch` for `key`.
  pub(crate) fn cast<T: Any>(&self, key: &str) -> SagaResult<&T> {
    self.downcast_ref::<T>().ok_or_else(|| SagaError::TypeMismatch {
      key: key.to_string(),
      expected: std::any::type_name::<T>().to_string(),
      actual: self.type_name.to_string(),
    })
  }
}

impl std::fmt::Debug for Value {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Value").field("type_name", &self.type_name).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn downcast_matches_stored_type_only() {
    let value = Value::new(42_u32);
    assert!(value.is::<u32>());
    assert_eq!(value.downcast_ref::<u32>(), Some(&42));
    assert!(value.downcast_ref::<i64>().is_none());
    assert_eq!(value.type_name(), "u32");
  }

  #[test]
  fn cast_reports_both_type_names() {
    let value = Value::new(String::from("abc"));
    match value.cast::<u8>("Key") {
      Err(SagaError::TypeMismatch { key, expected, actual }) => {
        assert_eq!(key, "Key");
        assert_eq!(expected, "u8");
        assert!(actual.contains("String"));
      }
      other => panic!("Expected TypeMismatch, got {:?}", other),
    }
  }
}
