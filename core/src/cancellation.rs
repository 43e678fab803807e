// sagaflow/src/cancellation.rs

//! Cooperative cancellation for workflow executions.
//!
//! The executor only looks at the token between steps. A step that is already
//! running is never interrupted; long-running steps may poll the token
//! themselves.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{event, Level};

#[derive(Default)]
struct TokenState {
  cancelled: AtomicBool,
  // First reason wins.
  reason: RwLock<Option<String>>,
}

/// A cloneable handle to a shared cancellation flag.
///
/// All clones observe the same state, so a caller can keep one clone and hand
/// another to `WorkflowExecutor::execute`.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<TokenState>);

impl CancellationToken {
  pub fn new() -> Self {
    Self::default()
  }

  /// Requests cancellation. Idempotent; only the first reason is kept.
  pub fn cancel(&self, reason: impl Into<String>) {
    if self
      .0
      .cancelled
      .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
      .is_ok()
    {
      let reason = reason.into();
      event!(Level::DEBUG, reason = %reason, "Cancellation requested.");
      *self.0.reason.write() = Some(reason);
    }
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.cancelled.load(Ordering::SeqCst)
  }

  pub fn reason(&self) -> Option<String> {
    self.0.reason.read().clone()
  }
}

impl std::fmt::Debug for CancellationToken {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CancellationToken")
      .field("cancelled", &self.is_cancelled())
      .field("reason", &self.reason())
      .finish()
  }
}
