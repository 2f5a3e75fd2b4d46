use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A handle for cancelling a context and all of its children.
#[derive(Clone, Debug, Default)]
pub struct Canceller {
	/// A reference to the shared cancellation flag
	cancelled: Arc<AtomicBool>,
}

impl Canceller {
	/// Create a new canceller over the given flag
	pub(crate) fn new(cancelled: Arc<AtomicBool>) -> Canceller {
		Canceller {
			cancelled,
		}
	}
	/// Cancel the context this canceller was created from
	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::Relaxed);
	}
}
