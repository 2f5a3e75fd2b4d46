use crate::ql::value::Value;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// A zero-argument callable wrapped as a value.
///
/// Thunks are produced by hosts that want to defer a computation until a
/// query actually touches the value. Reduction unwraps them under the same
/// depth guard as lazy expressions.
#[derive(Clone)]
pub struct Thunk(Arc<dyn Fn() -> Value + Send + Sync>);

impl Thunk {
	/// Wrap a callable
	pub fn new<F: Fn() -> Value + Send + Sync + 'static>(f: F) -> Self {
		Self(Arc::new(f))
	}

	/// Invoke the callable
	pub fn call(&self) -> Value {
		(self.0)()
	}

	/// Check whether two thunks wrap the same allocation
	pub fn same(&self, other: &Thunk) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Debug for Thunk {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str("Thunk")
	}
}

impl Display for Thunk {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str("<thunk>")
	}
}
