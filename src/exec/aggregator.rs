use crate::ql::Value;
use indexmap::IndexMap;
use std::sync::{Arc, Mutex};

/// Per-group aggregate state, keyed by stable call-site identifier.
///
/// All rows landing in the same `GROUP BY` bin share one context; distinct
/// bins get independent contexts, so aggregate state never leaks between
/// groups. Mutation goes through [`AggregatorCtx::modify`], which makes the
/// read-modify-write atomic even when inner queries evaluate concurrently.
#[derive(Clone, Debug, Default)]
pub struct AggregatorCtx {
	slots: Arc<Mutex<IndexMap<String, Value>>>,
}

impl AggregatorCtx {
	pub fn new() -> Self {
		Self::default()
	}

	/// Read the current state for a call site
	pub fn get(&self, name: &str) -> Option<Value> {
		self.slots.lock().ok().and_then(|s| s.get(name).cloned())
	}

	/// Atomically replace the state for a call site, returning the new value
	pub fn modify<F>(&self, name: &str, f: F) -> Value
	where
		F: FnOnce(Option<Value>) -> Value,
	{
		match self.slots.lock() {
			Ok(mut slots) => {
				let old = slots.get(name).cloned();
				let new = f(old);
				slots.insert(name.to_string(), new.clone());
				new
			}
			Err(_) => Value::Null,
		}
	}

	/// Check whether two contexts share the same state
	pub fn same(&self, other: &AggregatorCtx) -> bool {
		Arc::ptr_eq(&self.slots, &other.slots)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn modify_is_read_modify_write() {
		let ctx = AggregatorCtx::new();
		for expect in 1..=3i64 {
			let v = ctx.modify("site", |old| match old {
				Some(Value::Number(n)) => Value::from(n.as_int() + 1),
				_ => Value::from(1),
			});
			assert_eq!(v, Value::from(expect));
		}
	}

	#[test]
	fn contexts_are_independent() {
		let a = AggregatorCtx::new();
		let b = AggregatorCtx::new();
		a.modify("site", |_| Value::from(10));
		assert_eq!(b.get("site"), None);
		assert!(!a.same(&b));
	}
}
