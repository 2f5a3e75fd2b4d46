use crate::ql::Object;
use crate::ql::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters describing the work performed by an evaluation tree.
///
/// A single `Stats` instance is shared by a root scope and all of its
/// children. Tests and diagnostics read a point-in-time snapshot.
#[derive(Debug, Default)]
pub struct Stats {
	rows_scanned: AtomicU64,
	plugins_called: AtomicU64,
	functions_called: AtomicU64,
	protocols_searched: AtomicU64,
	scopes_copied: AtomicU64,
}

impl Stats {
	pub fn incr_rows_scanned(&self) {
		self.rows_scanned.fetch_add(1, Ordering::Relaxed);
	}

	pub fn incr_plugins_called(&self) {
		self.plugins_called.fetch_add(1, Ordering::Relaxed);
	}

	pub fn incr_functions_called(&self) {
		self.functions_called.fetch_add(1, Ordering::Relaxed);
	}

	pub fn incr_protocols_searched(&self) {
		self.protocols_searched.fetch_add(1, Ordering::Relaxed);
	}

	pub fn incr_scopes_copied(&self) {
		self.scopes_copied.fetch_add(1, Ordering::Relaxed);
	}

	pub fn rows_scanned(&self) -> u64 {
		self.rows_scanned.load(Ordering::Relaxed)
	}

	pub fn plugins_called(&self) -> u64 {
		self.plugins_called.load(Ordering::Relaxed)
	}

	pub fn functions_called(&self) -> u64 {
		self.functions_called.load(Ordering::Relaxed)
	}

	pub fn protocols_searched(&self) -> u64 {
		self.protocols_searched.load(Ordering::Relaxed)
	}

	pub fn scopes_copied(&self) -> u64 {
		self.scopes_copied.load(Ordering::Relaxed)
	}

	/// A point-in-time snapshot of all counters
	pub fn snapshot(&self) -> Object {
		let mut obj = Object::new();
		obj.insert("rows_scanned".to_string(), Value::from(self.rows_scanned() as i64));
		obj.insert("plugins_called".to_string(), Value::from(self.plugins_called() as i64));
		obj.insert("functions_called".to_string(), Value::from(self.functions_called() as i64));
		obj.insert("protocols_searched".to_string(), Value::from(self.protocols_searched() as i64));
		obj.insert("scopes_copied".to_string(), Value::from(self.scopes_copied() as i64));
		obj
	}
}
