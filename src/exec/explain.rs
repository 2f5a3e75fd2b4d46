use crate::ql::Value;
use std::fmt;
use std::fmt::Write;
use std::sync::Mutex;

/// Captures a structured trace of a statement's evaluation.
///
/// An explainer is installed on the child scope of an `EXPLAIN` statement
/// (or by the host, on any scope) and receives the query start, the parsed
/// arguments, every row produced by every plugin, every row rejected by the
/// `WHERE` clause together with its reduced condition, and every emitted
/// row.
#[derive(Debug, Default)]
pub struct Explainer {
	lines: Mutex<Vec<String>>,
}

impl Explainer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record a single diagnostic line
	pub fn record(&self, args: fmt::Arguments) {
		let line = args.to_string();
		debug!("{line}");
		if let Ok(mut lines) = self.lines.lock() {
			lines.push(line);
		}
	}

	/// The lines recorded so far
	pub fn lines(&self) -> Vec<String> {
		self.lines.lock().map(|l| l.clone()).unwrap_or_default()
	}

	/// Check whether any recorded line contains the given needle
	pub fn contains(&self, needle: &str) -> bool {
		self.lines().iter().any(|l| l.contains(needle))
	}
}

/// Render a row with the kind of every column, for explainer output.
pub(crate) fn typed_dump(row: &Value) -> String {
	match row {
		Value::Object(obj) => {
			let mut out = String::from("{");
			for (i, (k, v)) in obj.iter().enumerate() {
				if i > 0 {
					out.push_str(", ");
				}
				let _ = write!(out, "{k}: {v} ({})", v.kind());
			}
			out.push('}');
			out
		}
		Value::Row(row) => format!("{row}"),
		v => format!("{v} ({})", v.kind()),
	}
}
