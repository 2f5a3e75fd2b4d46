use crate::exec::Scope;
use crate::ql::Value;
use std::cmp::Ordering;

/// A registered less-than behaviour for host value kinds.
pub trait LtProtocol: Send + Sync {
	fn applicable(&self, a: &Value, b: &Value) -> bool;
	fn lt(&self, scope: &Scope, a: &Value, b: &Value) -> bool;
}

/// A registered greater-than behaviour for host value kinds.
pub trait GtProtocol: Send + Sync {
	fn applicable(&self, a: &Value, b: &Value) -> bool;
	fn gt(&self, scope: &Scope, a: &Value, b: &Value) -> bool;
}

// Coerce a time-adjacent operand pair for comparison. A number compared
// against a datetime is treated as epoch seconds; datetime against string
// is left to the protocol search, as hosts may register parsers.
fn time_pair(a: &Value, b: &Value) -> Option<(f64, f64)> {
	match (a, b) {
		(Value::Datetime(v), Value::Datetime(w)) => Some((v.to_epoch(), w.to_epoch())),
		(Value::Datetime(v), Value::Number(w)) => Some((v.to_epoch(), w.as_float())),
		(Value::Number(v), Value::Datetime(w)) => Some((v.as_float(), w.to_epoch())),
		_ => None,
	}
}

/// Check whether `a` is less than `b`.
///
/// Comparisons with Null are false; incomparable kinds are neither less
/// than nor greater than each other.
pub fn lt(scope: &Scope, a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Null, _) | (_, Value::Null) => return false,
		(Value::Number(v), Value::Number(w)) => return v < w,
		(Value::Strand(v), Value::Strand(w)) => return v < w,
		(Value::Bool(v), Value::Bool(w)) => return v < w,
		_ => (),
	}
	if let Some((v, w)) = time_pair(a, b) {
		return v < w;
	}
	if let Some(imp) =
		super::search(scope, scope.protocols().lt_impls(), |i| i.applicable(a, b))
	{
		return imp.lt(scope, a, b);
	}
	false
}

/// Check whether `a` is greater than `b`.
///
/// This is not `!lt(a, b)`: both directions are computed directly so that
/// incomparable kinds are false for both.
pub fn gt(scope: &Scope, a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Null, _) | (_, Value::Null) => return false,
		(Value::Number(v), Value::Number(w)) => return v > w,
		(Value::Strand(v), Value::Strand(w)) => return v > w,
		(Value::Bool(v), Value::Bool(w)) => return v > w,
		_ => (),
	}
	if let Some((v, w)) = time_pair(a, b) {
		return v > w;
	}
	if let Some(imp) =
		super::search(scope, scope.protocols().gt_impls(), |i| i.applicable(a, b))
	{
		return imp.gt(scope, a, b);
	}
	false
}

/// A total ordering over values used by the sorter.
///
/// Null sorts as the empty string for stability; otherwise the less-than
/// protocol decides, with equal-or-incomparable pairs treated as equal.
pub fn order(scope: &Scope, a: &Value, b: &Value) -> Ordering {
	let empty = Value::from("");
	let a = if a.is_null() {
		&empty
	} else {
		a
	};
	let b = if b.is_null() {
		&empty
	} else {
		b
	};
	if lt(scope, a, b) {
		Ordering::Less
	} else if gt(scope, a, b) {
		Ordering::Greater
	} else {
		Ordering::Equal
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ql::Datetime;
	use chrono::{TimeZone, Utc};

	#[test]
	fn strings_compare_lexicographically() {
		let scope = Scope::new_bare();
		assert!(lt(&scope, &Value::from("abc"), &Value::from("abd")));
		assert!(gt(&scope, &Value::from("b"), &Value::from("a")));
	}

	#[test]
	fn mixed_numeric_promotes() {
		let scope = Scope::new_bare();
		assert!(lt(&scope, &Value::from(1), &Value::from(1.5)));
		assert!(gt(&scope, &Value::from(2.5), &Value::from(2)));
	}

	#[test]
	fn time_against_number_uses_epoch_seconds() {
		let scope = Scope::new_bare();
		let dt = Value::Datetime(Datetime::from(Utc.timestamp_opt(100, 0).unwrap()));
		assert!(lt(&scope, &dt, &Value::from(200)));
		assert!(gt(&scope, &dt, &Value::from(50)));
	}

	#[test]
	fn incomparable_kinds_are_neither() {
		let scope = Scope::new_bare();
		let a = Value::from("text");
		let b = Value::from(1);
		assert!(!lt(&scope, &a, &b));
		assert!(!gt(&scope, &a, &b));
	}

	#[test]
	fn null_comparisons_are_false() {
		let scope = Scope::new_bare();
		assert!(!lt(&scope, &Value::Null, &Value::from(1)));
		assert!(!gt(&scope, &Value::from(1), &Value::Null));
	}
}
