use crate::exec::Scope;
use crate::ql::Value;

/// A registered equality behaviour for host value kinds.
pub trait EqProtocol: Send + Sync {
	fn applicable(&self, a: &Value, b: &Value) -> bool;
	fn eq(&self, scope: &Scope, a: &Value, b: &Value) -> bool;
}

/// Check two values for equality.
///
/// Null equals only Null; mixed int/float comparisons promote to float;
/// arrays compare elementwise; objects compare by size and recursive value
/// equality per key.
pub fn eq(scope: &Scope, a: &Value, b: &Value) -> bool {
	// Fast path over the built-in kinds
	match (a, b) {
		(Value::Null, Value::Null) => return true,
		(Value::Null, _) | (_, Value::Null) => return false,
		(Value::Bool(v), Value::Bool(w)) => return v == w,
		(Value::Number(v), Value::Number(w)) => return v == w,
		(Value::Strand(v), Value::Strand(w)) => return v == w,
		(Value::Datetime(v), Value::Datetime(w)) => return v == w,
		(Value::Array(v), Value::Array(w)) => {
			return v.len() == w.len()
				&& v.iter().zip(w.iter()).all(|(x, y)| eq(scope, x, y));
		}
		(Value::Object(v), Value::Object(w)) => {
			return v.len() == w.len()
				&& v.iter().all(|(k, x)| match w.get(k) {
					Some(y) => eq(scope, x, y),
					None => false,
				});
		}
		_ => (),
	}
	// Search the registered implementations
	if let Some(imp) =
		super::search(scope, scope.protocols().eq_impls(), |i| i.applicable(a, b))
	{
		return imp.eq(scope, a, b);
	}
	false
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ql::Array;

	#[test]
	fn numeric_promotion() {
		let scope = Scope::new_bare();
		assert!(eq(&scope, &Value::from(1), &Value::from(1.0)));
		assert!(!eq(&scope, &Value::from(1), &Value::from(1.5)));
	}

	#[test]
	fn arrays_compare_elementwise() {
		let scope = Scope::new_bare();
		let a = Value::Array(Array::from(vec![1i64, 2, 3]));
		let b = Value::Array(Array::from(vec![1i64, 2, 3]));
		let c = Value::Array(Array::from(vec![1i64, 2]));
		assert!(eq(&scope, &a, &b));
		assert!(!eq(&scope, &a, &c));
	}

	#[test]
	fn objects_compare_recursively_regardless_of_order() {
		let scope = Scope::new_bare();
		let a = Value::Object(obj! { "x" => 1, "y" => 2 });
		let b = Value::Object(obj! { "y" => 2, "x" => 1 });
		let c = Value::Object(obj! { "x" => 1, "y" => 3 });
		assert!(eq(&scope, &a, &b));
		assert!(!eq(&scope, &a, &c));
	}

	#[test]
	fn null_only_equals_null() {
		let scope = Scope::new_bare();
		assert!(eq(&scope, &Value::Null, &Value::Null));
		assert!(!eq(&scope, &Value::Null, &Value::from(0)));
		assert!(!eq(&scope, &Value::from(false), &Value::Null));
	}

	#[test]
	fn mismatched_kinds_fall_back_to_false() {
		let scope = Scope::new_bare();
		assert!(!eq(&scope, &Value::from("1"), &Value::from(1)));
	}
}
