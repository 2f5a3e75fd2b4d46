use crate::exec::Scope;
use crate::ql::Value;

/// A registered membership behaviour for host value kinds.
pub trait MembershipProtocol: Send + Sync {
	fn applicable(&self, a: &Value, b: &Value) -> bool;
	fn contains(&self, scope: &Scope, a: &Value, b: &Value) -> bool;
}

/// Check whether `a` is a member of `b`.
///
/// With a string on the right this is a substring test; with an array it is
/// an equality test against each element using the scope's equality
/// protocol; anything else dispatches.
pub fn membership(scope: &Scope, a: &Value, b: &Value) -> bool {
	match b {
		Value::Strand(w) => match a {
			Value::Strand(v) => return w.contains(v.as_str()),
			a => return w.contains(a.as_raw_string().as_str()),
		},
		Value::Array(w) => return w.iter().any(|e| super::eq(scope, a, e)),
		_ => (),
	}
	if let Some(imp) =
		super::search(scope, scope.protocols().membership_impls(), |i| i.applicable(a, b))
	{
		return imp.contains(scope, a, b);
	}
	false
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ql::Array;

	#[test]
	fn substring_membership() {
		let scope = Scope::new_bare();
		assert!(membership(&scope, &Value::from("ell"), &Value::from("hello")));
		assert!(!membership(&scope, &Value::from("no"), &Value::from("hello")));
	}

	#[test]
	fn array_membership_uses_equality() {
		let scope = Scope::new_bare();
		let arr = Value::Array(Array::from(vec![1i64, 2, 3]));
		assert!(membership(&scope, &Value::from(2), &arr));
		assert!(membership(&scope, &Value::from(2.0), &arr));
		assert!(!membership(&scope, &Value::from(9), &arr));
	}

	#[test]
	fn unsupported_containers_default_to_false() {
		let scope = Scope::new_bare();
		assert!(!membership(&scope, &Value::from(1), &Value::from(2)));
	}
}
