use crate::exec::Scope;
use crate::ql::Value;

/// A registered truthiness behaviour for host value kinds.
pub trait BoolProtocol: Send + Sync {
	fn applicable(&self, a: &Value) -> bool;
	fn truthy(&self, scope: &Scope, a: &Value) -> bool;
}

/// Evaluate the truthiness of a value.
pub fn truthy(scope: &Scope, a: &Value) -> bool {
	// Fast path over the built-in kinds
	match a {
		Value::Null => return false,
		Value::Bool(v) => return *v,
		Value::Number(v) => return v.is_truthy(),
		Value::Strand(v) => return !v.is_empty(),
		Value::Datetime(v) => return v.timestamp() > 0,
		Value::Array(v) => return !v.is_empty(),
		Value::Object(v) => return !v.is_empty(),
		_ => (),
	}
	// Search the registered implementations
	if let Some(imp) = super::search(scope, scope.protocols().truthy_impls(), |i| i.applicable(a)) {
		return imp.truthy(scope, a);
	}
	false
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ql::{Array, Object};

	#[test]
	fn builtin_truthiness() {
		let scope = Scope::new_bare();
		assert!(!truthy(&scope, &Value::Null));
		assert!(!truthy(&scope, &Value::Bool(false)));
		assert!(truthy(&scope, &Value::Bool(true)));
		assert!(!truthy(&scope, &Value::from(0)));
		assert!(truthy(&scope, &Value::from(-1)));
		assert!(truthy(&scope, &Value::from(0.5)));
		assert!(!truthy(&scope, &Value::from("")));
		assert!(truthy(&scope, &Value::from("x")));
		assert!(!truthy(&scope, &Value::Array(Array::new())));
		assert!(!truthy(&scope, &Value::Object(Object::new())));
	}

	#[test]
	fn unknown_kinds_default_to_false_and_count_a_search() {
		let scope = Scope::new_bare();
		let opaque = Value::Opaque(crate::ql::Opaque::new("widget", 7u8));
		assert!(!truthy(&scope, &opaque));
		assert_eq!(scope.stats().protocols_searched(), 1);
	}

	struct WidgetsAreTruthy;

	impl BoolProtocol for WidgetsAreTruthy {
		fn applicable(&self, a: &Value) -> bool {
			matches!(a, Value::Opaque(op) if op.type_name() == "widget")
		}
		fn truthy(&self, _scope: &Scope, _a: &Value) -> bool {
			true
		}
	}

	#[test]
	fn registered_implementations_are_consulted_for_future_dispatches() {
		let scope = Scope::new_bare();
		let widget = Value::Opaque(crate::ql::Opaque::new("widget", 7u8));
		let other = Value::Opaque(crate::ql::Opaque::new("gadget", 7u8));
		assert!(!truthy(&scope, &widget));
		scope.add_protocol_impl(crate::protocol::ProtocolImpl::Truthy(std::sync::Arc::new(
			WidgetsAreTruthy,
		)));
		// The new implementation handles widgets without affecting others
		assert!(truthy(&scope, &widget));
		assert!(!truthy(&scope, &other));
	}
}
