use crate::ctx::Context;
use crate::exec::Scope;
use crate::ql::{Array, Number, Opaque, Value};
use async_recursion::async_recursion;

/// A registered associative-lookup behaviour for host value kinds.
///
/// This is the explicit capability replacing reflective field access: hosts
/// describe how their types resolve members, either with a [`FieldTable`]
/// or with their own implementation.
pub trait AssocProtocol: Send + Sync {
	fn applicable(&self, a: &Value, key: &Value) -> bool;
	fn get(&self, scope: &Scope, a: &Value, key: &Value) -> (Value, bool);
}

/// Look up a member of a value, returning the value and a presence flag.
#[async_recursion]
pub async fn assoc(ctx: &Context, scope: &Scope, a: &Value, key: &Value) -> (Value, bool) {
	match a {
		Value::Null => return (Value::Null, false),
		// A scope value delegates to name resolution
		Value::Opaque(op) => {
			if let Some(inner) = op.downcast_ref::<Scope>() {
				if let Value::Strand(name) = key {
					return inner.resolve(ctx, name.as_str()).await;
				}
			}
		}
		// A lazy row invokes (and memoizes) the column getter
		Value::Row(row) => match key {
			Value::Strand(name) => {
				return match row.get(ctx, name.as_str()).await {
					Some(v) => (v, true),
					None => (Value::Null, false),
				};
			}
			Value::Number(Number::Int(i)) => {
				let columns = row.columns();
				return match columns.get(*i as usize) {
					Some(name) => match row.get(ctx, name).await {
						Some(v) => (v, true),
						None => (Value::Null, false),
					},
					None => (Value::Null, false),
				};
			}
			_ => (),
		},
		// An object honours its default-on-miss behaviour
		Value::Object(obj) => {
			if let Value::Strand(name) = key {
				return obj.resolve(name.as_str());
			}
		}
		// A stored query selects a row by index, or collects a column
		Value::Query(query) => match key {
			Value::Number(Number::Int(i)) => {
				let rows = query.collect(ctx, scope).await;
				return match rows.into_iter().nth(*i as usize) {
					Some(v) => (v, true),
					None => (Value::Null, false),
				};
			}
			Value::Strand(_) => {
				let rows = query.collect(ctx, scope).await;
				let mut out = Array::with_capacity(rows.len());
				for row in &rows {
					// A missing column becomes Null
					out.push(assoc(ctx, scope, row, key).await.0);
				}
				return (Value::Array(out), true);
			}
			_ => (),
		},
		// A sequence distributes the lookup across its elements
		Value::Array(items) => {
			let mut out = Array::with_capacity(items.len());
			let mut any = false;
			for item in items.iter() {
				let (v, present) = assoc(ctx, scope, item, key).await;
				any |= present;
				out.push(v);
			}
			return (Value::Array(out), any);
		}
		_ => (),
	}
	// Search the registered implementations
	if let Some(imp) =
		super::search(scope, scope.protocols().assoc_impls(), |i| i.applicable(a, key))
	{
		return imp.get(scope, a, key);
	}
	(Value::Null, false)
}

type FieldGetter = Box<dyn Fn(&Opaque) -> Option<Value> + Send + Sync>;
type Indexer = Box<dyn Fn(&Opaque, i64) -> Option<Value> + Send + Sync>;

/// A declarative associative capability for one host type: a table of
/// field-name getters plus an optional integer indexer.
///
/// Lookup tries the exact field name, then a capitalized form, then any
/// registered aliases (the equivalent of a serialization-tag match). A
/// getter returning `None` normalizes to Null with the presence flag kept
/// true, since the field itself exists.
pub struct FieldTable {
	type_name: &'static str,
	fields: Vec<(String, FieldGetter)>,
	aliases: Vec<(String, String)>,
	indexer: Option<Indexer>,
}

impl FieldTable {
	pub fn new(type_name: &'static str) -> Self {
		Self {
			type_name,
			fields: Vec::new(),
			aliases: Vec::new(),
			indexer: None,
		}
	}

	/// Register a field getter
	pub fn with_field<F>(mut self, name: &str, getter: F) -> Self
	where
		F: Fn(&Opaque) -> Option<Value> + Send + Sync + 'static,
	{
		self.fields.push((name.to_string(), Box::new(getter)));
		self
	}

	/// Register an alias resolving to an existing field
	pub fn with_alias(mut self, alias: &str, field: &str) -> Self {
		self.aliases.push((alias.to_string(), field.to_string()));
		self
	}

	/// Register an integer indexer
	pub fn with_indexer<F>(mut self, indexer: F) -> Self
	where
		F: Fn(&Opaque, i64) -> Option<Value> + Send + Sync + 'static,
	{
		self.indexer = Some(Box::new(indexer));
		self
	}

	fn field(&self, name: &str) -> Option<&FieldGetter> {
		if let Some((_, g)) = self.fields.iter().find(|(n, _)| n == name) {
			return Some(g);
		}
		// Fall back to a capitalized form of the name
		let mut capitalized = name.to_string();
		if let Some(first) = capitalized.get_mut(0..1) {
			first.make_ascii_uppercase();
		}
		if let Some((_, g)) = self.fields.iter().find(|(n, _)| *n == capitalized) {
			return Some(g);
		}
		// Fall back to a registered alias
		if let Some((_, field)) = self.aliases.iter().find(|(a, _)| a == name) {
			return self.fields.iter().find(|(n, _)| n == field).map(|(_, g)| g);
		}
		None
	}
}

impl AssocProtocol for FieldTable {
	fn applicable(&self, a: &Value, _key: &Value) -> bool {
		matches!(a, Value::Opaque(op) if op.type_name() == self.type_name)
	}

	fn get(&self, _scope: &Scope, a: &Value, key: &Value) -> (Value, bool) {
		let Value::Opaque(op) = a else {
			return (Value::Null, false);
		};
		match key {
			Value::Strand(name) => match self.field(name.as_str()) {
				// A host nil is normalized to Null
				Some(getter) => (getter(op).unwrap_or(Value::Null), true),
				None => (Value::Null, false),
			},
			Value::Number(Number::Int(i)) => match &self.indexer {
				Some(indexer) => match indexer(op, *i) {
					Some(v) => (v, true),
					None => (Value::Null, false),
				},
				None => (Value::Null, false),
			},
			_ => (Value::Null, false),
		}
	}
}

/// Enumerate the column names of a row-shaped value.
pub(crate) fn columns(v: &Value) -> Vec<String> {
	match v {
		Value::Object(obj) => obj.keys().cloned().collect(),
		Value::Row(row) => row.columns(),
		_ => Vec::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;
	use crate::ql::Object;
	use std::sync::Arc;

	struct Widget {
		size: i64,
		label: Option<String>,
	}

	fn widget_table() -> FieldTable {
		FieldTable::new("widget")
			.with_field("Size", |op| {
				op.downcast_ref::<Widget>().map(|w| Value::from(w.size))
			})
			.with_field("Label", |op| {
				op.downcast_ref::<Widget>().and_then(|w| w.label.clone()).map(Value::from)
			})
			.with_alias("tag", "Label")
	}

	#[tokio::test]
	async fn field_table_resolves_with_fallbacks() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		scope.add_protocol_impl(crate::protocol::ProtocolImpl::Assoc(Arc::new(widget_table())));
		let w = Value::Opaque(Opaque::new(
			"widget",
			Widget {
				size: 3,
				label: None,
			},
		));
		// Exact, capitalized and alias lookups
		let (v, present) = assoc(&ctx, &scope, &w, &Value::from("Size")).await;
		assert_eq!((v, present), (Value::from(3), true));
		let (v, present) = assoc(&ctx, &scope, &w, &Value::from("size")).await;
		assert_eq!((v, present), (Value::from(3), true));
		// A host nil is normalized to Null but stays present
		let (v, present) = assoc(&ctx, &scope, &w, &Value::from("tag")).await;
		assert_eq!((v, present), (Value::Null, true));
		// Unknown members miss
		let (v, present) = assoc(&ctx, &scope, &w, &Value::from("missing")).await;
		assert_eq!((v, present), (Value::Null, false));
	}

	#[tokio::test]
	async fn lookup_distributes_over_sequences() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let rows = Value::Array(Array(vec![
			Value::Object(obj! { "a" => 1 }),
			Value::Object(obj! { "a" => 2 }),
			Value::Object(obj! { "b" => 3 }),
		]));
		let (v, present) = assoc(&ctx, &scope, &rows, &Value::from("a")).await;
		assert!(present);
		assert_eq!(v, Value::Array(Array(vec![Value::from(1), Value::from(2), Value::Null])));
	}

	#[tokio::test]
	async fn object_lookup_honours_defaults() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let mut obj = Object::new().with_default(Value::from(0));
		obj.insert("x".to_string(), Value::from(5));
		let obj = Value::Object(obj);
		assert_eq!(assoc(&ctx, &scope, &obj, &Value::from("x")).await, (Value::from(5), true));
		assert_eq!(assoc(&ctx, &scope, &obj, &Value::from("y")).await, (Value::from(0), false));
	}
}
