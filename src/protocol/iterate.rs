use crate::ctx::Context;
use crate::exec::{RowStream, Scope};
use crate::ql::Value;

/// A registered iteration behaviour for host value kinds.
pub trait IterateProtocol: Send + Sync {
	fn applicable(&self, a: &Value) -> bool;
	fn rows(&self, scope: &Scope, a: &Value) -> Vec<Value>;
}

/// Iterate a value as a stream of rows.
///
/// Stored queries yield their streams; objects yield themselves once;
/// sequences yield each non-null element, passing row-shaped elements
/// through and wrapping scalars as `{_value: elem}`. Everything else
/// dispatches, and the fallback is a single `{_value: a}` row.
pub async fn iterate(ctx: &Context, scope: &Scope, v: Value) -> RowStream {
	match v {
		Value::Query(query) => query.eval(ctx, scope).await,
		Value::Object(_) => RowStream::from_values(vec![v]),
		Value::Array(items) => {
			let rows = items
				.into_iter()
				.filter(|item| !item.is_null())
				.map(as_row)
				.collect();
			RowStream::from_values(rows)
		}
		v => {
			if let Some(imp) =
				super::search(scope, scope.protocols().iterate_impls(), |i| i.applicable(&v))
			{
				return RowStream::from_values(imp.rows(scope, &v));
			}
			// The default row shape
			RowStream::from_values(vec![as_row(v)])
		}
	}
}

/// Wrap a value as a row, leaving row-shaped values untouched.
pub(crate) fn as_row(v: Value) -> Value {
	match v {
		Value::Object(_) | Value::Row(_) => v,
		v => Value::Object(obj! { "_value" => v }),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;
	use crate::ql::Array;

	#[tokio::test]
	async fn arrays_yield_elements_wrapping_scalars() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let arr = Value::Array(Array(vec![
			Value::from(1),
			Value::Null,
			Value::Object(obj! { "a" => 2 }),
		]));
		let rows = iterate(&ctx, &scope, arr).await.collect().await;
		assert_eq!(
			rows,
			vec![
				Value::Object(obj! { "_value" => 1 }),
				Value::Object(obj! { "a" => 2 }),
			]
		);
	}

	#[tokio::test]
	async fn objects_yield_themselves_once() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let obj = Value::Object(obj! { "a" => 1 });
		let rows = iterate(&ctx, &scope, obj.clone()).await.collect().await;
		assert_eq!(rows, vec![obj]);
	}

	#[tokio::test]
	async fn scalars_yield_a_default_row() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let rows = iterate(&ctx, &scope, Value::from(7)).await.collect().await;
		assert_eq!(rows, vec![Value::Object(obj! { "_value" => 7 })]);
	}
}
