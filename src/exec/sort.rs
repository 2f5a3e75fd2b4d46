use crate::ctx::Context;
use crate::exec::stream::RowStream;
use crate::exec::Scope;
use crate::ql::Order;
use crate::ql::Value;
use crate::protocol;
use async_trait::async_trait;

/// Pluggable ordering over a row stream.
#[async_trait]
pub trait Sorter: Send + Sync {
	async fn sort(
		&self,
		ctx: &Context,
		scope: &Scope,
		input: RowStream,
		order: &Order,
	) -> RowStream;
}

/// The default in-memory sorter.
///
/// Collects all rows, extracts the key column from each, sorts with the
/// scope's less-than protocol (Null keys sort as the empty string), and
/// reverses for `DESC`.
pub struct DefaultSorter;

#[async_trait]
impl Sorter for DefaultSorter {
	async fn sort(
		&self,
		ctx: &Context,
		scope: &Scope,
		mut input: RowStream,
		order: &Order,
	) -> RowStream {
		let key = Value::from(order.name.as_str());
		let mut rows: Vec<(Value, Value)> = Vec::new();
		while let Some(row) = input.next().await {
			if ctx.is_done() {
				break;
			}
			let (k, _) = protocol::assoc(ctx, scope, &row, &key).await;
			rows.push((k, row));
		}
		rows.sort_by(|(a, _), (b, _)| protocol::order(scope, a, b));
		if order.desc {
			rows.reverse();
		}
		RowStream::from_values(rows.into_iter().map(|(_, row)| row).collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;
	use crate::ql::Ident;

	fn row(v: Value) -> Value {
		Value::Object(obj! { "x" => v })
	}

	#[tokio::test]
	async fn sorts_by_key_with_null_as_empty_string() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let input = RowStream::from_values(vec![
			row(Value::from("beta")),
			row(Value::Null),
			row(Value::from("alpha")),
		]);
		let order = Order {
			name: Ident::from("x"),
			desc: false,
		};
		let out = DefaultSorter.sort(&ctx, &scope, input, &order).await.collect().await;
		assert_eq!(
			out,
			vec![row(Value::Null), row(Value::from("alpha")), row(Value::from("beta"))]
		);
	}

	#[tokio::test]
	async fn desc_reverses() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let input = RowStream::from_values(vec![
			row(Value::from(1)),
			row(Value::from(3)),
			row(Value::from(2)),
		]);
		let order = Order {
			name: Ident::from("x"),
			desc: true,
		};
		let out = DefaultSorter.sort(&ctx, &scope, input, &order).await.collect().await;
		assert_eq!(out, vec![row(Value::from(3)), row(Value::from(2)), row(Value::from(1))]);
	}
}
