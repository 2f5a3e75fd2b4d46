use crate::ctx::Context;
use crate::exec::stream::{self, RowStream};
use crate::exec::Scope;
use crate::ql::Value;
use async_trait::async_trait;
use indexmap::IndexMap;

/// The evaluator-provided callback surface driving a grouper.
///
/// The actor separates "reduce the bin key for a row" from "materialize the
/// row inside the bin's aggregator scope", so group state accumulates over
/// the correct scope without the grouper seeing evaluator internals.
#[async_trait]
pub trait GroupActor: Send + Sync {
	/// Reduce the bin key for an input row, as a stringified form
	async fn bin_key(&self, ctx: &Context, row: &Value) -> String;

	/// Create the aggregator scope backing a new bin
	fn new_bin(&self) -> Scope;

	/// Materialize the row inside the bin's aggregator scope
	async fn materialize(&self, ctx: &Context, bin: &Scope, row: &Value) -> Value;
}

/// Pluggable aggregation over a row stream.
#[async_trait]
pub trait Grouper: Send + Sync {
	async fn group(
		&self,
		ctx: &Context,
		input: RowStream,
		actor: std::sync::Arc<dyn GroupActor>,
	) -> RowStream;
}

/// The default in-memory grouper.
///
/// Rows with identical keys share one aggregator scope (and therefore one
/// aggregator context); the last materialized row of each bin is emitted,
/// bins in first-seen order.
pub struct DefaultGrouper;

#[async_trait]
impl Grouper for DefaultGrouper {
	async fn group(
		&self,
		ctx: &Context,
		mut input: RowStream,
		actor: std::sync::Arc<dyn GroupActor>,
	) -> RowStream {
		let mut bins: IndexMap<String, (Scope, Value)> = IndexMap::new();
		while let Some(row) = input.next().await {
			if ctx.is_done() {
				break;
			}
			let key = actor.bin_key(ctx, &row).await;
			if !bins.contains_key(&key) {
				let bin = actor.new_bin();
				bins.insert(key.clone(), (bin, Value::Null));
			}
			let (bin, latest) = bins.get_mut(&key).expect("bin was just inserted");
			*latest = actor.materialize(ctx, bin, &row).await;
		}
		let mut out = Vec::with_capacity(bins.len());
		for (_, (bin, latest)) in bins {
			out.push(latest);
			// The bin's aggregator scope is done once its row is emitted
			bin.close().await;
		}
		stream::RowStream::from_values(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;
	use crate::exec::aggregator::AggregatorCtx;
	use std::sync::Arc;

	struct CountActor {
		base: Scope,
	}

	#[async_trait]
	impl GroupActor for CountActor {
		async fn bin_key(&self, _ctx: &Context, row: &Value) -> String {
			match row {
				Value::Object(obj) => obj.resolve("k").0.to_string(),
				_ => String::new(),
			}
		}

		fn new_bin(&self) -> Scope {
			let bin = self.base.copy();
			bin.set_aggregator(AggregatorCtx::new());
			bin
		}

		async fn materialize(&self, _ctx: &Context, bin: &Scope, row: &Value) -> Value {
			let agg = bin.aggregator().expect("bin scope has an aggregator");
			let n = agg.modify("count", |old| match old {
				Some(Value::Number(n)) => Value::from(n.as_int() + 1),
				_ => Value::from(1),
			});
			let key = match row {
				Value::Object(obj) => obj.resolve("k").0,
				_ => Value::Null,
			};
			Value::Object(obj! { "k" => key, "n" => n })
		}
	}

	#[tokio::test]
	async fn bins_emit_in_first_seen_order_with_independent_state() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let input = RowStream::from_values(vec![
			Value::Object(obj! { "k" => "b" }),
			Value::Object(obj! { "k" => "a" }),
			Value::Object(obj! { "k" => "b" }),
			Value::Object(obj! { "k" => "b" }),
		]);
		let out = DefaultGrouper
			.group(
				&ctx,
				input,
				Arc::new(CountActor {
					base: scope,
				}),
			)
			.await
			.collect()
			.await;
		assert_eq!(
			out,
			vec![
				Value::Object(obj! { "k" => "b", "n" => 3 }),
				Value::Object(obj! { "k" => "a", "n" => 1 }),
			]
		);
	}
}
