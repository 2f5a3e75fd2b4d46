use crate::cnf;
use crate::ctx::{Context, MutableContext};
use crate::exec::{stream, RowStream, Scope};
use crate::fnc::args::{self, ArgKind, ArgSpec};
use crate::fnc::{Plugin, PluginInfo};
use crate::ql::{Object, StoredQuery, Value};
use crate::protocol;
use async_trait::async_trait;

/// `foreach(row, query, workers, column)` — the core composition
/// primitive.
///
/// For each row produced by `row`, the stored query `query` is evaluated
/// against a child scope carrying that row's columns, and the produced rows
/// stream to the output. Without `workers` the outer-by-inner order is
/// preserved; with `workers` only the outer input order is, inner outputs
/// interleave. When the inner query completes its child context is
/// cancelled, triggering destructor cleanup.
pub struct Foreach;

const ARGS: &[ArgSpec] = &[
	ArgSpec::required("row", ArgKind::Lazy, "the source of outer rows"),
	ArgSpec::optional("query", ArgKind::Lazy, "the stored query to run per row"),
	ArgSpec::optional("workers", ArgKind::Int, "the number of parallel inner evaluations"),
	ArgSpec::optional("column", ArgKind::Strand, "project this column instead of a query"),
];

#[async_trait]
impl Plugin for Foreach {
	fn info(&self, _scope: &Scope) -> PluginInfo {
		PluginInfo {
			name: "foreach",
			doc: "Evaluates a stored query once per row of another query",
			args: ARGS,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: Object) -> RowStream {
		let extracted = match args::extract(ctx, scope, ARGS, &args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("foreach: {e}"));
				return RowStream::empty();
			}
		};
		let row_arg = extracted.get("row").cloned().unwrap_or_default();
		let row_arg = protocol::delazify(ctx, row_arg).await;
		let column = extracted.strand("column");
		let query = match extracted.get("query").cloned() {
			Some(q) => Some(protocol::delazify(ctx, q).await),
			None => None,
		};
		let query = match (query, &column) {
			(Some(Value::Query(q)), _) => Some(q),
			(None, Some(_)) => None,
			(other, None) => {
				scope.log(format_args!(
					"foreach: query must be a stored query, got {}",
					other.map(|v| v.kind()).unwrap_or("nothing")
				));
				return RowStream::empty();
			}
			(_, Some(_)) => None,
		};
		let workers = extracted.int("workers").unwrap_or(0).max(0) as usize;
		let workers = workers.min(*cnf::MAX_FOREACH_WORKERS);
		let ctx = ctx.clone();
		let scope = scope.clone();
		stream::spawn_source(move |tx| async move {
			let outer = protocol::iterate(&ctx, &scope, row_arg).await;
			match (query, column, workers) {
				(None, Some(column), _) => {
					project_column(&ctx, &scope, outer, column, tx).await;
				}
				(Some(query), _, w) if w > 1 => {
					parallel(&ctx, &scope, outer, query, w, tx).await;
				}
				(Some(query), _, _) => {
					sequential(&ctx, &scope, outer, query, tx).await;
				}
				(None, None, _) => (),
			}
		})
	}
}

// Project a single column from each outer row.
async fn project_column(
	ctx: &Context,
	scope: &Scope,
	mut outer: RowStream,
	column: String,
	tx: channel::Sender<Value>,
) {
	let key = Value::from(column);
	while let Some(row) = outer.next().await {
		let (v, _) = protocol::assoc(ctx, scope, &row, &key).await;
		if !stream::send(ctx, &tx, protocol::as_row(v)).await {
			break;
		}
	}
}

// Run the inner query against a child scope carrying one outer row.
async fn run_inner(
	ctx: &Context,
	scope: &Scope,
	query: &StoredQuery,
	row: Value,
	tx: &channel::Sender<Value>,
) -> bool {
	// The inner query gets its own cancellable context
	let mut inner_ctx = MutableContext::new(ctx);
	let canceller = inner_ctx.add_cancel();
	let inner_ctx = inner_ctx.freeze();
	let child = scope.copy();
	child.append_frame(row);
	let mut rows = query.eval(&inner_ctx, &child).await;
	let mut ok = true;
	while let Some(out) = rows.next().await {
		if !stream::send(ctx, tx, out).await {
			ok = false;
			break;
		}
	}
	// Completion cancels the child context so destructors run promptly
	canceller.cancel();
	child.close().await;
	ok
}

async fn sequential(
	ctx: &Context,
	scope: &Scope,
	mut outer: RowStream,
	query: StoredQuery,
	tx: channel::Sender<Value>,
) {
	while let Some(row) = outer.next().await {
		if ctx.is_done() {
			break;
		}
		if !run_inner(ctx, scope, &query, row, &tx).await {
			break;
		}
	}
}

async fn parallel(
	ctx: &Context,
	scope: &Scope,
	mut outer: RowStream,
	query: StoredQuery,
	workers: usize,
	tx: channel::Sender<Value>,
) {
	let (work_tx, work_rx) = channel::bounded::<Value>(workers);
	let mut handles = Vec::with_capacity(workers);
	for _ in 0..workers {
		let ctx = ctx.clone();
		let scope = scope.clone();
		let query = query.clone();
		let tx = tx.clone();
		let work_rx = work_rx.clone();
		handles.push(tokio::spawn(async move {
			while let Ok(row) = work_rx.recv().await {
				if !run_inner(&ctx, &scope, &query, row, &tx).await {
					break;
				}
			}
		}));
	}
	drop(work_rx);
	// Outer rows are handed to workers in input order
	while let Some(row) = outer.next().await {
		if ctx.is_done() || work_tx.send(row).await.is_err() {
			break;
		}
	}
	drop(work_tx);
	for handle in handles {
		let _ = handle.await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;
	use crate::ql::Array;

	#[tokio::test]
	async fn column_projection_replaces_the_inner_query() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let rows = Value::Array(Array(vec![
			Value::Object(obj! { "a" => 1 }),
			Value::Object(obj! { "a" => 2 }),
		]));
		let args = obj! { "row" => rows, "column" => "a" };
		let out = Foreach.call(&ctx, &scope, args).await.collect().await;
		assert_eq!(
			out,
			vec![
				Value::Object(obj! { "_value" => 1 }),
				Value::Object(obj! { "_value" => 2 }),
			]
		);
	}
}
