use crate::ctx::{Canceller, Context, MutableContext};
use crate::exec::explain::{typed_dump, Explainer};
use crate::exec::group::GroupActor;
use crate::exec::stream::{self, RowStream};
use crate::exec::Scope;
use crate::fnc;
use crate::ql::field::{Field, Fields};
use crate::ql::lazy::LazyExpr;
use crate::ql::row::{push_column, Getter, LazyRow};
use crate::ql::statements::select::SelectStatement;
use crate::ql::Value;
use crate::protocol;
use async_trait::async_trait;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::sync::Arc;

/// Drive a `SELECT` statement into a row stream.
///
/// The pipeline stages are From → Where → Transform → GroupBy → OrderBy →
/// Limit. Rows flow through bounded channels; a dedicated child context
/// cancels the producing stages when the limit is reached or the consumer
/// goes away.
pub(crate) async fn run(stmt: Arc<SelectStatement>, ctx: &Context, scope: &Scope) -> RowStream {
	// Enable context override for early cancellation
	let mut cancel_ctx = MutableContext::new(ctx);
	let canceller = cancel_ctx.add_cancel();
	let ctx = cancel_ctx.freeze();
	// The statement evaluates against its own child scope
	let stmt_scope = scope.copy();
	if stmt.explain && stmt_scope.explainer().is_none() {
		stmt_scope.set_explainer(Arc::new(Explainer::new()));
	}
	let explaining = stmt_scope.explainer().is_some();
	if explaining {
		stmt_scope.explain(format_args!("Starting query: {stmt}"));
	}
	// From → Where → Transform
	let grouping = stmt.group.is_some();
	let stage = {
		let stmt = stmt.clone();
		let scope = stmt_scope.clone();
		let ctx = ctx.clone();
		stream::spawn_source(move |tx| async move {
			let mut input = from_source(&ctx, &scope, &stmt).await;
			while let Some(row) = input.next().await {
				if ctx.is_done() {
					break;
				}
				scope.stats().incr_rows_scanned();
				scope.charge_op().await;
				if explaining {
					scope.explain(format_args!("Source row: {}", typed_dump(&row)));
				}
				// Each row evaluates against a fresh child scope
				let row_scope = scope.copy();
				row_scope.append_frame(row.clone());
				let lazy = transform(&row_scope, &stmt.expr, &row);
				// The filter sees the input row and the projected row
				if let Some(cond) = &stmt.cond {
					let cond_scope = row_scope.copy();
					cond_scope.append_frame(Value::Row(lazy.clone()));
					let v = match cond.compute(&ctx, &cond_scope).await {
						Ok(v) => protocol::delazify(&ctx, v).await,
						Err(e) => {
							scope.log(format_args!("Error reducing {cond}: {e}"));
							Value::Null
						}
					};
					if !protocol::truthy(&scope, &v) {
						if explaining {
							scope.explain(format_args!(
								"Row rejected by WHERE ({} = {v}): {}",
								&cond.0,
								typed_dump(&row)
							));
						}
						continue;
					}
				}
				// Grouping re-materializes rows in bin scopes, so the
				// original row is forwarded; otherwise the lazy row is
				let out = if grouping {
					row
				} else {
					Value::Row(lazy)
				};
				if explaining && !grouping {
					scope.explain(format_args!("Emitting row: {}", typed_dump(&out)));
				}
				if !stream::send(&ctx, &tx, out).await {
					break;
				}
			}
		})
	};
	// GroupBy
	let stage = if grouping {
		let actor = Arc::new(SelectActor {
			stmt: stmt.clone(),
			base: stmt_scope.clone(),
		});
		stmt_scope.grouper().group(&ctx, stage, actor).await
	} else {
		stage
	};
	// OrderBy
	let stage = match &stmt.order {
		Some(order) => stmt_scope.sorter().sort(&ctx, &stmt_scope, stage, order).await,
		None => stage,
	};
	// Limit
	match stmt.limit {
		Some(limit) => apply_limit(ctx, canceller, stage, limit.0),
		None => stage,
	}
}

/// Resolve the FROM clause into the input row stream.
pub(crate) async fn from_source(
	ctx: &Context,
	scope: &Scope,
	stmt: &SelectStatement,
) -> RowStream {
	let what = &stmt.what;
	let name = what.name.as_str();
	// A registered plugin wins
	if let Some(plugin) = scope.plugin(name) {
		let args = fnc::wrap_args(scope, what.args());
		if scope.explainer().is_some() {
			scope.explain(format_args!("Calling plugin {name} with args {args}"));
		}
		return fnc::call_plugin(ctx, scope, plugin, args).await;
	}
	// Otherwise a scope variable provides the rows
	let (val, present) = scope.resolve(ctx, name).await;
	if present {
		let val = protocol::delazify(ctx, val).await;
		return match val {
			Value::Query(query) if what.args.is_some() => {
				let args = fnc::wrap_args(scope, what.args());
				query.eval_with_args(ctx, scope, args).await
			}
			Value::Query(query) => query.eval(ctx, scope).await,
			val => protocol::iterate(ctx, scope, val).await,
		};
	}
	// Nothing matched, log a diagnostic with a near-name suggestion
	let mut msg = format!("Plugin {name} not found");
	if let Some(suggestion) = nearest_plugin(scope, name) {
		msg.push_str(&format!(", did you mean {suggestion}?"));
	}
	if scope.function(name).is_some() {
		msg.push_str(&format!(" There is a function of the same name; try SELECT {name}(...)"));
	}
	scope.log(format_args!("{msg}"));
	RowStream::empty()
}

fn nearest_plugin(scope: &Scope, name: &str) -> Option<String> {
	let matcher = SkimMatcherV2::default();
	scope
		.plugin_names()
		.into_iter()
		.filter_map(|candidate| {
			matcher.fuzzy_match(&candidate, name).map(|score| (score, candidate))
		})
		.max_by_key(|(score, _)| *score)
		.map(|(_, candidate)| candidate)
}

/// Build the lazy projection row for one input row.
///
/// A `*` field copies all columns of the input row first; explicit aliased
/// expressions append after, shadowing earlier copies of the same name.
pub(crate) fn transform(row_scope: &Scope, fields: &Fields, input: &Value) -> LazyRow {
	let mut columns = Vec::new();
	if fields.has_all() {
		match input {
			Value::Object(obj) => {
				for (k, v) in obj.iter() {
					push_column(&mut columns, k.clone(), Getter::Value(v.clone()));
				}
			}
			Value::Row(row) => {
				for name in row.columns() {
					if let Some(getter) = row.getter(&name) {
						push_column(&mut columns, name, getter);
					}
				}
			}
			_ => (),
		}
	}
	for field in fields.other() {
		if let Field::Single {
			expr,
			..
		} = field
		{
			let name = field.column_name();
			let getter = Getter::Expr(LazyExpr::new(expr.clone(), row_scope.clone()));
			push_column(&mut columns, name, getter);
		}
	}
	LazyRow::new(columns)
}

/// The group actor for a `SELECT ... GROUP BY` statement.
struct SelectActor {
	stmt: Arc<SelectStatement>,
	base: Scope,
}

#[async_trait]
impl GroupActor for SelectActor {
	async fn bin_key(&self, ctx: &Context, row: &Value) -> String {
		let Some(group) = &self.stmt.group else {
			return String::new();
		};
		let row_scope = self.base.copy();
		row_scope.append_frame(row.clone());
		let key = match group.0.compute(ctx, &row_scope).await {
			Ok(v) => protocol::delazify(ctx, v).await,
			Err(_) => Value::Null,
		};
		// Bin keys compare as stringified forms
		key.to_string()
	}

	fn new_bin(&self) -> Scope {
		let bin = self.base.copy();
		bin.set_aggregator(crate::exec::aggregator::AggregatorCtx::new());
		bin
	}

	async fn materialize(&self, ctx: &Context, bin: &Scope, row: &Value) -> Value {
		let row_scope = bin.copy();
		row_scope.append_frame(row.clone());
		let mut obj = crate::ql::Object::new();
		if self.stmt.expr.has_all() {
			if let Value::Object(input) = row {
				for (k, v) in input.iter() {
					obj.insert(k.clone(), v.clone());
				}
			}
		}
		for field in self.stmt.expr.other() {
			if let Field::Single {
				expr,
				..
			} = field
			{
				let v = match expr.compute(ctx, &row_scope).await {
					Ok(v) => protocol::delazify(ctx, v).await,
					Err(e) => {
						bin.log(format_args!("Error reducing {expr}: {e}"));
						Value::Null
					}
				};
				obj.insert(field.column_name(), v);
			}
		}
		Value::Object(obj)
	}
}

/// Forward up to `n` rows, then cancel the producing stages.
fn apply_limit(ctx: Context, canceller: Canceller, mut input: RowStream, n: u64) -> RowStream {
	stream::spawn_source(move |tx| async move {
		if n == 0 {
			canceller.cancel();
			return;
		}
		let mut count = 0u64;
		while let Some(row) = input.next().await {
			if !stream::send(&ctx, &tx, row).await {
				break;
			}
			count += 1;
			if count >= n {
				canceller.cancel();
				break;
			}
		}
	})
}
