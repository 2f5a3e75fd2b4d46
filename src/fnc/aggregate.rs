use crate::ctx::Context;
use crate::exec::aggregator::AggregatorCtx;
use crate::exec::Scope;
use crate::fnc::args::{self, ArgKind, ArgSpec};
use crate::fnc::{CallArgs, Function, FunctionInfo};
use crate::ql::{Array, Value};
use crate::protocol;
use async_trait::async_trait;
use std::cmp::Ordering;

// The aggregator context for a call, or a one-off context when the call
// happens outside a GROUP BY bin.
fn context(scope: &Scope) -> AggregatorCtx {
	scope.aggregator().unwrap_or_default()
}

fn state_key(prefix: &str, call_id: u32) -> String {
	format!("${prefix}_{call_id}")
}

/// `count(items?)` — the number of rows aggregated so far.
pub struct Count;

#[async_trait]
impl Function for Count {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		const ARGS: &[ArgSpec] =
			&[ArgSpec::optional("items", ArgKind::Any, "count only non-null items")];
		FunctionInfo {
			name: "count",
			doc: "Counts the rows aggregated in the current group",
			args: ARGS,
			aggregate: true,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args.args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("count: {e}"));
				return Value::Null;
			}
		};
		// With items supplied, null items do not count
		let increment = match extracted.get("items") {
			Some(Value::Null) => 0,
			_ => 1,
		};
		context(scope).modify(&state_key("count", args.call_id), |old| match old {
			Some(Value::Number(n)) => Value::from(n.as_int() + increment),
			_ => Value::from(increment),
		})
	}
}

/// `sum(items)` — the running sum of the aggregated items.
pub struct Sum;

#[async_trait]
impl Function for Sum {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		const ARGS: &[ArgSpec] = &[ArgSpec::required("items", ArgKind::Any, "the value to sum")];
		FunctionInfo {
			name: "sum",
			doc: "Sums the aggregated items in the current group",
			args: ARGS,
			aggregate: true,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args.args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("sum: {e}"));
				return Value::Null;
			}
		};
		let item = extracted.get("items").cloned().unwrap_or_default();
		let scope = scope.clone();
		context(&scope).modify(&state_key("sum", args.call_id), |old| {
			let old = old.unwrap_or(Value::from(0));
			match (old, &item) {
				(Value::Number(a), Value::Number(b)) => Value::Number(a + *b),
				(old, _) => old,
			}
		})
	}
}

fn minmax(scope: &Scope, args: CallArgs, item: Value, keep: Ordering, prefix: &str) -> Value {
	let scope = scope.clone();
	context(&scope).modify(&state_key(prefix, args.call_id), move |old| match old {
		None | Some(Value::Null) => item,
		Some(old) => {
			if protocol::order(&scope, &item, &old) == keep {
				item
			} else {
				old
			}
		}
	})
}

/// `min(items)` — the smallest aggregated item.
pub struct Min;

#[async_trait]
impl Function for Min {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		const ARGS: &[ArgSpec] =
			&[ArgSpec::required("items", ArgKind::Any, "the value to track")];
		FunctionInfo {
			name: "min",
			doc: "Tracks the smallest aggregated item in the current group",
			args: ARGS,
			aggregate: true,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args.args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("min: {e}"));
				return Value::Null;
			}
		};
		let item = extracted.get("items").cloned().unwrap_or_default();
		minmax(scope, args, item, Ordering::Less, "min")
	}
}

/// `max(items)` — the largest aggregated item.
pub struct Max;

#[async_trait]
impl Function for Max {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		const ARGS: &[ArgSpec] =
			&[ArgSpec::required("items", ArgKind::Any, "the value to track")];
		FunctionInfo {
			name: "max",
			doc: "Tracks the largest aggregated item in the current group",
			args: ARGS,
			aggregate: true,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args.args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("max: {e}"));
				return Value::Null;
			}
		};
		let item = extracted.get("items").cloned().unwrap_or_default();
		minmax(scope, args, item, Ordering::Greater, "max")
	}
}

/// `enumerate(items)` — all aggregated items collected into an array.
pub struct Enumerate;

#[async_trait]
impl Function for Enumerate {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		const ARGS: &[ArgSpec] =
			&[ArgSpec::required("items", ArgKind::Any, "the value to collect")];
		FunctionInfo {
			name: "enumerate",
			doc: "Collects the aggregated items of the current group into an array",
			args: ARGS,
			aggregate: true,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args.args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("enumerate: {e}"));
				return Value::Null;
			}
		};
		let item = extracted.get("items").cloned().unwrap_or_default();
		context(scope).modify(&state_key("enumerate", args.call_id), |old| match old {
			Some(Value::Array(arr)) => Value::Array(arr.with_push(item)),
			_ => Value::Array(Array::from(item)),
		})
	}
}
