use crate::ctx::Context;
use crate::exec::{RowStream, Scope};
use crate::fnc::args::{self, ArgKind, ArgSpec};
use crate::fnc::{CallArgs, Function, FunctionInfo, Plugin, PluginInfo};
use crate::ql::{Array, Object, Value};
use crate::protocol;
use async_trait::async_trait;

const ARGS: &[ArgSpec] = &[
	ArgSpec::required("condition", ArgKind::Any, "the condition to test"),
	ArgSpec::required("then", ArgKind::Lazy, "evaluated when the condition is true"),
	ArgSpec::optional("else", ArgKind::Lazy, "evaluated when the condition is false"),
];

// Select the branch carrier without evaluating either branch.
async fn select_branch(
	ctx: &Context,
	scope: &Scope,
	args: &Object,
) -> Result<Option<Value>, crate::err::Error> {
	let extracted = args::extract(ctx, scope, ARGS, args).await?;
	let truthy = extracted
		.get("condition")
		.map(|v| protocol::truthy(scope, v))
		.unwrap_or(false);
	let branch = if truthy {
		extracted.get("then")
	} else {
		extracted.get("else")
	};
	Ok(branch.cloned())
}

/// `if(condition, then, else)` — lazy in both branches.
///
/// The branch which is not selected is never evaluated. A branch reducing
/// to a stored query is materialized; use `FROM if(...)` to stream it
/// instead.
pub struct If;

#[async_trait]
impl Function for If {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		FunctionInfo {
			name: "if",
			doc: "Evaluates one of two lazy branches depending on a condition",
			args: ARGS,
			aggregate: false,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let branch = match select_branch(ctx, scope, &args.args).await {
			Ok(b) => b,
			Err(e) => {
				scope.log(format_args!("if: {e}"));
				return Value::Null;
			}
		};
		let Some(branch) = branch else {
			return Value::Null;
		};
		let value = protocol::delazify(ctx, branch).await;
		match value {
			Value::Query(query) => {
				// Materialize the selected stored query
				let rows = query.collect(ctx, scope).await;
				let mut out = Array::with_capacity(rows.len());
				for row in &rows {
					out.push(Value::Object(crate::exec::row_to_object(ctx, scope, row).await));
				}
				Value::Array(out)
			}
			value => value,
		}
	}
}

/// `FROM if(...)` — like the `if` function, but a stored-query branch has
/// its row stream passed through rather than materialized.
pub struct IfPlugin;

#[async_trait]
impl Plugin for IfPlugin {
	fn info(&self, _scope: &Scope) -> PluginInfo {
		PluginInfo {
			name: "if",
			doc: "Streams one of two lazy branches depending on a condition",
			args: ARGS,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: Object) -> RowStream {
		let branch = match select_branch(ctx, scope, &args).await {
			Ok(b) => b,
			Err(e) => {
				scope.log(format_args!("if: {e}"));
				return RowStream::empty();
			}
		};
		let Some(branch) = branch else {
			return RowStream::empty();
		};
		let value = protocol::delazify(ctx, branch).await;
		protocol::iterate(ctx, scope, value).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;
	use crate::ql::LazyExpr;
	use crate::ql::{Expr, Ident};
	use std::sync::Arc;

	#[tokio::test]
	async fn unselected_branch_is_never_evaluated() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		// The then branch resolves a symbol bound to a poisoned thunk
		let bomb = Value::Thunk(crate::ql::Thunk::new(|| panic!("must not be called")));
		scope.append_vars(obj! { "bomb" => bomb });
		let then = Value::Lazy(LazyExpr::new(
			Arc::new(Expr::Symbol(Ident::from("bomb"))),
			scope.clone(),
		));
		let args = CallArgs {
			args: obj! { "condition" => false, "then" => then },
			call_id: 0,
		};
		assert_eq!(If.call(&ctx, &scope, args).await, Value::Null);
	}
}
