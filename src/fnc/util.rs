use crate::ctx::Context;
use crate::exec::Scope;
use crate::fnc::args::{self, ArgKind, ArgSpec};
use crate::fnc::{CallArgs, Function, FunctionInfo};
use crate::ql::Value;
use crate::protocol;
use async_trait::async_trait;

/// `get(item, member)` — associative lookup through the protocol.
pub struct Get;

#[async_trait]
impl Function for Get {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		const ARGS: &[ArgSpec] = &[
			ArgSpec::required("item", ArgKind::Any, "the value to look into"),
			ArgSpec::required("member", ArgKind::Any, "the member to retrieve"),
		];
		FunctionInfo {
			name: "get",
			doc: "Retrieves a member of a value through the associative protocol",
			args: ARGS,
			aggregate: false,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args.args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("get: {e}"));
				return Value::Null;
			}
		};
		let item = extracted.get("item").cloned().unwrap_or_default();
		let member = extracted.get("member").cloned().unwrap_or_default();
		protocol::assoc(ctx, scope, &item, &member).await.0
	}
}

/// `len(list)` — the length of a sequence, string or mapping.
pub struct Len;

#[async_trait]
impl Function for Len {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		const ARGS: &[ArgSpec] =
			&[ArgSpec::required("list", ArgKind::Any, "the value to measure")];
		FunctionInfo {
			name: "len",
			doc: "The number of elements, bytes or entries in a value",
			args: ARGS,
			aggregate: false,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args.args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("len: {e}"));
				return Value::Null;
			}
		};
		match extracted.get("list") {
			Some(Value::Array(v)) => Value::from(v.len()),
			Some(Value::Strand(v)) => Value::from(v.len()),
			Some(Value::Object(v)) => Value::from(v.len()),
			Some(Value::Query(q)) => {
				let rows = q.collect(ctx, scope).await;
				Value::from(rows.len())
			}
			_ => Value::from(0),
		}
	}
}

/// `version(plugin | function)` — the declared version of a registration.
pub struct Version;

#[async_trait]
impl Function for Version {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		const ARGS: &[ArgSpec] = &[
			ArgSpec::optional("plugin", ArgKind::Strand, "the plugin to inspect"),
			ArgSpec::optional("function", ArgKind::Strand, "the function to inspect"),
		];
		FunctionInfo {
			name: "version",
			doc: "The version of a registered plugin or function",
			args: ARGS,
			aggregate: false,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args.args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("version: {e}"));
				return Value::Null;
			}
		};
		if let Some(name) = extracted.strand("plugin") {
			return match scope.plugin(&name) {
				Some(p) => Value::from(p.info(scope).version as i64),
				None => Value::Null,
			};
		}
		if let Some(name) = extracted.strand("function") {
			return match scope.function(&name) {
				Some(f) => Value::from(f.info(scope).version as i64),
				None => Value::Null,
			};
		}
		Value::Null
	}
}
