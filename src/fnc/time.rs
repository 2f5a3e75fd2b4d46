use crate::ctx::Context;
use crate::exec::Scope;
use crate::fnc::args::{self, ArgKind, ArgSpec};
use crate::fnc::{CallArgs, Function, FunctionInfo};
use crate::ql::{Datetime, Value};
use async_trait::async_trait;

/// `timestamp(epoch | winfiletime)` — builds a time instant.
pub struct Timestamp;

#[async_trait]
impl Function for Timestamp {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		const ARGS: &[ArgSpec] = &[
			ArgSpec::optional("epoch", ArgKind::Float, "seconds since the Unix epoch"),
			ArgSpec::optional("winfiletime", ArgKind::Int, "a Windows FILETIME value"),
		];
		FunctionInfo {
			name: "timestamp",
			doc: "Builds a time instant from an epoch or FILETIME value",
			args: ARGS,
			aggregate: false,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args.args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("timestamp: {e}"));
				return Value::Null;
			}
		};
		if let Some(epoch) = extracted.float("epoch") {
			return Value::Datetime(Datetime::from_epoch(epoch));
		}
		if let Some(ft) = extracted.int("winfiletime") {
			return Value::Datetime(Datetime::from_winfiletime(ft));
		}
		Value::Datetime(Datetime::default())
	}
}
