use crate::ctx::Context;
use crate::exec::Scope;
use crate::fnc::args::{self, ArgKind, ArgSpec};
use crate::fnc::{CallArgs, Function, FunctionInfo};
use crate::ql::Value;
use async_trait::async_trait;

/// `encode(string, type)` — re-encodes a string.
///
/// Supported types: `hex` and `json`.
pub struct Encode;

#[async_trait]
impl Function for Encode {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		const ARGS: &[ArgSpec] = &[
			ArgSpec::required("string", ArgKind::Any, "the value to encode"),
			ArgSpec::required("type", ArgKind::Strand, "the target encoding"),
		];
		FunctionInfo {
			name: "encode",
			doc: "Encodes a value as hex or json",
			args: ARGS,
			aggregate: false,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args.args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("encode: {e}"));
				return Value::Null;
			}
		};
		let value = extracted.get("string").cloned().unwrap_or_default();
		let Some(kind) = extracted.strand("type") else {
			return Value::Null;
		};
		match kind.to_ascii_lowercase().as_str() {
			"hex" => Value::from(hex::encode(value.as_raw_string())),
			"json" => match serde_json::to_string(&value) {
				Ok(s) => Value::from(s),
				Err(e) => {
					scope.log(format_args!("encode: cannot serialize to json: {e}"));
					Value::Null
				}
			},
			other => {
				scope.log(format_args!("encode: unknown encoding {other}"));
				Value::Null
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;

	#[tokio::test]
	async fn hex_and_json_encodings() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let args = CallArgs {
			args: obj! { "string" => "abc", "type" => "hex" },
			call_id: 0,
		};
		assert_eq!(Encode.call(&ctx, &scope, args).await, Value::from("616263"));
		let args = CallArgs {
			args: obj! { "string" => 42, "type" => "json" },
			call_id: 0,
		};
		assert_eq!(Encode.call(&ctx, &scope, args).await, Value::from("42"));
	}
}
