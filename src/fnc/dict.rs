use crate::ctx::Context;
use crate::exec::Scope;
use crate::fnc::{CallArgs, Function, FunctionInfo};
use crate::ql::{Object, Value};
use crate::protocol;
use async_trait::async_trait;

/// `dict(**kw)` — builds an object out of arbitrary keyword arguments.
///
/// This function bypasses the argument extractor: every supplied name is
/// accepted and becomes a key, in argument order.
pub struct Dict;

#[async_trait]
impl Function for Dict {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		FunctionInfo {
			name: "dict",
			doc: "Builds an object from its keyword arguments",
			args: &[],
			aggregate: false,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, _scope: &Scope, args: CallArgs) -> Value {
		let mut out = Object::new();
		for (name, value) in args.args.iter() {
			let value = protocol::delazify(ctx, value.clone()).await;
			out.insert(name.clone(), value);
		}
		Value::Object(out)
	}
}
