//! Built-in functions and plugins, their registries, and the call paths
//! with the host-panic guard.

use crate::ctx::Context;
use crate::err::Error;
use crate::exec::{RowStream, Scope};
use crate::ql::expr::Expr;
use crate::ql::{Arg, FunctionCall, LazyExpr, Object, StoredQuery, Value};
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

pub mod aggregate;
pub mod args;
pub mod dict;
pub mod encoding;
pub mod flatten;
pub mod foreach;
pub mod iff;
pub mod range;
pub mod scope;
pub mod sleep;
pub mod string;
pub mod time;
pub mod util;

pub use args::{ArgKind, ArgSpec, ExtractedArgs};

/// Metadata describing a scalar function.
#[derive(Clone, Debug)]
pub struct FunctionInfo {
	pub name: &'static str,
	pub doc: &'static str,
	pub args: &'static [ArgSpec],
	pub aggregate: bool,
	pub version: u32,
}

/// Metadata describing a row-producing plugin.
#[derive(Clone, Debug)]
pub struct PluginInfo {
	pub name: &'static str,
	pub doc: &'static str,
	pub args: &'static [ArgSpec],
	pub version: u32,
}

/// The call-time arguments of a function invocation.
#[derive(Debug)]
pub struct CallArgs {
	/// The keyword arguments, each lazily wrapped
	pub args: Object,
	/// The stable call-site identifier, used to key aggregate state
	pub call_id: u32,
}

/// A scalar function callable from QL expressions.
#[async_trait]
pub trait Function: Send + Sync {
	fn info(&self, scope: &Scope) -> FunctionInfo;
	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value;
}

/// A row-producing plugin usable in a `FROM` clause.
#[async_trait]
pub trait Plugin: Send + Sync {
	fn info(&self, scope: &Scope) -> PluginInfo;
	async fn call(&self, ctx: &Context, scope: &Scope, args: Object) -> RowStream;
}

/// Register the built-in functions and plugins on a scope.
pub fn register_builtins(scope: &Scope) {
	scope.append_functions([
		Arc::new(aggregate::Count) as Arc<dyn Function>,
		Arc::new(aggregate::Sum),
		Arc::new(aggregate::Min),
		Arc::new(aggregate::Max),
		Arc::new(aggregate::Enumerate),
		Arc::new(dict::Dict),
		Arc::new(iff::If),
		Arc::new(string::Split),
		Arc::new(string::Format),
		Arc::new(time::Timestamp),
		Arc::new(encoding::Encode),
		Arc::new(util::Get),
		Arc::new(util::Len),
		Arc::new(util::Version),
	]);
	scope.append_plugins([
		Arc::new(range::Range) as Arc<dyn Plugin>,
		Arc::new(scope::ScopePlugin),
		Arc::new(iff::IfPlugin),
		Arc::new(foreach::Foreach),
		Arc::new(flatten::Flatten),
		Arc::new(sleep::Sleep),
	]);
}

/// Wrap call arguments for passing to a plugin or function.
///
/// Every argument expression becomes a lazy expression over the calling
/// scope, so that nothing is computed until the callee touches it; a
/// subquery argument is passed through verbatim as a stored query.
pub(crate) fn wrap_args(scope: &Scope, args: &[Arg]) -> Object {
	let mut out = Object::new();
	for arg in args {
		let value = match arg.value.as_ref() {
			Expr::Subquery(stmt) => {
				Value::Query(StoredQuery::select(stmt.clone(), scope.clone()))
			}
			Expr::Literal(lit) => lit.to_value(),
			_ => Value::Lazy(LazyExpr::new(arg.value.clone(), scope.clone())),
		};
		out.insert(arg.name.0.clone(), value);
	}
	out
}

/// Invoke a function by name, guarding against host panics.
///
/// Failures never escape as errors: an unknown name, an argument problem or
/// a panic all log a diagnostic and reduce to Null.
pub(crate) async fn run(
	ctx: &Context,
	scope: &Scope,
	call: &FunctionCall,
) -> Result<Value, Error> {
	let name = call.name.as_str();
	let Some(function) = scope.function(name) else {
		scope.log(format_args!("Unknown function {name}"));
		return Ok(Value::Null);
	};
	scope.stats().incr_functions_called();
	let args = CallArgs {
		args: wrap_args(scope, &call.args),
		call_id: call.call_id(),
	};
	let fut = function.call(ctx, scope, args);
	match AssertUnwindSafe(fut).catch_unwind().await {
		Ok(v) => Ok(v),
		Err(payload) => {
			scope.log(format_args!("Function {name} panicked: {}", panic_message(&payload)));
			Ok(Value::Null)
		}
	}
}

/// Invoke a plugin, guarding against host panics.
pub(crate) async fn call_plugin(
	ctx: &Context,
	scope: &Scope,
	plugin: Arc<dyn Plugin>,
	args: Object,
) -> RowStream {
	scope.stats().incr_plugins_called();
	let fut = plugin.call(ctx, scope, args);
	match AssertUnwindSafe(fut).catch_unwind().await {
		Ok(stream) => stream,
		Err(payload) => {
			scope.log(format_args!(
				"Plugin {} panicked: {}",
				plugin.info(scope).name,
				panic_message(&payload)
			));
			RowStream::empty()
		}
	}
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"unknown panic".to_string()
	}
}
