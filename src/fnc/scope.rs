use crate::ctx::Context;
use crate::exec::{RowStream, Scope};
use crate::fnc::{Plugin, PluginInfo};
use crate::ql::{Object, Opaque, Value};
use async_trait::async_trait;

/// `scope()` — yields the current scope as a single row.
///
/// Member access on the emitted row delegates to name resolution, so
/// columns selected from it see every variable visible at the call site.
pub struct ScopePlugin;

#[async_trait]
impl Plugin for ScopePlugin {
	fn info(&self, _scope: &Scope) -> PluginInfo {
		PluginInfo {
			name: "scope",
			doc: "Yields the current scope as a single row",
			args: &[],
			version: 1,
		}
	}

	async fn call(&self, _ctx: &Context, scope: &Scope, args: Object) -> RowStream {
		if !args.is_empty() {
			scope.log(format_args!("scope: takes no arguments"));
		}
		let row = Value::Opaque(Opaque::new("scope", scope.clone()));
		RowStream::from_values(vec![row])
	}
}
