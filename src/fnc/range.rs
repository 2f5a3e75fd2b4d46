use crate::ctx::Context;
use crate::exec::{stream, RowStream, Scope};
use crate::fnc::args::{self, ArgKind, ArgSpec};
use crate::fnc::{Plugin, PluginInfo};
use crate::ql::{Object, Value};
use async_trait::async_trait;

/// `range(start, end, step)` — yields `{_value: n}` rows over an inclusive
/// integer range.
pub struct Range;

#[async_trait]
impl Plugin for Range {
	fn info(&self, _scope: &Scope) -> PluginInfo {
		const ARGS: &[ArgSpec] = &[
			ArgSpec::optional("start", ArgKind::Int, "the first value, default 0"),
			ArgSpec::required("end", ArgKind::Int, "the last value, inclusive"),
			ArgSpec::optional("step", ArgKind::Int, "the increment, default 1"),
		];
		PluginInfo {
			name: "range",
			doc: "Yields rows counting over an integer range",
			args: ARGS,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: Object) -> RowStream {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("range: {e}"));
				return RowStream::empty();
			}
		};
		let start = extracted.int("start").unwrap_or(0);
		let end = extracted.int("end").unwrap_or(0);
		let step = extracted.int("step").unwrap_or(1);
		if step <= 0 {
			scope.log(format_args!("range: step must be positive, got {step}"));
			return RowStream::empty();
		}
		let ctx = ctx.clone();
		let scope = scope.clone();
		stream::spawn_source(move |tx| async move {
			let mut n = start;
			while n <= end {
				scope.charge_op().await;
				let row = Value::Object(obj! { "_value" => n });
				if !stream::send(&ctx, &tx, row).await {
					break;
				}
				n += step;
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;

	#[tokio::test]
	async fn range_is_inclusive() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let args = obj! { "start" => 1, "end" => 3 };
		let rows = Range.call(&ctx, &scope, args).await.collect().await;
		assert_eq!(
			rows,
			vec![
				Value::Object(obj! { "_value" => 1 }),
				Value::Object(obj! { "_value" => 2 }),
				Value::Object(obj! { "_value" => 3 }),
			]
		);
	}

	#[tokio::test]
	async fn unexpected_arguments_close_the_stream() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let args = obj! { "end" => 1, "foo" => 2 };
		let rows = Range.call(&ctx, &scope, args).await.collect().await;
		assert!(rows.is_empty());
	}
}
