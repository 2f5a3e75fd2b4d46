use crate::ctx::Context;
use crate::exec::{stream, RowStream, Scope};
use crate::fnc::args::{self, ArgKind, ArgSpec};
use crate::fnc::{Plugin, PluginInfo};
use crate::ql::{Object, Value};
use async_trait::async_trait;
use std::time::Duration;

/// `sleep(time)` — waits, then yields a single row.
///
/// The wait honours cancellation: a cancelled context wakes the sleep and
/// closes the stream without emitting.
pub struct Sleep;

const ARGS: &[ArgSpec] =
	&[ArgSpec::required("time", ArgKind::Float, "how long to sleep, in seconds")];

#[async_trait]
impl Plugin for Sleep {
	fn info(&self, _scope: &Scope) -> PluginInfo {
		PluginInfo {
			name: "sleep",
			doc: "Sleeps for a number of seconds, then yields one row",
			args: ARGS,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: Object) -> RowStream {
		let extracted = match args::extract(ctx, scope, ARGS, &args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("sleep: {e}"));
				return RowStream::empty();
			}
		};
		let secs = extracted.float("time").unwrap_or(0.0).max(0.0);
		let ctx = ctx.clone();
		stream::spawn_source(move |tx| async move {
			tokio::select! {
				_ = tokio::time::sleep(Duration::from_secs_f64(secs)) => {
					let row = Value::Object(obj! { "_value" => true });
					stream::send(&ctx, &tx, row).await;
				}
				_ = stream::wait_done(&ctx) => {}
			}
		})
	}
}
