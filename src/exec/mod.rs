//! The evaluation engine: scope tree, row streaming and the SELECT
//! pipeline.

pub(crate) mod aggregator;
pub(crate) mod explain;
pub(crate) mod group;
pub(crate) mod iterator;
pub(crate) mod scope;
pub(crate) mod sort;
pub(crate) mod stats;
pub(crate) mod stream;
pub(crate) mod throttle;

pub use aggregator::AggregatorCtx;
pub use explain::Explainer;
pub use group::{GroupActor, Grouper};
pub use scope::{Destructor, LogSink, Scope};
pub use sort::Sorter;
pub use stats::Stats;
pub use stream::RowStream;
pub use throttle::Throttle;

use crate::ctx::Context;
use crate::ql::{Object, Value};

/// Force a row-shaped value into an eager insertion-ordered object.
///
/// This is the materialization boundary: lazy rows have all their getters
/// invoked (at most once each) in column order; scalars wrap as
/// `{_value: v}`.
pub async fn row_to_object(ctx: &Context, scope: &Scope, row: &Value) -> Object {
	let row = crate::protocol::delazify(ctx, row.clone()).await;
	match row {
		Value::Object(obj) => obj,
		Value::Row(lazy) => lazy.materialize(ctx).await,
		Value::Opaque(ref op) if op.downcast_ref::<Scope>().is_some() => {
			// A scope row has no enumerable columns of its own
			scope.tracev(format_args!("Materializing a scope row yields no columns"));
			Object::new()
		}
		v => obj! { "_value" => v },
	}
}
