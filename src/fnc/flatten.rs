use crate::ctx::Context;
use crate::exec::{stream, RowStream, Scope};
use crate::fnc::args::{self, ArgKind, ArgSpec};
use crate::fnc::{Plugin, PluginInfo};
use crate::ql::{Object, Value};
use crate::protocol;
use async_trait::async_trait;

/// `flatten(query)` — expands sequence-valued columns.
///
/// For each input row, the columns holding non-empty sequences are
/// expanded into their Cartesian product, with the remaining columns
/// replicated onto every produced row. A column holding an empty sequence
/// stays empty rather than eliminating the row.
pub struct Flatten;

const ARGS: &[ArgSpec] =
	&[ArgSpec::required("query", ArgKind::Lazy, "the rows to flatten")];

#[async_trait]
impl Plugin for Flatten {
	fn info(&self, _scope: &Scope) -> PluginInfo {
		PluginInfo {
			name: "flatten",
			doc: "Expands sequence-valued columns into one row per combination",
			args: ARGS,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: Object) -> RowStream {
		let extracted = match args::extract(ctx, scope, ARGS, &args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("flatten: {e}"));
				return RowStream::empty();
			}
		};
		let source = extracted.get("query").cloned().unwrap_or_default();
		let source = protocol::delazify(ctx, source).await;
		let ctx = ctx.clone();
		let scope = scope.clone();
		stream::spawn_source(move |tx| async move {
			let mut input = protocol::iterate(&ctx, &scope, source).await;
			while let Some(row) = input.next().await {
				if ctx.is_done() {
					break;
				}
				let obj = crate::exec::row_to_object(&ctx, &scope, &row).await;
				for out in flatten_row(&obj) {
					if !stream::send(&ctx, &tx, Value::Object(out)).await {
						return;
					}
				}
			}
		})
	}
}

// Produce the Cartesian product of the non-empty sequence columns.
fn flatten_row(obj: &Object) -> Vec<Object> {
	let expandable: Vec<&String> = obj
		.iter()
		.filter_map(|(k, v)| match v {
			Value::Array(items) if !items.is_empty() => Some(k),
			_ => None,
		})
		.collect();
	if expandable.is_empty() {
		return vec![obj.clone()];
	}
	let mut out = vec![Object::new()];
	for (k, v) in obj.iter() {
		match v {
			Value::Array(items) if expandable.contains(&k) => {
				let mut next = Vec::with_capacity(out.len() * items.len());
				for base in &out {
					for item in items.iter() {
						let mut row = base.clone();
						row.insert(k.clone(), item.clone());
						next.push(row);
					}
				}
				out = next;
			}
			v => {
				for row in &mut out {
					row.insert(k.clone(), v.clone());
				}
			}
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ql::Array;

	#[test]
	fn cartesian_product_of_sequence_columns() {
		let obj = obj! {
			"id" => 7,
			"xs" => Value::Array(Array::from(vec![1i64, 2])),
			"ys" => Value::Array(Array::from(vec!["a", "b"])),
		};
		let rows = flatten_row(&obj);
		assert_eq!(rows.len(), 4);
		assert_eq!(rows[0], obj! { "id" => 7, "xs" => 1, "ys" => "a" });
		assert_eq!(rows[3], obj! { "id" => 7, "xs" => 2, "ys" => "b" });
	}

	#[test]
	fn empty_sequences_keep_the_row() {
		let obj = obj! { "id" => 7, "xs" => Value::Array(Array::new()) };
		let rows = flatten_row(&obj);
		assert_eq!(rows, vec![obj! { "id" => 7, "xs" => Value::Array(Array::new()) }]);
	}
}
