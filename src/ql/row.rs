use crate::ctx::Context;
use crate::ql::lazy::LazyExpr;
use crate::ql::object::Object;
use crate::ql::value::Value;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// A column getter inside a lazy row.
#[derive(Clone, Debug)]
pub(crate) enum Getter {
	/// A value copied from the input row
	Value(Value),
	/// A memoized expression over the captured row scope
	Expr(LazyExpr),
}

/// An ordered list of named column getters sharing a captured evaluation
/// context.
///
/// Each getter runs at most once; its result is cached by the underlying
/// [`LazyExpr`]. Materializing forces all getters in column order and
/// copies the results into an [`Object`], which is the boundary between
/// lazy and eager values.
#[derive(Clone)]
pub struct LazyRow(Arc<RowInner>);

struct RowInner {
	columns: Vec<(String, Getter)>,
}

impl LazyRow {
	pub(crate) fn new(columns: Vec<(String, Getter)>) -> Self {
		Self(Arc::new(RowInner {
			columns,
		}))
	}

	/// The column names, in projection order
	pub fn columns(&self) -> Vec<String> {
		self.0.columns.iter().map(|(name, _)| name.clone()).collect()
	}

	/// The raw getter for a named column, shared for `*` projections so that
	/// memoization carries across rows derived from this one
	pub(crate) fn getter(&self, name: &str) -> Option<Getter> {
		self.0.columns.iter().find(|(n, _)| n == name).map(|(_, g)| g.clone())
	}

	/// Invoke (or recall) the getter for a named column
	pub async fn get(&self, ctx: &Context, name: &str) -> Option<Value> {
		let (_, getter) = self.0.columns.iter().find(|(n, _)| n == name)?;
		Some(match getter {
			Getter::Value(v) => v.clone(),
			Getter::Expr(e) => e.reduce(ctx).await,
		})
	}

	/// Force all getters in column order into an eager object
	pub async fn materialize(&self, ctx: &Context) -> Object {
		let mut obj = Object::new();
		for (name, getter) in &self.0.columns {
			let v = match getter {
				Getter::Value(v) => v.clone(),
				Getter::Expr(e) => e.reduce(ctx).await,
			};
			obj.insert(name.clone(), v);
		}
		obj
	}

	/// Check whether two rows share the same state
	pub fn same(&self, other: &LazyRow) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

/// Append a column to a lazy-row build, replacing an earlier column of the
/// same name in place. Later aliases shadow earlier `*` copies.
pub(crate) fn push_column(columns: &mut Vec<(String, Getter)>, name: String, getter: Getter) {
	match columns.iter_mut().find(|(n, _)| *n == name) {
		Some((_, g)) => *g = getter,
		None => columns.push((name, getter)),
	}
}

impl Debug for LazyRow {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.debug_struct("LazyRow").field("columns", &self.columns()).finish()
	}
}

impl Display for LazyRow {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "<row: {}>", self.columns().join(", "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;
	use crate::exec::Scope;
	use crate::ql::expr::Expr;
	use crate::ql::Ident;

	#[tokio::test]
	async fn getters_are_invoked_at_most_once() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		scope.append_vars(obj! { "n" => 1 });
		let getter = LazyExpr::new(Arc::new(Expr::Symbol(Ident::from("n"))), scope.clone());
		let mut columns = Vec::new();
		push_column(&mut columns, "a".to_string(), Getter::Expr(getter));
		let row = LazyRow::new(columns);
		assert_eq!(row.get(&ctx, "a").await, Some(Value::from(1)));
		// A shadowing frame appended later must not re-run the getter
		scope.append_vars(obj! { "n" => 99 });
		assert_eq!(row.get(&ctx, "a").await, Some(Value::from(1)));
		assert_eq!(row.materialize(&ctx).await, obj! { "a" => 1 });
	}

	#[tokio::test]
	async fn later_columns_shadow_earlier_ones_in_place() {
		let mut columns = Vec::new();
		push_column(&mut columns, "a".to_string(), Getter::Value(Value::from(1)));
		push_column(&mut columns, "b".to_string(), Getter::Value(Value::from(2)));
		push_column(&mut columns, "a".to_string(), Getter::Value(Value::from(10)));
		let row = LazyRow::new(columns);
		let ctx = MutableContext::background().freeze();
		assert_eq!(row.columns(), ["a", "b"]);
		assert_eq!(row.get(&ctx, "a").await, Some(Value::from(10)));
	}
}
