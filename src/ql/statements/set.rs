use crate::ctx::Context;
use crate::exec::Scope;
use crate::ql::expr::Expr;
use crate::ql::fmt::Fmt;
use crate::ql::ident::Ident;
use crate::ql::lazy::LazyExpr;
use crate::ql::pos::Comments;
use crate::ql::statements::select::SelectStatement;
use crate::ql::stored::StoredQuery;
use crate::ql::value::Value;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// A `LET name [(params)] (= | <=) ...` statement binding a name on the
/// current scope.
///
/// `=` binds lazily: an expression becomes a memoized lazy expression and a
/// `SELECT` becomes a stored query. `<=` forces evaluation up front,
/// materializing a `SELECT` through the scope's materializer.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct LetStatement {
	pub name: Ident,
	pub params: Option<Vec<Ident>>,
	pub materialize: bool,
	pub what: LetExpr,
	pub comments: Comments,
}

/// The right-hand side of a `LET` statement.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum LetExpr {
	Expr(Arc<Expr>),
	Select(Arc<SelectStatement>),
}

impl LetStatement {
	/// Evaluate this statement, appending the binding to the scope.
	pub async fn eval(&self, ctx: &Context, scope: &Scope) {
		let value = match &self.what {
			LetExpr::Select(stmt) => {
				let query = match &self.params {
					Some(params) => StoredQuery::select_with_params(
						params.clone(),
						stmt.clone(),
						scope.clone(),
					),
					None => StoredQuery::select(stmt.clone(), scope.clone()),
				};
				if self.materialize {
					let rows = query.eval(ctx, scope).await;
					Value::Query(
						scope.materializer().materialize(ctx, scope, rows).await,
					)
				} else {
					Value::Query(query)
				}
			}
			LetExpr::Expr(expr) => {
				let lazy = LazyExpr::new(expr.clone(), scope.clone());
				if self.materialize {
					lazy.reduce(ctx).await
				} else {
					Value::Lazy(lazy)
				}
			}
		};
		let value = match value {
			// A subquery binding is itself a stored query
			Value::Lazy(ref lazy) => {
				if let Expr::Subquery(stmt) = lazy.expr().as_ref() {
					Value::Query(StoredQuery::select(stmt.clone(), scope.clone()))
				} else {
					value
				}
			}
			value => value,
		};
		scope.append_vars(obj! { self.name.as_str() => value });
	}
}

impl Display for LetStatement {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "LET {}", self.name)?;
		if let Some(params) = &self.params {
			write!(f, "({})", Fmt::comma_separated(params.iter()))?;
		}
		match self.materialize {
			true => f.write_str(" <= ")?,
			false => f.write_str(" = ")?,
		}
		match &self.what {
			LetExpr::Expr(v) => Display::fmt(v, f),
			LetExpr::Select(v) => Display::fmt(v, f),
		}
	}
}
