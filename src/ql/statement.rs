use crate::ctx::Context;
use crate::exec::{RowStream, Scope};
use crate::ql::statements::select::SelectStatement;
use crate::ql::statements::set::LetStatement;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// A single parsed QL statement.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Statement {
	Let(LetStatement),
	Select(Arc<SelectStatement>),
}

impl Statement {
	/// Evaluate this statement against a scope.
	///
	/// A `LET` statement appends its binding and yields no rows; a `SELECT`
	/// statement yields its row stream.
	pub async fn eval(&self, ctx: &Context, scope: &Scope) -> RowStream {
		match self {
			Statement::Let(stmt) => {
				stmt.eval(ctx, scope).await;
				RowStream::empty()
			}
			Statement::Select(stmt) => stmt.eval(ctx, scope).await,
		}
	}
}

impl Display for Statement {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Statement::Let(v) => Display::fmt(v, f),
			Statement::Select(v) => Display::fmt(v, f),
		}
	}
}
