use crate::ql::expr::Expr;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// The `WHERE` clause of a statement.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct Cond(pub Arc<Expr>);

impl Deref for Cond {
	type Target = Expr;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Display for Cond {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "WHERE {}", self.0)
	}
}
