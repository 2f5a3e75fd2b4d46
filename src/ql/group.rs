use crate::ql::expr::Expr;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// The `GROUP BY` clause of a statement.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct Group(pub Arc<Expr>);

impl Deref for Group {
	type Target = Expr;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Display for Group {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "GROUP BY {}", self.0)
	}
}
