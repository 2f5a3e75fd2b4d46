use crate::ctx::Context;
use crate::exec::{self, RowStream, Scope};
use crate::ql::cond::Cond;
use crate::ql::field::Fields;
use crate::ql::from::FromSource;
use crate::ql::group::Group;
use crate::ql::limit::Limit;
use crate::ql::order::Order;
use crate::ql::pos::Comments;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// A `[EXPLAIN] SELECT ... FROM ... [WHERE] [GROUP BY] [ORDER BY] [LIMIT]`
/// statement.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct SelectStatement {
	pub explain: bool,
	pub expr: Fields,
	pub what: FromSource,
	pub cond: Option<Cond>,
	pub group: Option<Group>,
	pub order: Option<Order>,
	pub limit: Option<Limit>,
	pub comments: Comments,
}

impl SelectStatement {
	/// Evaluate this statement into a cancellable stream of rows.
	pub async fn eval(self: &Arc<Self>, ctx: &Context, scope: &Scope) -> RowStream {
		exec::iterator::run(self.clone(), ctx, scope).await
	}
}

impl Display for SelectStatement {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		if self.explain {
			f.write_str("EXPLAIN ")?;
		}
		write!(f, "SELECT {} FROM {}", self.expr, self.what)?;
		if let Some(ref v) = self.cond {
			write!(f, " {v}")?;
		}
		if let Some(ref v) = self.group {
			write!(f, " {v}")?;
		}
		if let Some(ref v) = self.order {
			write!(f, " {v}")?;
		}
		if let Some(ref v) = self.limit {
			write!(f, " {v}")?;
		}
		Ok(())
	}
}
