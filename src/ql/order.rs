use crate::ql::ident::Ident;
use std::fmt::{self, Display, Formatter};

/// The `ORDER BY` clause of a statement.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct Order {
	/// The column to order the emitted rows by
	pub name: Ident,
	/// Whether the ordering is reversed
	pub desc: bool,
}

impl Display for Order {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "ORDER BY {}", self.name)?;
		if self.desc {
			f.write_str(" DESC")?;
		}
		Ok(())
	}
}
