use std::fmt::{self, Display, Formatter};

/// The `LIMIT` clause of a statement.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct Limit(pub u64);

impl Display for Limit {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "LIMIT {}", self.0)
	}
}
