use serde::{Deserialize, Serialize};
use std::fmt;

/// A binary operator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub enum Operator {
	/// `OR`
	Or,
	/// `AND`
	And,
	/// `=`
	#[default]
	Equal,
	/// `!=` or `<>`
	NotEqual,
	/// `<`
	LessThan,
	/// `<=`
	LessThanOrEqual,
	/// `>`
	MoreThan,
	/// `>=`
	MoreThanOrEqual,
	/// `IN`
	In,
	/// `=~`
	Matches,
	/// `+`
	Add,
	/// `-`
	Sub,
	/// `*`
	Mul,
	/// `/`
	Div,
}

impl Operator {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Or => "OR",
			Self::And => "AND",
			Self::Equal => "=",
			Self::NotEqual => "!=",
			Self::LessThan => "<",
			Self::LessThanOrEqual => "<=",
			Self::MoreThan => ">",
			Self::MoreThanOrEqual => ">=",
			Self::In => "IN",
			Self::Matches => "=~",
			Self::Add => "+",
			Self::Sub => "-",
			Self::Mul => "*",
			Self::Div => "/",
		}
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
