use crate::ql::expr::Expr;
use crate::ql::ident::Ident;
use std::fmt::{self, Display, Formatter};

/// A single member-access step applied to an expression.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Part {
	/// `.name`
	Field(Ident),
	/// `[expr]`
	Index(Box<Expr>),
	/// `[start:end]`, either bound optional
	Slice {
		start: Option<Box<Expr>>,
		end: Option<Box<Expr>>,
	},
}

impl Display for Part {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Part::Field(v) => write!(f, ".{v}"),
			Part::Index(v) => write!(f, "[{v}]"),
			Part::Slice {
				start,
				end,
			} => {
				f.write_str("[")?;
				if let Some(v) = start {
					Display::fmt(v, f)?;
				}
				f.write_str(":")?;
				if let Some(v) = end {
					Display::fmt(v, f)?;
				}
				f.write_str("]")
			}
		}
	}
}
