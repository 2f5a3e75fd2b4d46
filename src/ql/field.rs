use crate::ql::expr::Expr;
use crate::ql::fmt::Fmt;
use crate::ql::ident::Ident;
use crate::ql::pos::Comments;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// The select list of a statement.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct Fields(pub Vec<Field>);

impl Deref for Fields {
	type Target = Vec<Field>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Fields {
	/// Check if the select list contains a `*` field
	pub fn has_all(&self) -> bool {
		self.0.iter().any(|f| matches!(f, Field::All))
	}

	/// Iterate over the non-`*` fields
	pub fn other(&self) -> impl Iterator<Item = &Field> {
		self.0.iter().filter(|f| !matches!(f, Field::All))
	}
}

impl Display for Fields {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(&Fmt::comma_separated(&self.0), f)
	}
}

/// A single select-list entry.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Field {
	/// The `*` projection
	All,
	/// An expression column, optionally aliased with `AS`
	Single {
		expr: Arc<Expr>,
		alias: Option<Ident>,
		comments: Comments,
	},
}

impl Field {
	/// The name of the column this field produces
	pub fn column_name(&self) -> String {
		match self {
			Field::All => "*".to_string(),
			Field::Single {
				expr,
				alias,
				..
			} => match alias {
				Some(alias) => alias.0.clone(),
				None => expr.to_string(),
			},
		}
	}
}

impl Display for Field {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Self::All => f.write_str("*"),
			Self::Single {
				expr,
				alias,
				..
			} => {
				Display::fmt(expr, f)?;
				if let Some(alias) = alias {
					write!(f, " AS {alias}")?;
				}
				Ok(())
			}
		}
	}
}
