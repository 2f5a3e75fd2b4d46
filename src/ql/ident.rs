use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

/// An identifier: a symbol, column alias, argument or plugin name.
///
/// Identifiers which are not plain (letters, digits and underscores, not
/// starting with a digit) are written back surrounded by backticks.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Ident(pub String);

impl From<String> for Ident {
	fn from(v: String) -> Self {
		Self(v)
	}
}

impl From<&str> for Ident {
	fn from(v: &str) -> Self {
		Self(v.to_string())
	}
}

impl Deref for Ident {
	type Target = String;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Ident {
	/// Get the name as a string slice
	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}

	fn is_plain(&self) -> bool {
		!self.0.is_empty()
			&& !self.0.starts_with(|c: char| c.is_ascii_digit())
			&& self.0.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
	}
}

impl Display for Ident {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		if self.is_plain() {
			f.write_str(&self.0)
		} else {
			write!(f, "`{}`", self.0)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_quotes_when_needed() {
		assert_eq!(Ident::from("name").to_string(), "name");
		assert_eq!(Ident::from("with space").to_string(), "`with space`");
		assert_eq!(Ident::from("1st").to_string(), "`1st`");
	}
}
