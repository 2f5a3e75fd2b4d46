use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::ops::{self, Deref};

/// A string value.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize, Hash)]
#[non_exhaustive]
pub struct Strand(pub String);

impl From<String> for Strand {
	fn from(s: String) -> Self {
		Strand(s)
	}
}

impl From<&str> for Strand {
	fn from(s: &str) -> Self {
		Self::from(String::from(s))
	}
}

impl From<Strand> for String {
	fn from(s: Strand) -> Self {
		s.0
	}
}

impl Deref for Strand {
	type Target = String;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl Strand {
	/// Get the string slice
	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}
	/// Convert the Strand into a String
	pub fn to_raw(self) -> String {
		self.0
	}
}

impl Display for Strand {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str("'")?;
		for c in self.0.chars() {
			match c {
				'\'' => f.write_str("\\'")?,
				'\\' => f.write_str("\\\\")?,
				'\n' => f.write_str("\\n")?,
				'\r' => f.write_str("\\r")?,
				'\t' => f.write_str("\\t")?,
				c => fmt::Write::write_char(f, c)?,
			}
		}
		f.write_str("'")
	}
}

impl ops::Add for Strand {
	type Output = Self;
	fn add(mut self, other: Self) -> Self {
		self.0.push_str(other.as_str());
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_escapes_quotes() {
		assert_eq!(Strand::from("a'b").to_string(), r"'a\'b'");
		assert_eq!(Strand::from("-").to_string(), "'-'");
	}
}
