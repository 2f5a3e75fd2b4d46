use crate::ql::fmt::Fmt;
use crate::ql::value::Value;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;
use std::ops::DerefMut;

/// An ordered sequence of values.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Array(pub Vec<Value>);

impl From<Vec<Value>> for Array {
	fn from(v: Vec<Value>) -> Self {
		Self(v)
	}
}

impl From<Value> for Array {
	fn from(v: Value) -> Self {
		Self(vec![v])
	}
}

impl From<Vec<i64>> for Array {
	fn from(v: Vec<i64>) -> Self {
		Self(v.into_iter().map(Value::from).collect())
	}
}

impl From<Vec<&str>> for Array {
	fn from(v: Vec<&str>) -> Self {
		Self(v.into_iter().map(Value::from).collect())
	}
}

impl From<Array> for Vec<Value> {
	fn from(s: Array) -> Self {
		s.0
	}
}

impl FromIterator<Value> for Array {
	fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
		Array(iter.into_iter().collect())
	}
}

impl Deref for Array {
	type Target = Vec<Value>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Array {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl IntoIterator for Array {
	type Item = Value;
	type IntoIter = std::vec::IntoIter<Self::Item>;
	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl Array {
	/// Create a new empty array
	pub fn new() -> Self {
		Self::default()
	}
	/// Create a new array with capacity
	pub fn with_capacity(len: usize) -> Self {
		Self(Vec::with_capacity(len))
	}
	/// Concatenate this array with another, consuming both
	pub fn concat(mut self, mut other: Array) -> Array {
		self.0.append(&mut other.0);
		self
	}
	/// Append a single value to the end
	pub fn with_push(mut self, v: Value) -> Array {
		self.0.push(v);
		self
	}
	/// Prepend a single value to the front
	pub fn with_prepend(mut self, v: Value) -> Array {
		self.0.insert(0, v);
		self
	}
}

impl Display for Array {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str("[")?;
		Display::fmt(&Fmt::comma_separated(self.0.iter()), f)?;
		f.write_str("]")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn concat_preserves_order() {
		let a = Array::from(vec![1i64, 2, 3]);
		let b = Array::from(vec![4i64, 5]);
		assert_eq!(a.concat(b), Array::from(vec![1i64, 2, 3, 4, 5]));
	}

	#[test]
	fn display_is_bracketed() {
		assert_eq!(Array::from(vec![1i64, 2]).to_string(), "[1, 2]");
	}
}
