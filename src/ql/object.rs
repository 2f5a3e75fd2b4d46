use crate::ql::fmt::Fmt;
use crate::ql::value::Value;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt::{self, Display, Formatter};

/// An insertion-ordered mapping from string keys to values.
///
/// Iteration always happens in insertion order, because projections must
/// preserve the user-specified column order. Two optional behaviours can be
/// enabled per instance:
///
/// - a *default value*, returned when a missing key is read (the presence
///   flag stays `false`, so callers can still distinguish "absent, use the
///   default" from "present");
/// - *case-insensitive lookup*: a miss is retried with a case-folded key.
///   Only lookup is affected, never iteration order.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct Object {
	map: IndexMap<String, Value>,
	default: Option<Box<Value>>,
	case_insensitive: bool,
}

impl PartialEq for Object {
	fn eq(&self, other: &Self) -> bool {
		self.map == other.map
	}
}

impl From<IndexMap<String, Value>> for Object {
	fn from(map: IndexMap<String, Value>) -> Self {
		Self {
			map,
			default: None,
			case_insensitive: false,
		}
	}
}

impl FromIterator<(String, Value)> for Object {
	fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
		Self::from(iter.into_iter().collect::<IndexMap<String, Value>>())
	}
}

impl IntoIterator for Object {
	type Item = (String, Value);
	type IntoIter = indexmap::map::IntoIter<String, Value>;
	fn into_iter(self) -> Self::IntoIter {
		self.map.into_iter()
	}
}

impl Object {
	/// Create a new empty object
	pub fn new() -> Self {
		Self::default()
	}

	/// Enable case-insensitive lookups on this object
	pub fn with_case_insensitive(mut self) -> Self {
		self.case_insensitive = true;
		self
	}

	/// Set the value returned when a missing key is read
	pub fn with_default(mut self, default: Value) -> Self {
		self.default = Some(Box::new(default));
		self
	}

	/// The default value configured on this object, if any
	pub fn default_value(&self) -> Option<&Value> {
		self.default.as_deref()
	}

	/// The number of entries in the object
	pub fn len(&self) -> usize {
		self.map.len()
	}

	/// Check whether the object has no entries
	pub fn is_empty(&self) -> bool {
		self.map.is_empty()
	}

	/// Insert a value, appending the key if it was not yet present
	pub fn insert(&mut self, key: String, value: Value) {
		self.map.insert(key, value);
	}

	/// Check whether a key is present, honouring case-insensitive mode
	pub fn contains_key(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	/// Look up a key, honouring case-insensitive mode but not the default
	pub fn get(&self, key: &str) -> Option<&Value> {
		match self.map.get(key) {
			Some(v) => Some(v),
			None if self.case_insensitive => self
				.map
				.iter()
				.find(|(k, _)| k.eq_ignore_ascii_case(key))
				.map(|(_, v)| v),
			None => None,
		}
	}

	/// Look up a key, returning the value and a presence flag.
	///
	/// A missing key with a configured default returns `(default, false)`.
	pub fn resolve(&self, key: &str) -> (Value, bool) {
		match self.get(key) {
			Some(v) => (v.clone(), true),
			None => match &self.default {
				Some(d) => ((**d).clone(), false),
				None => (Value::Null, false),
			},
		}
	}

	/// Merge the entries of another object into this one, in its order
	pub fn merge(&mut self, other: Object) {
		for (k, v) in other {
			self.insert(k, v);
		}
	}

	/// Iterate over the entries in insertion order
	pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
		self.map.iter()
	}

	/// Iterate over the keys in insertion order
	pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
		self.map.keys()
	}

	/// Iterate over the values in insertion order
	pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
		self.map.values()
	}
}

impl Serialize for Object {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut s = serializer.serialize_map(Some(self.map.len()))?;
		for (k, v) in &self.map {
			s.serialize_entry(k, v)?;
		}
		s.end()
	}
}

impl Display for Object {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.write_str("{")?;
		if !self.is_empty() {
			write!(
				f,
				"{}",
				Fmt::comma_separated(
					self.map.iter().map(|args| Fmt::new(args, |(k, v), f| write!(f, "{k}: {v}"))),
				)
			)?;
		}
		f.write_str("}")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn iteration_follows_insertion_order() {
		let mut obj = Object::new();
		obj.insert("zulu".to_string(), Value::from(1));
		obj.insert("alpha".to_string(), Value::from(2));
		obj.insert("mike".to_string(), Value::from(3));
		let keys: Vec<&String> = obj.keys().collect();
		assert_eq!(keys, ["zulu", "alpha", "mike"]);
	}

	#[test]
	fn default_value_does_not_mark_presence() {
		let mut obj = Object::new().with_default(Value::from(42));
		obj.insert("here".to_string(), Value::from(1));
		assert_eq!(obj.resolve("here"), (Value::from(1), true));
		assert_eq!(obj.resolve("missing"), (Value::from(42), false));
	}

	#[test]
	fn missing_key_without_default_is_null() {
		let obj = Object::new();
		assert_eq!(obj.resolve("missing"), (Value::Null, false));
	}

	#[test]
	fn case_insensitive_affects_lookup_only() {
		let mut obj = Object::new().with_case_insensitive();
		obj.insert("Foo".to_string(), Value::from(1));
		assert_eq!(obj.get("foo"), Some(&Value::from(1)));
		assert_eq!(obj.get("FOO"), Some(&Value::from(1)));
		let keys: Vec<&String> = obj.keys().collect();
		assert_eq!(keys, ["Foo"]);
	}

	#[test]
	fn merge_appends_in_other_order() {
		let mut a = obj! { "x" => 1, "y" => 2 };
		a.merge(obj! { "y" => 3, "z" => 4 });
		assert_eq!(a.resolve("y"), (Value::from(3), true));
		let keys: Vec<&String> = a.keys().collect();
		assert_eq!(keys, ["x", "y", "z"]);
	}
}
