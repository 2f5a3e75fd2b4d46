use crate::ql::array::Array;
use crate::ql::datetime::Datetime;
use crate::ql::lazy::LazyExpr;
use crate::ql::number::Number;
use crate::ql::object::Object;
use crate::ql::opaque::Opaque;
use crate::ql::row::LazyRow;
use crate::ql::stored::StoredQuery;
use crate::ql::strand::Strand;
use crate::ql::thunk::Thunk;
use chrono::{DateTime, Utc};
use serde::ser::Serializer;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// The universal value type flowing through the engine.
///
/// Host `nil` or absent references are normalized to [`Value::Null`] at this
/// layer; Null is a real value which compares equal only to Null.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub enum Value {
	// These value types are concrete values which can
	// be returned in rows and serialized to the host.
	#[default]
	Null,
	Bool(bool),
	Number(Number),
	Strand(Strand),
	Datetime(Datetime),
	Array(Array),
	Object(Object),
	Opaque(Opaque),
	// These value types are lazy carriers. They are
	// reduced to one of the concrete types above when
	// a consumer actually touches them.
	Query(StoredQuery),
	Lazy(LazyExpr),
	Row(LazyRow),
	Thunk(Thunk),
}

impl Eq for Value {}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(v), Value::Bool(w)) => v == w,
			(Value::Number(v), Value::Number(w)) => v == w,
			(Value::Strand(v), Value::Strand(w)) => v == w,
			(Value::Datetime(v), Value::Datetime(w)) => v == w,
			(Value::Array(v), Value::Array(w)) => v == w,
			(Value::Object(v), Value::Object(w)) => v == w,
			(Value::Opaque(v), Value::Opaque(w)) => v.same(w),
			(Value::Query(v), Value::Query(w)) => v.same(w),
			(Value::Lazy(v), Value::Lazy(w)) => v.same(w),
			(Value::Row(v), Value::Row(w)) => v.same(w),
			(Value::Thunk(v), Value::Thunk(w)) => v.same(w),
			_ => false,
		}
	}
}

impl From<bool> for Value {
	#[inline]
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<Number> for Value {
	fn from(v: Number) -> Self {
		Value::Number(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Number(Number::from(v))
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Number(Number::from(v))
	}
}

impl From<usize> for Value {
	fn from(v: usize) -> Self {
		Value::Number(Number::from(v))
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Number(Number::from(v))
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Self::Strand(Strand::from(v))
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Self::Strand(Strand::from(v))
	}
}

impl From<Strand> for Value {
	fn from(v: Strand) -> Self {
		Value::Strand(v)
	}
}

impl From<Datetime> for Value {
	fn from(v: Datetime) -> Self {
		Value::Datetime(v)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(v: DateTime<Utc>) -> Self {
		Value::Datetime(Datetime::from(v))
	}
}

impl From<Array> for Value {
	fn from(v: Array) -> Self {
		Value::Array(v)
	}
}

impl From<Vec<Value>> for Value {
	fn from(v: Vec<Value>) -> Self {
		Value::Array(Array(v))
	}
}

impl From<Object> for Value {
	fn from(v: Object) -> Self {
		Value::Object(v)
	}
}

impl From<Opaque> for Value {
	fn from(v: Opaque) -> Self {
		Value::Opaque(v)
	}
}

impl From<StoredQuery> for Value {
	fn from(v: StoredQuery) -> Self {
		Value::Query(v)
	}
}

impl From<LazyExpr> for Value {
	fn from(v: LazyExpr) -> Self {
		Value::Lazy(v)
	}
}

impl From<LazyRow> for Value {
	fn from(v: LazyRow) -> Self {
		Value::Row(v)
	}
}

impl From<Thunk> for Value {
	fn from(v: Thunk) -> Self {
		Value::Thunk(v)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		match v {
			Some(v) => v.into(),
			None => Value::Null,
		}
	}
}

impl Value {
	/// Check if this Value is Null
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Check if this Value is a boolean
	pub fn is_bool(&self) -> bool {
		matches!(self, Value::Bool(_))
	}

	/// Check if this Value is a number
	pub fn is_number(&self) -> bool {
		matches!(self, Value::Number(_))
	}

	/// Check if this Value is a string
	pub fn is_strand(&self) -> bool {
		matches!(self, Value::Strand(_))
	}

	/// Check if this Value is a datetime
	pub fn is_datetime(&self) -> bool {
		matches!(self, Value::Datetime(_))
	}

	/// Check if this Value is an array
	pub fn is_array(&self) -> bool {
		matches!(self, Value::Array(_))
	}

	/// Check if this Value is an object
	pub fn is_object(&self) -> bool {
		matches!(self, Value::Object(_))
	}

	/// Check if this Value is a stored query
	pub fn is_query(&self) -> bool {
		matches!(self, Value::Query(_))
	}

	/// Check if this Value is still a lazy carrier
	pub fn is_lazy(&self) -> bool {
		matches!(self, Value::Lazy(_) | Value::Thunk(_))
	}

	/// The name of this value's kind, for diagnostics
	pub fn kind(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Number(Number::Int(_)) => "int",
			Value::Number(Number::Float(_)) => "float",
			Value::Strand(_) => "string",
			Value::Datetime(_) => "datetime",
			Value::Array(_) => "array",
			Value::Object(_) => "object",
			Value::Opaque(_) => "opaque",
			Value::Query(_) => "query",
			Value::Lazy(_) => "lazy",
			Value::Row(_) => "row",
			Value::Thunk(_) => "thunk",
		}
	}

	/// Convert this value into a plain display string without quoting
	pub fn as_raw_string(&self) -> String {
		match self {
			Value::Strand(v) => v.0.clone(),
			v => v.to_string(),
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Value::Null => write!(f, "NULL"),
			Value::Bool(true) => write!(f, "TRUE"),
			Value::Bool(false) => write!(f, "FALSE"),
			Value::Number(v) => write!(f, "{v}"),
			Value::Strand(v) => write!(f, "{v}"),
			Value::Datetime(v) => write!(f, "{v}"),
			Value::Array(v) => write!(f, "{v}"),
			Value::Object(v) => write!(f, "{v}"),
			Value::Opaque(v) => write!(f, "{v}"),
			Value::Query(v) => write!(f, "{v}"),
			Value::Lazy(v) => write!(f, "{v}"),
			Value::Row(v) => write!(f, "{v}"),
			Value::Thunk(v) => write!(f, "{v}"),
		}
	}
}

impl Serialize for Value {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			Value::Null => serializer.serialize_none(),
			Value::Bool(v) => serializer.serialize_bool(*v),
			Value::Number(Number::Int(v)) => serializer.serialize_i64(*v),
			Value::Number(Number::Float(v)) => serializer.serialize_f64(*v),
			Value::Strand(v) => serializer.serialize_str(v.as_str()),
			Value::Datetime(v) => v.serialize(serializer),
			Value::Array(v) => v.serialize(serializer),
			Value::Object(v) => v.serialize(serializer),
			// Lazy carriers and host values have no concrete form yet.
			// Materialize before serializing to observe their contents.
			_ => serializer.serialize_none(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn null_equals_only_null() {
		assert_eq!(Value::Null, Value::Null);
		assert_ne!(Value::Null, Value::from(0));
		assert_ne!(Value::Null, Value::from(""));
		assert_ne!(Value::Null, Value::Bool(false));
	}

	#[test]
	fn value_equals_itself() {
		for v in [
			Value::Null,
			Value::Bool(true),
			Value::from(42),
			Value::from(1.5),
			Value::from("text"),
			Value::from(Array::from(vec![1i64, 2])),
			Value::from(obj! { "a" => 1 }),
		] {
			assert_eq!(v, v.clone());
		}
	}

	#[test]
	fn serializes_null_as_json_null() {
		assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
		assert_eq!(serde_json::to_string(&Value::from(1)).unwrap(), "1");
		assert_eq!(
			serde_json::to_string(&Value::from(obj! { "a" => 1 })).unwrap(),
			r#"{"a":1}"#
		);
	}
}
