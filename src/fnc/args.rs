use crate::ctx::Context;
use crate::err::Error;
use crate::exec::Scope;
use crate::ql::{Number, Object, StoredQuery, Value};
use crate::protocol;
use indexmap::IndexMap;

/// The declared kind of a plugin or function argument.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ArgKind {
	/// Any reduced value
	Any,
	/// A boolean, by truthiness
	Bool,
	/// A 64-bit integer
	Int,
	/// A 64-bit float
	Float,
	/// A string
	Strand,
	/// A sequence
	Array,
	/// A mapping
	Object,
	/// A stored query, passed through unevaluated
	Query,
	/// The raw argument without reduction, for lazy parameters
	Lazy,
}

impl ArgKind {
	fn name(&self) -> &'static str {
		match self {
			ArgKind::Any => "any",
			ArgKind::Bool => "bool",
			ArgKind::Int => "int",
			ArgKind::Float => "float",
			ArgKind::Strand => "string",
			ArgKind::Array => "array",
			ArgKind::Object => "object",
			ArgKind::Query => "query",
			ArgKind::Lazy => "lazy",
		}
	}
}

/// One declared argument of a plugin or function.
#[derive(Clone, Copy, Debug)]
pub struct ArgSpec {
	pub name: &'static str,
	pub required: bool,
	pub doc: &'static str,
	pub kind: ArgKind,
}

impl ArgSpec {
	pub const fn required(name: &'static str, kind: ArgKind, doc: &'static str) -> Self {
		Self {
			name,
			required: true,
			doc,
			kind,
		}
	}

	pub const fn optional(name: &'static str, kind: ArgKind, doc: &'static str) -> Self {
		Self {
			name,
			required: false,
			doc,
			kind,
		}
	}
}

/// The reduced, validated arguments of one call.
#[derive(Debug, Default)]
pub struct ExtractedArgs {
	values: IndexMap<&'static str, Value>,
}

impl ExtractedArgs {
	/// The value of a named argument, if supplied
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.values.get(name)
	}

	/// A named integer argument
	pub fn int(&self, name: &str) -> Option<i64> {
		match self.values.get(name) {
			Some(Value::Number(n)) => Some(n.as_int()),
			_ => None,
		}
	}

	/// A named float argument
	pub fn float(&self, name: &str) -> Option<f64> {
		match self.values.get(name) {
			Some(Value::Number(n)) => Some(n.as_float()),
			_ => None,
		}
	}

	/// A named string argument
	pub fn strand(&self, name: &str) -> Option<String> {
		match self.values.get(name) {
			Some(Value::Strand(s)) => Some(s.0.clone()),
			_ => None,
		}
	}

	/// A named stored-query argument
	pub fn query(&self, name: &str) -> Option<StoredQuery> {
		match self.values.get(name) {
			Some(Value::Query(q)) => Some(q.clone()),
			_ => None,
		}
	}
}

/// Map a call-time argument object onto a declared parameter record.
///
/// Each supplied argument is reduced (unless declared `Lazy` or `Query`)
/// and checked against its declared kind. The first problem is reported:
/// an unknown argument name, a missing required argument, or a wrong kind.
pub async fn extract(
	ctx: &Context,
	scope: &Scope,
	specs: &[ArgSpec],
	args: &Object,
) -> Result<ExtractedArgs, Error> {
	// Unknown argument names are refused
	for (name, _) in args.iter() {
		if !specs.iter().any(|s| s.name == name) {
			return Err(Error::UnexpectedArgument {
				name: name.clone(),
			});
		}
	}
	let mut out = ExtractedArgs::default();
	for spec in specs {
		let supplied = args.get(spec.name);
		let Some(value) = supplied else {
			if spec.required {
				return Err(Error::MissingArgument {
					name: spec.name.to_string(),
				});
			}
			continue;
		};
		let value = match spec.kind {
			// Lazy parameters receive the raw carrier
			ArgKind::Lazy => value.clone(),
			_ => protocol::delazify(ctx, value.clone()).await,
		};
		let value = coerce(scope, spec, value)?;
		out.values.insert(spec.name, value);
	}
	Ok(out)
}

fn coerce(scope: &Scope, spec: &ArgSpec, value: Value) -> Result<Value, Error> {
	let mismatch = |value: &Value| Error::InvalidArgumentKind {
		name: spec.name.to_string(),
		expected: spec.kind.name(),
		got: value.kind(),
	};
	Ok(match spec.kind {
		ArgKind::Any | ArgKind::Lazy => value,
		ArgKind::Bool => Value::Bool(protocol::truthy(scope, &value)),
		ArgKind::Int => match value {
			Value::Number(n) => Value::Number(Number::Int(n.as_int())),
			v => return Err(mismatch(&v)),
		},
		ArgKind::Float => match value {
			Value::Number(n) => Value::Number(Number::Float(n.as_float())),
			v => return Err(mismatch(&v)),
		},
		ArgKind::Strand => match value {
			v @ Value::Strand(_) => v,
			v => return Err(mismatch(&v)),
		},
		ArgKind::Array => match value {
			v @ Value::Array(_) => v,
			v => return Err(mismatch(&v)),
		},
		ArgKind::Object => match value {
			v @ Value::Object(_) => v,
			v => return Err(mismatch(&v)),
		},
		ArgKind::Query => match value {
			v @ Value::Query(_) => v,
			v => return Err(mismatch(&v)),
		},
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;

	const SPECS: &[ArgSpec] = &[
		ArgSpec::required("start", ArgKind::Int, "the first value"),
		ArgSpec::optional("step", ArgKind::Int, "the increment"),
	];

	#[tokio::test]
	async fn unknown_arguments_are_refused() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let args = obj! { "start" => 1, "foo" => 2 };
		let err = extract(&ctx, &scope, SPECS, &args).await.unwrap_err();
		assert_eq!(err.to_string(), "Unexpected arg foo");
	}

	#[tokio::test]
	async fn missing_required_arguments_are_reported() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let args = obj! { "step" => 2 };
		let err = extract(&ctx, &scope, SPECS, &args).await.unwrap_err();
		assert_eq!(err.to_string(), "Missing required arg start");
	}

	#[tokio::test]
	async fn kinds_are_checked() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let args = obj! { "start" => "nope" };
		let err = extract(&ctx, &scope, SPECS, &args).await.unwrap_err();
		assert!(err.to_string().contains("Invalid kind for arg start"));
	}

	#[tokio::test]
	async fn optional_arguments_may_be_absent() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let args = obj! { "start" => 5 };
		let out = extract(&ctx, &scope, SPECS, &args).await.unwrap();
		assert_eq!(out.int("start"), Some(5));
		assert_eq!(out.int("step"), None);
	}
}
