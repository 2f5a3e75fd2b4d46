use crate::syn::error::RenderedError;
use thiserror::Error;

/// The errors returned by the engine.
///
/// QL evaluation itself never surfaces errors to the host: evaluation
/// failures become log entries plus Null values or closed row streams. This
/// enum covers the remaining surface, i.e. parse errors, host API misuse and
/// internal invariants.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
	/// The query text did not conform to the QL grammar
	#[error("Parse error: {0}")]
	InvalidQuery(RenderedError),

	/// A required argument was not supplied to a plugin or function
	#[error("Missing required arg {name}")]
	MissingArgument {
		name: String,
	},

	/// An argument name was supplied which the callee does not declare
	#[error("Unexpected arg {name}")]
	UnexpectedArgument {
		name: String,
	},

	/// An argument value could not be reduced to the declared kind
	#[error("Invalid kind for arg {name}: expected {expected}, got {got}")]
	InvalidArgumentKind {
		name: String,
		expected: &'static str,
		got: &'static str,
	},

	/// A destructor was registered on a scope which was already closed
	#[error("Scope is already closed")]
	ScopeClosed,

	/// There was a problem with a provided timeout
	#[error("Invalid timeout: {0} seconds")]
	InvalidTimeout(u64),

	/// The query was cancelled before it could run to completion
	#[error("The query was not executed due to a cancelled context")]
	QueryCancelled,

	/// The named function is not registered on the scope
	#[error("Unknown function {0}")]
	UnknownFunction(String),

	/// The named plugin is not registered on the scope
	#[error("Unknown plugin {0}")]
	UnknownPlugin(String),

	/// The addition of two values failed
	#[error("Cannot add {0} and {1}")]
	TryAdd(String, String),

	/// The subtraction of two values failed
	#[error("Cannot subtract {1} from {0}")]
	TrySub(String, String),

	/// The multiplication of two values failed
	#[error("Cannot multiply {0} by {1}")]
	TryMul(String, String),

	/// The division of two values failed
	#[error("Cannot divide {0} by {1}")]
	TryDiv(String, String),

	/// An internal invariant was broken
	#[error("Internal error: {0}")]
	Unreachable(&'static str),
}

impl From<RenderedError> for Error {
	fn from(e: RenderedError) -> Error {
		Error::InvalidQuery(e)
	}
}
