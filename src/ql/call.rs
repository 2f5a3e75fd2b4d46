use crate::ql::expr::Expr;
use crate::ql::fmt::Fmt;
use crate::ql::ident::Ident;
use crate::ql::pos::Pos;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// A function or plugin invocation with keyword arguments.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct FunctionCall {
	pub name: Ident,
	pub args: Vec<Arg>,
	/// The call position, used as the stable call-site identifier for
	/// aggregate state.
	pub pos: Pos,
}

impl FunctionCall {
	pub fn new(name: Ident, args: Vec<Arg>, pos: Pos) -> Self {
		Self {
			name,
			args,
			pos,
		}
	}

	/// The stable identifier for this call site
	pub(crate) fn call_id(&self) -> u32 {
		self.pos.offset
	}
}

impl Display for FunctionCall {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "{}({})", self.name, Fmt::comma_separated(self.args.iter()))
	}
}

/// A single keyword argument in a call.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct Arg {
	pub name: Ident,
	pub value: Arc<Expr>,
}

impl Arg {
	pub fn new(name: Ident, value: Expr) -> Self {
		Self {
			name,
			value: Arc::new(value),
		}
	}
}

impl Display for Arg {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "{}={}", self.name, self.value)
	}
}
