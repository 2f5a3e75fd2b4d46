use crate::ql::call::Arg;
use crate::ql::fmt::Fmt;
use crate::ql::ident::Ident;
use crate::ql::pos::Pos;
use std::fmt::{self, Display, Formatter};

/// The `FROM` clause of a statement: a plugin invocation or a scope
/// variable reference.
///
/// `FROM source` and `FROM source()` are distinguished so that the original
/// text can be reproduced; both resolve identically.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct FromSource {
	pub name: Ident,
	pub args: Option<Vec<Arg>>,
	pub pos: Pos,
}

impl FromSource {
	/// The keyword arguments of the invocation, if any
	pub fn args(&self) -> &[Arg] {
		match &self.args {
			Some(args) => args.as_slice(),
			None => &[],
		}
	}
}

impl Display for FromSource {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(&self.name, f)?;
		if let Some(args) = &self.args {
			write!(f, "({})", Fmt::comma_separated(args.iter()))?;
		}
		Ok(())
	}
}
