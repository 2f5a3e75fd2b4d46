use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// A source position carried on AST nodes.
///
/// Positions intentionally compare equal to each other: two parses of the
/// same statement text must produce deeply-equal ASTs even when one of them
/// came from a reformatted source with different offsets.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pos {
	/// Offset in bytes into the source text
	pub offset: u32,
	/// The amount of bytes this position encompasses
	pub len: u32,
}

impl PartialEq for Pos {
	fn eq(&self, _: &Self) -> bool {
		true
	}
}

impl Eq for Pos {}

impl Hash for Pos {
	fn hash<H: Hasher>(&self, _: &mut H) {}
}

/// A single source comment, without its delimiters.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Comment(pub String);

impl Display for Comment {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "// {}", self.0)
	}
}

/// The comments attached to an AST node.
///
/// Like [`Pos`], attached comments are ignored by equality: the compact
/// serialization format drops comments, and round-tripping through it must
/// still yield an equal AST.
#[derive(Clone, Debug, Default)]
pub struct Comments(pub Vec<Comment>);

impl Comments {
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl PartialEq for Comments {
	fn eq(&self, _: &Self) -> bool {
		true
	}
}

impl Eq for Comments {}

impl Hash for Comments {
	fn hash<H: Hasher>(&self, _: &mut H) {}
}
