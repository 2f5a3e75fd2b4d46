use crate::ctx::Context;
use crate::exec::{stream, RowStream, Scope};
use crate::ql::fmt::Fmt;
use crate::ql::statement::Statement;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

/// A parsed program: one or more statements separated by whitespace.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct Query(pub Vec<Statement>);

impl Deref for Query {
	type Target = Vec<Statement>;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl IntoIterator for Query {
	type Item = Statement;
	type IntoIter = std::vec::IntoIter<Self::Item>;
	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl Query {
	/// Evaluate the statements in order against the same scope.
	///
	/// `LET` bindings take effect before the following statements run; the
	/// row streams of the `SELECT` statements are concatenated in statement
	/// order.
	pub async fn eval(&self, ctx: &Context, scope: &Scope) -> RowStream {
		let mut streams = Vec::with_capacity(self.0.len());
		for stmt in &self.0 {
			streams.push(stmt.eval(ctx, scope).await);
		}
		match streams.len() {
			0 => RowStream::empty(),
			1 => streams.pop().expect("one stream is present"),
			_ => {
				let ctx = ctx.clone();
				stream::spawn_source(move |tx| async move {
					for mut s in streams {
						while let Some(row) = s.next().await {
							if !stream::send(&ctx, &tx, row).await {
								return;
							}
						}
					}
				})
			}
		}
	}
}

impl Display for Query {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(&Fmt::space_separated(self.0.iter()), f)
	}
}
