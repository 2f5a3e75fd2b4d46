use crate::ql::cond::Cond;
use crate::ql::field::{Field, Fields};
use crate::ql::from::FromSource;
use crate::ql::group::Group;
use crate::ql::ident::Ident;
use crate::ql::limit::Limit;
use crate::ql::order::Order;
use crate::ql::pos::{Comments, Pos};
use crate::ql::query::Query;
use crate::ql::statement::Statement;
use crate::ql::statements::select::SelectStatement;
use crate::ql::statements::set::{LetExpr, LetStatement};
use crate::syn::parser::mac::{expected, unexpected};
use crate::syn::parser::{ParseResult, Parser};
use crate::syn::token::{t, TokenKind};
use std::sync::Arc;

impl Parser<'_> {
	/// Parse a full program: statements separated by whitespace.
	pub fn parse_query(&mut self) -> ParseResult<Query> {
		let mut statements = Vec::new();
		while !self.peek().is_eof() {
			statements.push(self.parse_stmt()?);
		}
		Ok(Query(statements))
	}

	/// Parse a single statement.
	pub fn parse_stmt(&mut self) -> ParseResult<Statement> {
		let token = self.peek();
		let comments = self.take_comments();
		match token.kind {
			t!("LET") => {
				self.pop_peek();
				Ok(Statement::Let(self.parse_let_stmt(comments)?))
			}
			t!("EXPLAIN") => {
				self.pop_peek();
				expected!(self, t!("SELECT"));
				Ok(Statement::Select(Arc::new(self.parse_select_stmt(true, comments)?)))
			}
			t!("SELECT") => {
				self.pop_peek();
				Ok(Statement::Select(Arc::new(self.parse_select_stmt(false, comments)?)))
			}
			_ => unexpected!(self, token, "LET, SELECT or EXPLAIN"),
		}
	}

	// Parse a LET statement; the LET keyword has already been consumed.
	fn parse_let_stmt(&mut self, comments: Comments) -> ParseResult<LetStatement> {
		expected!(self, TokenKind::Ident);
		let name = Ident::from(self.take_string());
		// An optional parameter list makes this a parameterized query
		let params = if self.peek_kind() == t!("(") {
			let open = self.pop_peek().span;
			let mut params = Vec::new();
			if !self.eat(t!(")")) {
				loop {
					expected!(self, TokenKind::Ident);
					params.push(Ident::from(self.take_string()));
					if !self.eat(t!(",")) {
						break;
					}
				}
				self.expect_closing_delimiter(t!(")"), open)?;
			}
			Some(params)
		} else {
			None
		};
		let token = self.next();
		let materialize = match token.kind {
			t!("=") => false,
			t!("<=") => true,
			_ => unexpected!(self, token, "= or <="),
		};
		let what = if self.eat(t!("SELECT")) {
			self.enter_query()?;
			let stmt = self.parse_select_stmt(false, Comments::default())?;
			self.exit_query();
			LetExpr::Select(Arc::new(stmt))
		} else {
			LetExpr::Expr(Arc::new(self.parse_expr()?))
		};
		Ok(LetStatement {
			name,
			params,
			materialize,
			what,
			comments,
		})
	}

	/// Parse a SELECT statement; the SELECT (and EXPLAIN) keywords have
	/// already been consumed.
	pub(super) fn parse_select_stmt(
		&mut self,
		explain: bool,
		comments: Comments,
	) -> ParseResult<SelectStatement> {
		let expr = self.parse_fields()?;
		expected!(self, t!("FROM"));
		let what = self.parse_from_source()?;
		let cond = if self.eat(t!("WHERE")) {
			Some(Cond(Arc::new(self.parse_expr()?)))
		} else {
			None
		};
		let group = if self.eat(t!("GROUP")) {
			expected!(self, t!("BY"));
			Some(Group(Arc::new(self.parse_expr()?)))
		} else {
			None
		};
		let order = if self.eat(t!("ORDER")) {
			expected!(self, t!("BY"));
			expected!(self, TokenKind::Ident);
			let name = Ident::from(self.take_string());
			let desc = self.eat(t!("DESC"));
			Some(Order {
				name,
				desc,
			})
		} else {
			None
		};
		let limit = if self.eat(t!("LIMIT")) {
			expected!(self, TokenKind::Int);
			Some(Limit(self.take_int().max(0) as u64))
		} else {
			None
		};
		Ok(SelectStatement {
			explain,
			expr,
			what,
			cond,
			group,
			order,
			limit,
			comments,
		})
	}

	fn parse_fields(&mut self) -> ParseResult<Fields> {
		let mut fields = Vec::new();
		loop {
			// Comments between fields attach to the field that follows
			let peeked = self.peek();
			let comments = self.take_comments();
			if peeked.kind == t!("*") {
				self.pop_peek();
				fields.push(Field::All);
			} else {
				let expr = self.parse_expr()?;
				let alias = if self.eat(t!("AS")) {
					expected!(self, TokenKind::Ident);
					Some(Ident::from(self.take_string()))
				} else {
					None
				};
				fields.push(Field::Single {
					expr: Arc::new(expr),
					alias,
					comments,
				});
			}
			if !self.eat(t!(",")) {
				break;
			}
		}
		Ok(Fields(fields))
	}

	fn parse_from_source(&mut self) -> ParseResult<FromSource> {
		let token = expected!(self, TokenKind::Ident);
		let name = Ident::from(self.take_string());
		let args = if self.peek_kind() == t!("(") {
			let open = self.pop_peek().span;
			Some(self.parse_call_args(open)?)
		} else {
			None
		};
		let pos = Pos {
			offset: token.span.offset,
			len: self.last_span().offset + self.last_span().len - token.span.offset,
		};
		Ok(FromSource {
			name,
			args,
			pos,
		})
	}
}
