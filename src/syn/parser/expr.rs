use crate::ql::call::{Arg, FunctionCall};
use crate::ql::expr::{Expr, Literal};
use crate::ql::ident::Ident;
use crate::ql::operator::Operator;
use crate::ql::part::Part;
use crate::ql::pos::Pos;
use crate::ql::strand::Strand;
use crate::syn::error::SyntaxError;
use crate::syn::parser::mac::{expected, unexpected};
use crate::syn::parser::{ParseResult, Parser};
use crate::syn::token::{t, Span, TokenKind};
use std::sync::Arc;

impl Parser<'_> {
	/// Parse an expression. Commas are not consumed at this level; a comma
	/// list only exists inside parentheses, brackets and argument lists.
	pub fn parse_expr(&mut self) -> ParseResult<Expr> {
		self.parse_or()
	}

	fn parse_or(&mut self) -> ParseResult<Expr> {
		let mut l = self.parse_and()?;
		while self.eat(t!("OR")) {
			let r = self.parse_and()?;
			l = Expr::Binary {
				l: Box::new(l),
				o: Operator::Or,
				r: Box::new(r),
			};
		}
		Ok(l)
	}

	fn parse_and(&mut self) -> ParseResult<Expr> {
		let mut l = self.parse_not()?;
		while self.eat(t!("AND")) {
			let r = self.parse_not()?;
			l = Expr::Binary {
				l: Box::new(l),
				o: Operator::And,
				r: Box::new(r),
			};
		}
		Ok(l)
	}

	fn parse_not(&mut self) -> ParseResult<Expr> {
		if self.eat(t!("NOT")) {
			let v = self.parse_not()?;
			return Ok(Expr::Not(Box::new(v)));
		}
		self.parse_comparison()
	}

	fn parse_comparison(&mut self) -> ParseResult<Expr> {
		let mut l = self.parse_additive()?;
		loop {
			let o = match self.peek_kind() {
				t!("=") => Operator::Equal,
				t!("!=") => Operator::NotEqual,
				t!("<") => Operator::LessThan,
				t!("<=") => Operator::LessThanOrEqual,
				t!(">") => Operator::MoreThan,
				t!(">=") => Operator::MoreThanOrEqual,
				t!("IN") => Operator::In,
				t!("=~") => Operator::Matches,
				_ => return Ok(l),
			};
			self.pop_peek();
			let r = self.parse_additive()?;
			l = Expr::Binary {
				l: Box::new(l),
				o,
				r: Box::new(r),
			};
		}
	}

	fn parse_additive(&mut self) -> ParseResult<Expr> {
		let mut l = self.parse_multiplicative()?;
		loop {
			let o = match self.peek_kind() {
				t!("+") => Operator::Add,
				t!("-") => Operator::Sub,
				_ => return Ok(l),
			};
			self.pop_peek();
			let r = self.parse_multiplicative()?;
			l = Expr::Binary {
				l: Box::new(l),
				o,
				r: Box::new(r),
			};
		}
	}

	fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
		let mut l = self.parse_member()?;
		loop {
			let o = match self.peek_kind() {
				t!("*") => Operator::Mul,
				t!("/") => Operator::Div,
				_ => return Ok(l),
			};
			self.pop_peek();
			let r = self.parse_member()?;
			l = Expr::Binary {
				l: Box::new(l),
				o,
				r: Box::new(r),
			};
		}
	}

	// Member access binds tightest: `.field`, `[index]` and `[i:j]` slices.
	fn parse_member(&mut self) -> ParseResult<Expr> {
		let mut expr = self.parse_prime()?;
		loop {
			match self.peek_kind() {
				t!(".") => {
					self.pop_peek();
					expected!(self, TokenKind::Ident);
					let name = Ident::from(self.take_string());
					expr = Expr::Member {
						expr: Box::new(expr),
						part: Part::Field(name),
					};
				}
				t!("[") => {
					let open = self.pop_peek().span;
					let part = self.parse_bracket_part(open)?;
					expr = Expr::Member {
						expr: Box::new(expr),
						part,
					};
				}
				_ => return Ok(expr),
			}
		}
	}

	fn parse_bracket_part(&mut self, open: Span) -> ParseResult<Part> {
		// `[:end]` and `[:]` slices
		if self.eat(t!(":")) {
			let end = match self.peek_kind() {
				t!("]") => None,
				_ => Some(Box::new(self.parse_expr()?)),
			};
			self.expect_closing_delimiter(t!("]"), open)?;
			return Ok(Part::Slice {
				start: None,
				end,
			});
		}
		let start = self.parse_expr()?;
		if self.eat(t!(":")) {
			let end = match self.peek_kind() {
				t!("]") => None,
				_ => Some(Box::new(self.parse_expr()?)),
			};
			self.expect_closing_delimiter(t!("]"), open)?;
			return Ok(Part::Slice {
				start: Some(Box::new(start)),
				end,
			});
		}
		self.expect_closing_delimiter(t!("]"), open)?;
		Ok(Part::Index(Box::new(start)))
	}

	fn parse_prime(&mut self) -> ParseResult<Expr> {
		let token = self.peek();
		match token.kind {
			TokenKind::Int => {
				self.pop_peek();
				Ok(Expr::Literal(Literal::Int(self.take_int())))
			}
			TokenKind::Float => {
				self.pop_peek();
				Ok(Expr::Literal(Literal::Float(self.take_float())))
			}
			TokenKind::Strand => {
				self.pop_peek();
				Ok(Expr::Literal(Literal::Strand(Strand::from(self.take_string()))))
			}
			t!("TRUE") => {
				self.pop_peek();
				Ok(Expr::Literal(Literal::Bool(true)))
			}
			t!("FALSE") => {
				self.pop_peek();
				Ok(Expr::Literal(Literal::Bool(false)))
			}
			t!("NULL") => {
				self.pop_peek();
				Ok(Expr::Literal(Literal::Null))
			}
			t!("-") => {
				self.pop_peek();
				// A negation literal requires the number to be adjacent;
				// `- 1` is not a negative number
				let next = self.peek_whitespace();
				match next.kind {
					TokenKind::Int => {
						self.next_whitespace();
						Ok(Expr::Literal(Literal::Int(-self.take_int())))
					}
					TokenKind::Float => {
						self.next_whitespace();
						Ok(Expr::Literal(Literal::Float(-self.take_float())))
					}
					_ => Err(SyntaxError::new(
						"Unexpected token -, expected a negated number literal",
						token.span,
					)),
				}
			}
			TokenKind::Ident => {
				self.pop_peek();
				let name = Ident::from(self.take_string());
				if self.peek_kind() == t!("(") {
					let open = self.pop_peek().span;
					let args = self.parse_call_args(open)?;
					let pos = Pos {
						offset: token.span.offset,
						len: self.last_span().offset + self.last_span().len
							- token.span.offset,
					};
					return Ok(Expr::Call(FunctionCall::new(name, args, pos)));
				}
				Ok(Expr::Symbol(name))
			}
			t!("(") => {
				let open = self.pop_peek().span;
				self.enter_object()?;
				let mut items = vec![self.parse_expr()?];
				while self.eat(t!(",")) {
					items.push(self.parse_expr()?);
				}
				self.exit_object();
				self.expect_closing_delimiter(t!(")"), open)?;
				if items.len() == 1 {
					let only = items.pop().expect("one item is present");
					Ok(Expr::Paren(Box::new(only)))
				} else {
					Ok(Expr::Comma(items))
				}
			}
			t!("[") => {
				let open = self.pop_peek().span;
				self.enter_object()?;
				let mut items = Vec::new();
				if self.peek_kind() != t!("]") {
					items.push(self.parse_expr()?);
					while self.eat(t!(",")) {
						items.push(self.parse_expr()?);
					}
				}
				self.exit_object();
				self.expect_closing_delimiter(t!("]"), open)?;
				Ok(Expr::Array(items))
			}
			t!("{") => {
				let open = self.pop_peek().span;
				self.enter_query()?;
				expected!(self, t!("SELECT"));
				let stmt = self.parse_select_stmt(false, Default::default())?;
				self.exit_query();
				self.expect_closing_delimiter(t!("}"), open)?;
				Ok(Expr::Subquery(Arc::new(stmt)))
			}
			_ => unexpected!(self, token, "an expression"),
		}
	}

	/// Parse the keyword arguments of a call; the opening parenthesis has
	/// already been consumed.
	pub(super) fn parse_call_args(&mut self, open: Span) -> ParseResult<Vec<Arg>> {
		let mut args = Vec::new();
		if self.eat(t!(")")) {
			return Ok(args);
		}
		loop {
			expected!(self, TokenKind::Ident);
			let name = Ident::from(self.take_string());
			expected!(self, t!("="));
			let value = self.parse_expr()?;
			args.push(Arg::new(name, value));
			if !self.eat(t!(",")) {
				break;
			}
		}
		self.expect_closing_delimiter(t!(")"), open)?;
		Ok(args)
	}

	fn enter_object(&mut self) -> ParseResult<()> {
		if self.object_recursion == 0 {
			return Err(SyntaxError::new(
				"Exceeded maximum expression nesting depth",
				self.recent_span(),
			));
		}
		self.object_recursion -= 1;
		Ok(())
	}

	fn exit_object(&mut self) {
		self.object_recursion += 1;
	}

	pub(super) fn enter_query(&mut self) -> ParseResult<()> {
		if self.query_recursion == 0 {
			return Err(SyntaxError::new(
				"Exceeded maximum query nesting depth",
				self.recent_span(),
			));
		}
		self.query_recursion -= 1;
		Ok(())
	}

	pub(super) fn exit_query(&mut self) {
		self.query_recursion += 1;
	}
}
