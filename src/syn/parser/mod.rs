//! The QL parser.
//!
//! A straightforward recursive descent parser over the lexer's tokens.
//! Most functions peek a token and decide on a production; the `expected!`
//! macro consumes a single mandatory token, and `unexpected!` raises a
//! parse error describing what was found and what was possible.
//!
//! Tokens only carry a kind and a span. When the lexer produces a token
//! with an attached value (identifiers, strings, numbers), the value is
//! moved into the token buffer alongside it, so peeking further ahead can
//! never clobber it.
//!
//! Comments are collected while skipping tokens and attached to the next
//! statement or select field that starts.

use crate::ql::pos::{Comment, Comments};
use crate::syn::error::SyntaxError;
use crate::syn::lexer::Lexer;
use crate::syn::token::{Span, Token, TokenKind};
use std::collections::VecDeque;

mod expr;
mod mac;
mod stmt;

/// The result returned by most parser functions.
pub type ParseResult<T> = Result<T, SyntaxError>;

// A token value moved out of the lexer when the token was produced.
#[derive(Clone, Debug)]
enum TokenValue {
	String(String),
	Int(i64),
	Float(f64),
}

#[derive(Debug)]
struct BufferedToken {
	token: Token,
	value: Option<TokenValue>,
}

/// The QL parser.
#[non_exhaustive]
pub struct Parser<'a> {
	source: &'a str,
	lexer: Lexer<'a>,
	last_span: Span,
	last_value: Option<TokenValue>,
	token_buffer: VecDeque<BufferedToken>,
	pending_comments: Vec<Comment>,
	query_recursion: usize,
	object_recursion: usize,
}

impl<'a> Parser<'a> {
	/// Create a new parser for the given source.
	pub fn new(source: &'a str) -> Self {
		Parser {
			source,
			lexer: Lexer::new(source.as_bytes()),
			last_span: Span::empty(),
			last_value: None,
			token_buffer: VecDeque::new(),
			pending_comments: Vec::new(),
			query_recursion: crate::cnf::MAX_QUERY_RECURSION,
			object_recursion: crate::cnf::MAX_OBJECT_RECURSION,
		}
	}

	// Pull one raw token from the lexer, capturing its value.
	fn pull_token(&mut self) -> BufferedToken {
		let token = self.lexer.next_token();
		let value = match token.kind {
			TokenKind::Ident | TokenKind::Strand => {
				self.lexer.string.take().map(TokenValue::String)
			}
			TokenKind::Int => self.lexer.int.take().map(TokenValue::Int),
			TokenKind::Float => self.lexer.float.take().map(TokenValue::Float),
			_ => None,
		};
		BufferedToken {
			token,
			value,
		}
	}

	fn buffer_front(&mut self) -> &BufferedToken {
		if self.token_buffer.is_empty() {
			let t = self.pull_token();
			self.token_buffer.push_back(t);
		}
		self.token_buffer.front().expect("the buffer was just filled")
	}

	// Record a skipped comment token.
	fn collect_comment(&mut self, token: Token) {
		let start = token.span.offset as usize;
		let end = start + token.span.len as usize;
		let text = &self.source[start.min(self.source.len())..end.min(self.source.len())];
		let text = text
			.strip_prefix("//")
			.or_else(|| text.strip_prefix("--"))
			.or_else(|| {
				text.strip_prefix("/*").map(|t| t.strip_suffix("*/").unwrap_or(t))
			})
			.unwrap_or(text);
		self.pending_comments.push(Comment(text.trim().to_string()));
	}

	/// Take the comments collected since the last attachment point.
	pub(crate) fn take_comments(&mut self) -> Comments {
		Comments(std::mem::take(&mut self.pending_comments))
	}

	/// Returns the next significant token and advances the parser.
	#[allow(clippy::should_implement_trait)]
	pub fn next(&mut self) -> Token {
		loop {
			let BufferedToken {
				token,
				value,
			} = match self.token_buffer.pop_front() {
				Some(t) => t,
				None => self.pull_token(),
			};
			match token.kind {
				TokenKind::WhiteSpace => continue,
				TokenKind::LineComment | TokenKind::BlockComment => {
					self.collect_comment(token);
					continue;
				}
				_ => {
					self.last_span = token.span;
					self.last_value = value;
					return token;
				}
			}
		}
	}

	/// Returns the next token including whitespace and comments.
	pub fn next_whitespace(&mut self) -> Token {
		let BufferedToken {
			token,
			value,
		} = match self.token_buffer.pop_front() {
			Some(t) => t,
			None => self.pull_token(),
		};
		self.last_span = token.span;
		self.last_value = value;
		token
	}

	/// Returns the next significant token without consuming it.
	pub fn peek(&mut self) -> Token {
		loop {
			let front = self.buffer_front().token;
			match front.kind {
				TokenKind::WhiteSpace => {
					self.token_buffer.pop_front();
				}
				TokenKind::LineComment | TokenKind::BlockComment => {
					self.token_buffer.pop_front();
					self.collect_comment(front);
				}
				_ => return front,
			}
		}
	}

	/// Returns the next raw token without consuming it. Does not undo
	/// whitespace skipped by a previous [`Parser::peek`].
	pub fn peek_whitespace(&mut self) -> Token {
		self.buffer_front().token
	}

	/// The kind of the next significant token.
	pub fn peek_kind(&mut self) -> TokenKind {
		self.peek().kind
	}

	/// Consume the current peeked token. Should only be called after
	/// peeking a value.
	pub fn pop_peek(&mut self) -> Token {
		let BufferedToken {
			token,
			value,
		} = self.token_buffer.pop_front().expect("pop_peek requires a peeked token");
		self.last_span = token.span;
		self.last_value = value;
		token
	}

	/// The span of the last consumed token.
	pub fn last_span(&self) -> Span {
		self.last_span
	}

	/// The span of the next significant token.
	pub fn recent_span(&mut self) -> Span {
		self.peek().span
	}

	/// Eat the next token if it is of the given kind.
	pub fn eat(&mut self, kind: TokenKind) -> bool {
		if self.peek().kind == kind {
			self.pop_peek();
			true
		} else {
			false
		}
	}

	// The string value of the last consumed Ident or Strand token.
	fn take_string(&mut self) -> String {
		match self.last_value.take() {
			Some(TokenValue::String(s)) => s,
			_ => String::new(),
		}
	}

	// The value of the last consumed Int token.
	fn take_int(&mut self) -> i64 {
		match self.last_value.take() {
			Some(TokenValue::Int(v)) => v,
			_ => 0,
		}
	}

	// The value of the last consumed Float token.
	fn take_float(&mut self) -> f64 {
		match self.last_value.take() {
			Some(TokenValue::Float(v)) => v,
			_ => 0.0,
		}
	}

	// The error behind an Invalid token.
	fn invalid_token_error(&mut self, span: Span) -> SyntaxError {
		match self.lexer.error.take() {
			Some(e) => SyntaxError::new(e.to_string(), span),
			None => SyntaxError::new("Invalid token", span),
		}
	}

	/// Checks that the next token closes a delimited production. On a miss
	/// the error points at the opening delimiter when the input ended.
	fn expect_closing_delimiter(&mut self, kind: TokenKind, should_close: Span) -> ParseResult<()> {
		if !self.eat(kind) {
			let span = if self.peek().is_eof() {
				should_close
			} else {
				self.recent_span()
			};
			return Err(SyntaxError::new(
				format!("Unexpected token, expected closing delimiter `{}`", kind.as_str()),
				span,
			)
			.with_explain("expected this delimiter to close"));
		}
		Ok(())
	}
}
