use thiserror::Error;

mod byte;
mod ident;
mod number;
mod reader;
mod strand;

pub use reader::{BytesReader, CharError};

use crate::syn::token::{Span, Token, TokenKind};

/// An error returned by the lexer when an invalid token is encountered.
///
/// Can be retrieved from the `Lexer::error` field whenever it returned a
/// [`TokenKind::Invalid`] token.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
	#[error("Lexer encountered unexpected character {0:?}")]
	UnexpectedCharacter(char),
	#[error("Invalid escape character {0:?}")]
	InvalidEscapeCharacter(char),
	#[error("Lexer encountered unexpected end of source characters")]
	UnexpectedEof,
	#[error("Source was not valid utf-8")]
	InvalidUtf8,
	#[error("Invalid number: {0}")]
	InvalidNumber(String),
}

impl From<CharError> for Error {
	fn from(value: CharError) -> Self {
		match value {
			CharError::Eof => Self::UnexpectedEof,
			CharError::Unicode => Self::InvalidUtf8,
		}
	}
}

/// The QL lexer.
///
/// Takes a slice of bytes and produces tokens lazily. The lexer always
/// returns a token: at the end of the source it returns Eof tokens, and on
/// invalid input an Invalid token with the error stored on the lexer.
///
/// Tokens carry only a kind and a span; values which cannot be read
/// straight from the source (strings with escapes, parsed numbers) are
/// stored on the lexer and consumed by the parser together with the token.
#[non_exhaustive]
pub struct Lexer<'a> {
	/// The reader for reading the source bytes.
	pub reader: BytesReader<'a>,
	/// The one past the last character of the previous token.
	last_offset: u32,
	/// A buffer for building the value of tokens which cannot be read
	/// straight from the source.
	scratch: String,
	/// The value of the last Ident or Strand token.
	pub string: Option<String>,
	/// The value of the last Int token.
	pub int: Option<i64>,
	/// The value of the last Float token.
	pub float: Option<f64>,
	/// The error behind the last Invalid token.
	pub error: Option<Error>,
}

impl<'a> Lexer<'a> {
	/// Create a new lexer.
	///
	/// # Panic
	/// This function will panic if the source is longer than u32::MAX.
	pub fn new(source: &'a [u8]) -> Lexer<'a> {
		let reader = BytesReader::new(source);
		assert!(reader.len() <= u32::MAX as usize, "source code exceeded maximum size");
		Lexer {
			reader,
			last_offset: 0,
			scratch: String::new(),
			string: None,
			int: None,
			float: None,
			error: None,
		}
	}

	/// Returns the next token, driving the lexer forward.
	pub fn next_token(&mut self) -> Token {
		let Some(byte) = self.reader.next() else {
			return self.eof_token();
		};
		if byte.is_ascii() {
			self.lex_ascii(byte)
		} else {
			// Only identifiers and strings may contain non-ascii text
			let char = match self.reader.complete_char(byte) {
				Ok(c) => c,
				Err(e) => return self.invalid_token(e.into()),
			};
			self.invalid_token(Error::UnexpectedCharacter(char))
		}
	}

	// Creates the eof token pointing past the last character of the source.
	fn eof_token(&mut self) -> Token {
		Token {
			kind: TokenKind::Eof,
			span: Span {
				offset: self.last_offset,
				len: 0,
			},
		}
	}

	// Return an invalid token, remembering its cause.
	fn invalid_token(&mut self, error: Error) -> Token {
		self.error = Some(error);
		self.finish_token(TokenKind::Invalid)
	}

	/// The span of the token currently being lexed.
	pub fn current_span(&self) -> Span {
		let new_offset = self.reader.offset() as u32;
		Span {
			offset: self.last_offset,
			len: new_offset - self.last_offset,
		}
	}

	// Build a token of the given kind covering the bytes consumed since the
	// previous token.
	fn finish_token(&mut self, kind: TokenKind) -> Token {
		let span = self.current_span();
		self.last_offset = self.reader.offset() as u32;
		Token {
			kind,
			span,
		}
	}

	/// The source text between two byte offsets, lossily decoded.
	pub(super) fn source_slice(&self, start: usize, end: usize) -> String {
		String::from_utf8_lossy(self.reader.slice(start, end)).into_owned()
	}

	/// Consume the next byte if it equals the given byte.
	pub fn eat(&mut self, byte: u8) -> bool {
		if self.reader.peek() == Some(byte) {
			self.reader.next();
			true
		} else {
			false
		}
	}

	/// Consume the next byte if the closure accepts it.
	pub fn eat_when<F: FnOnce(u8) -> bool>(&mut self, f: F) -> bool {
		let Some(x) = self.reader.peek() else {
			return false;
		};
		if f(x) {
			self.reader.next();
			true
		} else {
			false
		}
	}
}

impl Iterator for Lexer<'_> {
	type Item = Token;

	fn next(&mut self) -> Option<Self::Item> {
		let token = self.next_token();
		if token.is_eof() {
			return None;
		}
		Some(token)
	}
}

#[cfg(test)]
mod test;
