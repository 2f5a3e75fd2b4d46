use crate::syn::lexer::{Error, Lexer};
use crate::syn::token::{Token, TokenKind};

impl Lexer<'_> {
	/// Lex a numeric literal. The first digit has already been consumed.
	///
	/// Supported forms: decimal integers, `0x...` hex integers, leading-zero
	/// octal integers, and decimal floats with an optional fraction and
	/// exponent.
	pub(super) fn lex_number(&mut self, first: u8) -> Token {
		self.scratch.clear();
		// Hex with a `0x` prefix
		if first == b'0' && (self.eat(b'x') || self.eat(b'X')) {
			while self.eat_when(|b| b.is_ascii_hexdigit()) {
				// The digits are re-read from the consumed span below
			}
			let digits = self.consumed_digits(2);
			return match i64::from_str_radix(&digits, 16) {
				Ok(v) if !digits.is_empty() => {
					self.int = Some(v);
					self.finish_token(TokenKind::Int)
				}
				_ => self.invalid_token(Error::InvalidNumber(format!("0x{digits}"))),
			};
		}
		// The integral digits
		while self.eat_when(|b| b.is_ascii_digit()) {}
		let mut is_float = false;
		// A fraction requires a digit right after the dot, otherwise the
		// dot is a member access
		if self.reader.peek() == Some(b'.')
			&& self.reader.peek_at(1).map(|b| b.is_ascii_digit()).unwrap_or(false)
		{
			self.reader.next();
			while self.eat_when(|b| b.is_ascii_digit()) {}
			is_float = true;
		}
		// An exponent
		if matches!(self.reader.peek(), Some(b'e') | Some(b'E')) {
			let digit_at = match self.reader.peek_at(1) {
				Some(b'+') | Some(b'-') => 2,
				_ => 1,
			};
			if self.reader.peek_at(digit_at).map(|b| b.is_ascii_digit()).unwrap_or(false) {
				for _ in 0..digit_at {
					self.reader.next();
				}
				while self.eat_when(|b| b.is_ascii_digit()) {}
				is_float = true;
			}
		}
		// A number running into an identifier is malformed
		if self.reader.peek().map(|b| b.is_ascii_alphabetic() || b == b'_').unwrap_or(false) {
			let text = self.consumed_digits(0);
			return self.invalid_token(Error::InvalidNumber(text));
		}
		let text = self.consumed_digits(0);
		if is_float {
			return match text.parse::<f64>() {
				Ok(v) => {
					self.float = Some(v);
					self.finish_token(TokenKind::Float)
				}
				Err(_) => self.invalid_token(Error::InvalidNumber(text)),
			};
		}
		// A leading zero marks an octal literal
		if text.len() > 1 && text.starts_with('0') {
			return match i64::from_str_radix(&text[1..], 8) {
				Ok(v) => {
					self.int = Some(v);
					self.finish_token(TokenKind::Int)
				}
				Err(_) => self.invalid_token(Error::InvalidNumber(text)),
			};
		}
		match text.parse::<i64>() {
			Ok(v) => {
				self.int = Some(v);
				self.finish_token(TokenKind::Int)
			}
			Err(_) => self.invalid_token(Error::InvalidNumber(text)),
		}
	}

	// The text of the token being lexed, minus `skip` leading bytes.
	fn consumed_digits(&self, skip: usize) -> String {
		let span = self.current_span();
		let start = span.offset as usize + skip;
		let end = span.offset as usize + span.len as usize;
		self.source_slice(start, end)
	}
}
