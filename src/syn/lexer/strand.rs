use crate::syn::lexer::{Error, Lexer};
use crate::syn::token::{Token, TokenKind};

impl Lexer<'_> {
	/// Lex a string literal. The opening quote has already been consumed.
	///
	/// Single and double quoted strings support escapes; a triple
	/// single-quote delimiter opens a raw string which may span lines and
	/// contain quotes.
	pub(super) fn lex_strand(&mut self, quote: u8) -> Token {
		self.scratch.clear();
		// A doubled opening quote is either an empty string or the start of
		// a triple-quoted raw string
		if quote == b'\'' && self.eat(b'\'') {
			if self.eat(b'\'') {
				return self.lex_raw_strand();
			}
			self.string = Some(String::new());
			return self.finish_token(TokenKind::Strand);
		}
		loop {
			match self.reader.next() {
				Some(b) if b == quote => {
					self.string = Some(std::mem::take(&mut self.scratch));
					return self.finish_token(TokenKind::Strand);
				}
				Some(b'\\') => match self.reader.next() {
					Some(b'n') => self.scratch.push('\n'),
					Some(b'r') => self.scratch.push('\r'),
					Some(b't') => self.scratch.push('\t'),
					Some(b'0') => self.scratch.push('\0'),
					Some(b'\\') => self.scratch.push('\\'),
					Some(b'\'') => self.scratch.push('\''),
					Some(b'"') => self.scratch.push('"'),
					Some(b) => {
						let c = match self.reader.complete_char(b) {
							Ok(c) => c,
							Err(e) => return self.invalid_token(e.into()),
						};
						return self.invalid_token(Error::InvalidEscapeCharacter(c));
					}
					None => return self.invalid_token(Error::UnexpectedEof),
				},
				Some(b) => {
					let c = match self.reader.complete_char(b) {
						Ok(c) => c,
						Err(e) => return self.invalid_token(e.into()),
					};
					self.scratch.push(c);
				}
				None => return self.invalid_token(Error::UnexpectedEof),
			}
		}
	}

	// Lex a `''' ... '''` raw string. The opening delimiter has already
	// been consumed.
	fn lex_raw_strand(&mut self) -> Token {
		loop {
			match self.reader.next() {
				Some(b'\'') => {
					if self.eat(b'\'') {
						if self.eat(b'\'') {
							self.string = Some(std::mem::take(&mut self.scratch));
							return self.finish_token(TokenKind::Strand);
						}
						self.scratch.push('\'');
					}
					self.scratch.push('\'');
				}
				Some(b) => {
					let c = match self.reader.complete_char(b) {
						Ok(c) => c,
						Err(e) => return self.invalid_token(e.into()),
					};
					self.scratch.push(c);
				}
				None => return self.invalid_token(Error::UnexpectedEof),
			}
		}
	}
}
