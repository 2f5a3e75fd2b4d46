use crate::syn::lexer::{Error, Lexer};
use crate::syn::token::{Keyword, Token, TokenKind};

impl Lexer<'_> {
	/// Lex a plain identifier or keyword. The first byte has already been
	/// consumed.
	pub(super) fn lex_ident(&mut self, _first: u8) -> Token {
		while self.eat_when(|b| b.is_ascii_alphanumeric() || b == b'_') {}
		let span = self.current_span();
		let start = span.offset as usize;
		let text = self.source_slice(start, start + span.len as usize);
		// Keywords are case-insensitive
		if let Some(keyword) = Keyword::lookup(&text) {
			return self.finish_token(TokenKind::Keyword(keyword));
		}
		self.string = Some(text);
		self.finish_token(TokenKind::Ident)
	}

	/// Lex a backtick-quoted identifier, which may contain spaces. The
	/// opening backtick has already been consumed.
	pub(super) fn lex_quoted_ident(&mut self) -> Token {
		self.scratch.clear();
		loop {
			match self.reader.next() {
				Some(b'`') => {
					self.string = Some(std::mem::take(&mut self.scratch));
					return self.finish_token(TokenKind::Ident);
				}
				Some(b'\n') => {
					return self.invalid_token(Error::UnexpectedCharacter('\n'));
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
