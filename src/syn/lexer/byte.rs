use crate::syn::lexer::{Error, Lexer};
use crate::syn::token::{t, Token, TokenKind};

impl Lexer<'_> {
	/// Lex a token starting with an ascii byte.
	pub(super) fn lex_ascii(&mut self, byte: u8) -> Token {
		match byte {
			b' ' | b'\t' | b'\r' | b'\n' => self.lex_whitespace(),
			b'(' => self.finish_token(t!("(")),
			b')' => self.finish_token(t!(")")),
			b'{' => self.finish_token(t!("{")),
			b'}' => self.finish_token(t!("}")),
			b'[' => self.finish_token(t!("[")),
			b']' => self.finish_token(t!("]")),
			b',' => self.finish_token(t!(",")),
			b'.' => self.finish_token(t!(".")),
			b':' => self.finish_token(t!(":")),
			b'+' => self.finish_token(t!("+")),
			b'*' => self.finish_token(t!("*")),
			b'=' => {
				if self.eat(b'~') {
					self.finish_token(t!("=~"))
				} else {
					// `==` is accepted as plain equality
					self.eat(b'=');
					self.finish_token(t!("="))
				}
			}
			b'!' => {
				if self.eat(b'=') {
					self.finish_token(t!("!="))
				} else {
					self.invalid_token(Error::UnexpectedCharacter('!'))
				}
			}
			b'<' => {
				if self.eat(b'=') {
					self.finish_token(t!("<="))
				} else if self.eat(b'>') {
					self.finish_token(t!("!="))
				} else {
					self.finish_token(t!("<"))
				}
			}
			b'>' => {
				if self.eat(b'=') {
					self.finish_token(t!(">="))
				} else {
					self.finish_token(t!(">"))
				}
			}
			b'-' => {
				if self.eat(b'-') {
					self.lex_line_comment()
				} else {
					self.finish_token(t!("-"))
				}
			}
			b'/' => {
				if self.eat(b'/') {
					self.lex_line_comment()
				} else if self.eat(b'*') {
					self.lex_block_comment()
				} else {
					self.finish_token(t!("/"))
				}
			}
			b'\'' | b'"' => self.lex_strand(byte),
			b'`' => self.lex_quoted_ident(),
			b'0'..=b'9' => self.lex_number(byte),
			b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => self.lex_ident(byte),
			byte => self.invalid_token(Error::UnexpectedCharacter(byte as char)),
		}
	}

	fn lex_whitespace(&mut self) -> Token {
		while self.eat_when(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n')) {}
		self.finish_token(TokenKind::WhiteSpace)
	}

	// Consume to the end of the line. The leading `//` or `--` has already
	// been consumed.
	fn lex_line_comment(&mut self) -> Token {
		while self.eat_when(|b| b != b'\n') {}
		self.finish_token(TokenKind::LineComment)
	}

	// Consume a `/* ... */` comment. The leading `/*` has already been
	// consumed.
	fn lex_block_comment(&mut self) -> Token {
		loop {
			match self.reader.next() {
				Some(b'*') => {
					if self.eat(b'/') {
						return self.finish_token(TokenKind::BlockComment);
					}
				}
				Some(_) => (),
				None => return self.invalid_token(Error::UnexpectedEof),
			}
		}
	}
}
