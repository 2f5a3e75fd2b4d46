/// A macro requiring a specific token to be next, returning a parse error
/// otherwise.
macro_rules! expected {
	($parser:expr, $($kind:tt)*) => {{
		let token = $parser.next();
		match token.kind {
			$($kind)* => token,
			$crate::syn::token::TokenKind::Invalid => {
				return Err($parser.invalid_token_error(token.span));
			}
			x => {
				return Err($crate::syn::error::SyntaxError::new(
					format!(
						"Unexpected token {}, expected {}",
						x.as_str(),
						$($kind)*.as_str()
					),
					token.span,
				));
			}
		}
	}};
}

/// A macro raising a parse error for a token the parser did not expect.
macro_rules! unexpected {
	($parser:expr, $token:expr, $expected:expr) => {{
		let token = $token;
		match token.kind {
			$crate::syn::token::TokenKind::Invalid => {
				return Err($parser.invalid_token_error(token.span));
			}
			x => {
				return Err($crate::syn::error::SyntaxError::new(
					format!("Unexpected token {}, expected {}", x.as_str(), $expected),
					token.span,
				));
			}
		}
	}};
}

pub(crate) use expected;
pub(crate) use unexpected;
