/// A shorthand for producing token kinds from their textual form.
macro_rules! t {
	("(") => {
		$crate::syn::token::TokenKind::LeftParen
	};
	(")") => {
		$crate::syn::token::TokenKind::RightParen
	};
	("{") => {
		$crate::syn::token::TokenKind::LeftBrace
	};
	("}") => {
		$crate::syn::token::TokenKind::RightBrace
	};
	("[") => {
		$crate::syn::token::TokenKind::LeftBracket
	};
	("]") => {
		$crate::syn::token::TokenKind::RightBracket
	};
	(",") => {
		$crate::syn::token::TokenKind::Comma
	};
	(".") => {
		$crate::syn::token::TokenKind::Dot
	};
	(":") => {
		$crate::syn::token::TokenKind::Colon
	};
	("=") => {
		$crate::syn::token::TokenKind::Eq
	};
	("!=") => {
		$crate::syn::token::TokenKind::NotEq
	};
	("<") => {
		$crate::syn::token::TokenKind::Lt
	};
	("<=") => {
		$crate::syn::token::TokenKind::Lte
	};
	(">") => {
		$crate::syn::token::TokenKind::Gt
	};
	(">=") => {
		$crate::syn::token::TokenKind::Gte
	};
	("=~") => {
		$crate::syn::token::TokenKind::Matches
	};
	("+") => {
		$crate::syn::token::TokenKind::Add
	};
	("-") => {
		$crate::syn::token::TokenKind::Sub
	};
	("*") => {
		$crate::syn::token::TokenKind::Mul
	};
	("/") => {
		$crate::syn::token::TokenKind::Div
	};
	("AND") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::And)
	};
	("AS") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::As)
	};
	("BY") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::By)
	};
	("DESC") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::Desc)
	};
	("EXPLAIN") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::Explain)
	};
	("FALSE") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::False)
	};
	("FROM") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::From)
	};
	("GROUP") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::Group)
	};
	("IN") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::In)
	};
	("LET") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::Let)
	};
	("LIMIT") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::Limit)
	};
	("NOT") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::Not)
	};
	("NULL") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::Null)
	};
	("OR") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::Or)
	};
	("ORDER") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::Order)
	};
	("SELECT") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::Select)
	};
	("TRUE") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::True)
	};
	("WHERE") => {
		$crate::syn::token::TokenKind::Keyword($crate::syn::token::Keyword::Where)
	};
}

pub(crate) use t;
