use crate::syn::lexer::Lexer;
use crate::syn::token::{t, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
	Lexer::new(source.as_bytes())
		.filter(|t| t.kind != TokenKind::WhiteSpace)
		.map(|t| t.kind)
		.collect()
}

#[test]
fn lexes_operators() {
	assert_eq!(
		kinds("= != <> < <= > >= =~ + - * / ( ) [ ] { } , . :"),
		vec![
			t!("="),
			t!("!="),
			t!("!="),
			t!("<"),
			t!("<="),
			t!(">"),
			t!(">="),
			t!("=~"),
			t!("+"),
			t!("-"),
			t!("*"),
			t!("/"),
			t!("("),
			t!(")"),
			t!("["),
			t!("]"),
			t!("{"),
			t!("}"),
			t!(","),
			t!("."),
			t!(":"),
		]
	);
}

#[test]
fn keywords_are_case_insensitive() {
	assert_eq!(kinds("select SELECT SeLeCt"), vec![t!("SELECT"), t!("SELECT"), t!("SELECT")]);
}

#[test]
fn lexes_numbers() {
	let mut lexer = Lexer::new(b"42");
	assert_eq!(lexer.next_token().kind, TokenKind::Int);
	assert_eq!(lexer.int, Some(42));

	let mut lexer = Lexer::new(b"0x1F");
	assert_eq!(lexer.next_token().kind, TokenKind::Int);
	assert_eq!(lexer.int, Some(31));

	let mut lexer = Lexer::new(b"0755");
	assert_eq!(lexer.next_token().kind, TokenKind::Int);
	assert_eq!(lexer.int, Some(493));

	let mut lexer = Lexer::new(b"1.5");
	assert_eq!(lexer.next_token().kind, TokenKind::Float);
	assert_eq!(lexer.float, Some(1.5));

	let mut lexer = Lexer::new(b"2e3");
	assert_eq!(lexer.next_token().kind, TokenKind::Float);
	assert_eq!(lexer.float, Some(2000.0));
}

#[test]
fn a_dot_without_digits_is_member_access() {
	assert_eq!(kinds("1.foo"), vec![TokenKind::Int, t!("."), TokenKind::Ident]);
}

#[test]
fn lexes_strings() {
	let mut lexer = Lexer::new(br#"'it\'s'"#);
	assert_eq!(lexer.next_token().kind, TokenKind::Strand);
	assert_eq!(lexer.string.take().unwrap(), "it's");

	let mut lexer = Lexer::new(br#""double""#);
	assert_eq!(lexer.next_token().kind, TokenKind::Strand);
	assert_eq!(lexer.string.take().unwrap(), "double");

	let mut lexer = Lexer::new(b"'''raw ' string'''");
	assert_eq!(lexer.next_token().kind, TokenKind::Strand);
	assert_eq!(lexer.string.take().unwrap(), "raw ' string");

	let mut lexer = Lexer::new(b"'-'");
	assert_eq!(lexer.next_token().kind, TokenKind::Strand);
	assert_eq!(lexer.string.take().unwrap(), "-");
}

#[test]
fn lexes_comments() {
	assert_eq!(
		kinds("a // line\nb -- dashed\nc /* block */ d"),
		vec![
			TokenKind::Ident,
			TokenKind::LineComment,
			TokenKind::Ident,
			TokenKind::LineComment,
			TokenKind::Ident,
			TokenKind::BlockComment,
			TokenKind::Ident,
		]
	);
}

#[test]
fn lexes_quoted_idents() {
	let mut lexer = Lexer::new(b"`with space`");
	assert_eq!(lexer.next_token().kind, TokenKind::Ident);
	assert_eq!(lexer.string.take().unwrap(), "with space");
}
