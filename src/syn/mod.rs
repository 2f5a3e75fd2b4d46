//! The QL tokens, lexer, and parser.

pub mod common;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

use crate::err::Error;
use crate::ql::{Query, Statement};
use parser::Parser;

/// Parse a full program.
pub fn parse(input: &str) -> Result<Query, Error> {
	trace!("Parsing query: {input}");
	let mut parser = Parser::new(input);
	parser.parse_query().map_err(|e| Error::InvalidQuery(e.render_on(input)))
}

/// Parse a single statement.
pub fn parse_statement(input: &str) -> Result<Statement, Error> {
	trace!("Parsing statement: {input}");
	let mut parser = Parser::new(input);
	parser.parse_stmt().map_err(|e| Error::InvalidQuery(e.render_on(input)))
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::err::Error;
	use crate::ql::{Expr, Field, Literal, Operator, Statement};

	fn roundtrip(source: &str) {
		let first = parse(source).unwrap();
		let compact = first.to_string();
		let second = parse(&compact)
			.unwrap_or_else(|e| panic!("compact form {compact:?} failed to parse: {e}"));
		assert_eq!(first, second, "round trip through {compact:?} changed the AST");
	}

	#[test]
	fn parse_simple_select() {
		let query = parse("SELECT * FROM range(start=1, end=3)").unwrap();
		assert_eq!(query.len(), 1);
		let Statement::Select(stmt) = &query[0] else {
			panic!("expected a select statement");
		};
		assert!(stmt.expr.has_all());
		assert_eq!(stmt.what.name.as_str(), "range");
		assert_eq!(stmt.what.args().len(), 2);
	}

	#[test]
	fn parse_keywords_case_insensitively() {
		parse("select * from x where a = 1 group by a order by a desc limit 5").unwrap();
	}

	#[test]
	fn parse_let_forms() {
		let query = parse("LET X = SELECT * FROM range(end=1)  LET Y <= SELECT * FROM X  LET Z = 1 + 2").unwrap();
		assert_eq!(query.len(), 3);
		let Statement::Let(y) = &query[1] else {
			panic!("expected a let statement");
		};
		assert!(y.materialize);
		let Statement::Let(z) = &query[2] else {
			panic!("expected a let statement");
		};
		assert!(!z.materialize);
	}

	#[test]
	fn parse_parameterized_let() {
		let query = parse("LET f(p, q) = SELECT * FROM range(end=p)").unwrap();
		let Statement::Let(stmt) = &query[0] else {
			panic!("expected a let statement");
		};
		assert_eq!(stmt.params.as_deref().map(|p| p.len()), Some(2));
	}

	#[test]
	fn parse_subquery_argument() {
		let query = parse(
			"SELECT * FROM foreach(row=[dict(A=1), dict(A=2)], query={SELECT A*10 AS B FROM scope()})",
		)
		.unwrap();
		let Statement::Select(stmt) = &query[0] else {
			panic!("expected a select statement");
		};
		let args = stmt.what.args();
		assert_eq!(args[0].name.as_str(), "row");
		assert!(matches!(args[1].value.as_ref(), Expr::Subquery(_)));
	}

	#[test]
	fn parse_negative_numbers_require_adjacency() {
		let query = parse("SELECT -5 AS n FROM scope()").unwrap();
		let Statement::Select(stmt) = &query[0] else {
			panic!("expected a select statement");
		};
		let Some(Field::Single {
			expr,
			..
		}) = stmt.expr.first()
		else {
			panic!("expected a field");
		};
		assert_eq!(expr.as_ref(), &Expr::Literal(Literal::Int(-5)));
		// With a space between, the minus is not a negation literal
		parse("SELECT - 5 AS n FROM scope()").unwrap_err();
	}

	#[test]
	fn parse_string_argument_containing_a_dash() {
		let query = parse("SELECT func(return='-') FROM scope()").unwrap();
		let Statement::Select(stmt) = &query[0] else {
			panic!("expected a select statement");
		};
		let Some(Field::Single {
			expr,
			..
		}) = stmt.expr.first()
		else {
			panic!("expected a field");
		};
		let Expr::Call(call) = expr.as_ref() else {
			panic!("expected a call");
		};
		assert_eq!(
			call.args[0].value.as_ref(),
			&Expr::Literal(Literal::Strand("-".into()))
		);
	}

	#[test]
	fn parse_operator_precedence() {
		let query = parse("SELECT a + b * c FROM scope()").unwrap();
		let Statement::Select(stmt) = &query[0] else {
			panic!("expected a select statement");
		};
		let Some(Field::Single {
			expr,
			..
		}) = stmt.expr.first()
		else {
			panic!("expected a field");
		};
		let Expr::Binary {
			o,
			r,
			..
		} = expr.as_ref()
		else {
			panic!("expected a binary expression");
		};
		assert_eq!(*o, Operator::Add);
		assert!(matches!(r.as_ref(), Expr::Binary { o: Operator::Mul, .. }));
	}

	#[test]
	fn parse_errors_carry_an_excerpt() {
		let err = parse("SELECT * FROM range(end=1,,)").unwrap_err();
		let Error::InvalidQuery(rendered) = err else {
			panic!("expected a parse error");
		};
		let text = rendered.to_string();
		assert!(text.contains('^'), "no fault marker in: {text}");
		assert!(text.contains("range(end=1,,)"), "no excerpt in: {text}");
	}

	#[test]
	fn compact_form_roundtrips() {
		for source in [
			"SELECT * FROM range(start=1, end=3)",
			"SELECT *, a AS b, a + 1 AS c FROM x WHERE a = 2 GROUP BY 1 ORDER BY b DESC LIMIT 3",
			"LET X = SELECT * FROM range(end=3)  SELECT * FROM X WHERE _value = 2",
			"LET f(p) = SELECT * FROM range(end=p)",
			"SELECT (1, 2, 3) + (4, 5) FROM scope()",
			"SELECT [1, 'two', NULL] FROM scope()",
			"SELECT a.b[0].c, a[1:2], a[:2], a[1:] FROM scope()",
			"SELECT NOT a AND b OR c FROM scope()",
			"SELECT if(condition=a =~ '.*', then=1, else=2) FROM scope()",
			"SELECT * FROM foreach(row={SELECT * FROM range(end=2)}, query={SELECT _value FROM scope()})",
			"EXPLAIN SELECT 'A' FROM range(end=1)",
			"SELECT `quoted name` FROM scope()",
			"SELECT -5, 0x1f, 0755, 1.5, 2e3 FROM scope()",
			"LET X <= SELECT * FROM range(end=100) -- keep it around",
		] {
			roundtrip(source);
		}
	}

	#[test]
	fn comments_attach_to_statements() {
		let query = parse("// leading comment\nSELECT * FROM scope()").unwrap();
		let Statement::Select(stmt) = &query[0] else {
			panic!("expected a select statement");
		};
		assert_eq!(stmt.comments.0.len(), 1);
		assert_eq!(stmt.comments.0[0].0, "leading comment");
	}

	#[test]
	fn block_comments_attach_too() {
		let query = parse("/* block */ SELECT a /* mid */ AS b FROM scope()").unwrap();
		let Statement::Select(stmt) = &query[0] else {
			panic!("expected a select statement");
		};
		assert_eq!(stmt.comments.0[0].0, "block");
	}
}
