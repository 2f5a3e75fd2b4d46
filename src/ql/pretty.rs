use crate::ql::field::Field;
use crate::ql::query::Query;
use crate::ql::statement::Statement;
use crate::ql::statements::select::SelectStatement;
use crate::ql::statements::set::{LetExpr, LetStatement};

/// Layout options for the pretty reformatter.
///
/// The compact canonical form is produced by `Display` on any node; these
/// options only affect the human-readable layout.
#[derive(Clone, Copy, Debug)]
pub struct FormatOptions {
	/// The soft maximum line width
	pub max_width: usize,
	/// The indent, in spaces, for broken-out clauses
	pub indent: usize,
}

impl Default for FormatOptions {
	fn default() -> Self {
		Self {
			max_width: 80,
			indent: 2,
		}
	}
}

/// Reformat a query for display.
///
/// Each statement tries a sequence of layouts, from a single line to one
/// clause per line to one column per line, and keeps the first one which
/// stays within the width limit; if none does, the most broken layout (the
/// one with the fewest over-long lines) wins. Attached comments are
/// re-emitted before their owners and force line breaks.
pub fn pretty(query: &Query, opts: &FormatOptions) -> String {
	let mut out = String::new();
	for (i, stmt) in query.iter().enumerate() {
		if i > 0 {
			out.push_str("\n\n");
		}
		out.push_str(&pretty_statement(stmt, opts));
	}
	out
}

/// Reformat a single statement for display.
pub fn pretty_statement(stmt: &Statement, opts: &FormatOptions) -> String {
	let mut out = String::new();
	for comment in comments_of(stmt) {
		out.push_str(&format!("// {comment}\n"));
	}
	let candidates = layouts(stmt, opts);
	let chosen = choose(candidates, opts.max_width);
	out.push_str(&chosen);
	out
}

fn comments_of(stmt: &Statement) -> Vec<String> {
	match stmt {
		Statement::Let(s) => s.comments.0.iter().map(|c| c.0.clone()).collect(),
		Statement::Select(s) => s.comments.0.iter().map(|c| c.0.clone()).collect(),
	}
}

// Pick the first candidate whose lines all fit; otherwise the last (the
// most broken one uses the fewest characters per line).
fn choose(candidates: Vec<String>, max_width: usize) -> String {
	let fits = |s: &String| s.lines().all(|l| l.chars().count() <= max_width);
	let count = candidates.len();
	candidates
		.into_iter()
		.enumerate()
		.find(|(i, c)| fits(c) || *i + 1 == count)
		.map(|(_, c)| c)
		.expect("at least one layout candidate exists")
}

fn layouts(stmt: &Statement, opts: &FormatOptions) -> Vec<String> {
	match stmt {
		Statement::Select(s) => select_layouts(s, opts),
		Statement::Let(s) => let_layouts(s, opts),
	}
}

fn select_layouts(stmt: &SelectStatement, opts: &FormatOptions) -> Vec<String> {
	let mut candidates = Vec::new();
	let fields_have_comments =
		stmt.expr.iter().any(|f| matches!(f, Field::Single { comments, .. } if !comments.is_empty()));
	// A single line, unless a field comment forces a break
	if !fields_have_comments {
		candidates.push(stmt.to_string());
	}
	// One clause per line
	if !fields_have_comments {
		candidates.push(clause_lines(stmt).join("\n"));
	}
	// One clause per line with one column per line
	let pad = " ".repeat(opts.indent);
	let mut lines = Vec::new();
	let mut head = String::new();
	if stmt.explain {
		head.push_str("EXPLAIN ");
	}
	head.push_str("SELECT");
	lines.push(head);
	let count = stmt.expr.len();
	for (i, field) in stmt.expr.iter().enumerate() {
		if let Field::Single {
			comments,
			..
		} = field
		{
			for comment in &comments.0 {
				lines.push(format!("{pad}// {}", comment.0));
			}
		}
		let sep = if i + 1 < count {
			","
		} else {
			""
		};
		lines.push(format!("{pad}{field}{sep}"));
	}
	let mut rest = clause_lines(stmt);
	rest.remove(0);
	lines.extend(rest);
	candidates.push(lines.join("\n"));
	candidates
}

// The statement split at clause boundaries, select list still inline.
fn clause_lines(stmt: &SelectStatement) -> Vec<String> {
	let mut lines = Vec::new();
	let explain = if stmt.explain {
		"EXPLAIN "
	} else {
		""
	};
	lines.push(format!("{explain}SELECT {}", stmt.expr));
	lines.push(format!("FROM {}", stmt.what));
	if let Some(v) = &stmt.cond {
		lines.push(v.to_string());
	}
	if let Some(v) = &stmt.group {
		lines.push(v.to_string());
	}
	if let Some(v) = &stmt.order {
		lines.push(v.to_string());
	}
	if let Some(v) = &stmt.limit {
		lines.push(v.to_string());
	}
	lines
}

fn let_layouts(stmt: &LetStatement, opts: &FormatOptions) -> Vec<String> {
	let mut candidates = vec![stmt.to_string()];
	// A SELECT right-hand side can move to its own indented lines
	if let LetExpr::Select(select) = &stmt.what {
		let op = if stmt.materialize {
			"<="
		} else {
			"="
		};
		let pad = " ".repeat(opts.indent);
		let params = match &stmt.params {
			Some(params) => {
				let names: Vec<String> = params.iter().map(|p| p.to_string()).collect();
				format!("({})", names.join(", "))
			}
			None => String::new(),
		};
		let select_stmt = Statement::Select(select.clone());
		for layout in layouts(&select_stmt, opts) {
			let mut lines = vec![format!("LET {}{params} {op}", stmt.name)];
			for line in layout.lines() {
				lines.push(format!("{pad}{line}"));
			}
			candidates.push(lines.join("\n"));
		}
	}
	candidates
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::syn;

	#[test]
	fn short_statements_stay_on_one_line() {
		let query = syn::parse("SELECT * FROM range(start=1, end=3)").unwrap();
		let opts = FormatOptions::default();
		assert_eq!(pretty(&query, &opts), "SELECT * FROM range(start=1, end=3)");
	}

	#[test]
	fn long_statements_break_at_clauses() {
		let query = syn::parse(
			"SELECT first_column AS a, second_column AS b, third_column AS c \
			 FROM some_plugin(alpha=1, beta=2) WHERE a = 1 AND b = 2 ORDER BY a LIMIT 5",
		)
		.unwrap();
		let opts = FormatOptions {
			max_width: 60,
			indent: 2,
		};
		let out = pretty(&query, &opts);
		assert!(out.lines().count() > 1);
		assert!(out.lines().any(|l| l.starts_with("FROM ")));
		assert!(out.lines().any(|l| l.starts_with("WHERE ")));
	}

	#[test]
	fn very_long_select_lists_break_per_column() {
		let query = syn::parse(
			"SELECT first_column AS aaaaaaaaaaaaaaaa, second_column AS bbbbbbbbbbbbbbbb \
			 FROM some_plugin()",
		)
		.unwrap();
		let opts = FormatOptions {
			max_width: 30,
			indent: 2,
		};
		let out = pretty(&query, &opts);
		assert!(out.contains("SELECT\n"));
		assert!(out.lines().any(|l| l.trim_end().ends_with(',')));
	}

	#[test]
	fn comments_are_reemitted() {
		let query = syn::parse("// find the answer\nSELECT * FROM scope()").unwrap();
		let out = pretty(&query, &FormatOptions::default());
		assert!(out.starts_with("// find the answer\n"));
		assert!(out.contains("SELECT * FROM scope()"));
	}
}
