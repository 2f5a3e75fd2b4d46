use crate::syn::common::Location;
use crate::syn::token::Span;
use std::fmt;

/// An error produced while parsing, pointing at a span of the source.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct SyntaxError {
	pub message: String,
	pub span: Span,
	pub explain: Option<&'static str>,
}

impl SyntaxError {
	pub fn new(message: impl Into<String>, span: Span) -> Self {
		Self {
			message: message.into(),
			span,
			explain: None,
		}
	}

	pub fn with_explain(mut self, explain: &'static str) -> Self {
		self.explain = Some(explain);
		self
	}

	/// Render this error against the source it was produced from.
	pub fn render_on(&self, source: &str) -> RenderedError {
		let location = Location::of_span_start(source, self.span);
		let snippet = Snippet::from_source_location(source, location, self.explain);
		RenderedError {
			text: self.message.clone(),
			snippets: vec![snippet],
		}
	}
}

impl fmt::Display for SyntaxError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.message)
	}
}

/// A parse error rendered against its source, with a marked excerpt.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct RenderedError {
	pub text: String,
	pub snippets: Vec<Snippet>,
}

impl fmt::Display for RenderedError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "{}", self.text)?;
		for s in self.snippets.iter() {
			writeln!(f, "{}", s)?;
		}
		Ok(())
	}
}

/// Whether the snippet was truncated.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[non_exhaustive]
pub enum Truncation {
	/// The snippet wasn't truncated
	None,
	/// The snippet was truncated at the start
	Start,
	/// The snippet was truncated at the end
	End,
	/// Both sides of the snippet were truncated.
	Both,
}

/// A piece of the source code with a location and an optional explanation.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Snippet {
	/// The part of the original source code,
	source: String,
	/// Whether part of the source line was truncated.
	truncation: Truncation,
	/// The location of the snippet in the original source code.
	location: Location,
	/// The offset, in chars, into the snippet where the location is.
	offset: usize,
	/// A possible explanation for this snippet.
	explain: Option<String>,
}

impl Snippet {
	/// How long the source line can be before it gets truncated.
	const MAX_SOURCE_DISPLAY_LEN: usize = 80;
	/// How far the error can be into the source line before the start gets
	/// truncated.
	const MAX_ERROR_LINE_OFFSET: usize = 50;

	pub fn from_source_location(
		source: &str,
		location: Location,
		explain: Option<&'static str>,
	) -> Self {
		let line = source.split('\n').nth(location.line - 1).unwrap_or("");
		let (line, truncation, offset) = Self::truncate_line(line, location.column - 1);

		Snippet {
			source: line.to_owned(),
			truncation,
			location,
			offset,
			explain: explain.map(|x| x.into()),
		}
	}

	/// Trims whitespace of a line and truncates the string around the
	/// target column if it is too long.
	///
	/// Returns the trimmed string, how it was truncated, and the offset
	/// into the truncated string where the target column is located.
	fn truncate_line(mut line: &str, target_col: usize) -> (&str, Truncation, usize) {
		// Offset in characters from the start of the string.
		let mut offset = 0;
		for (i, (idx, c)) in line.char_indices().enumerate() {
			// If i == target_col the error is in the leading whitespace, so
			// return early.
			if i == target_col || !c.is_whitespace() {
				line = &line[idx..];
				offset = target_col.saturating_sub(i);
				break;
			}
		}

		line = line.trim_end();
		// Truncation is none because only truncated non-whitespace counts.
		let mut truncation = Truncation::None;

		if offset > Self::MAX_ERROR_LINE_OFFSET {
			// The error is too far to the right, truncate everything to the
			// left, keeping some prefix for context.
			let too_much_offset = offset - 10;
			let mut chars = line.chars();
			for _ in 0..too_much_offset {
				chars.next();
			}
			offset = 10;
			line = chars.as_str();
			truncation = Truncation::Start;
		}

		if line.chars().count() > Self::MAX_SOURCE_DISPLAY_LEN {
			// The line is too long, truncate the end.
			let mut size = Self::MAX_SOURCE_DISPLAY_LEN - 3;
			if truncation == Truncation::Start {
				truncation = Truncation::Both;
				size -= 3;
			} else {
				truncation = Truncation::End
			}

			if let Some((truncate_index, _)) = line.char_indices().nth(size) {
				line = &line[..truncate_index];
			}
		}

		(line, truncation, offset)
	}
}

impl fmt::Display for Snippet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// Extra spacing for the line number
		let spacing = self.location.line.ilog10() as usize + 1;
		for _ in 0..spacing {
			f.write_str(" ")?;
		}
		f.write_str(" |\n")?;
		write!(f, "{:>spacing$} | ", self.location.line)?;
		match self.truncation {
			Truncation::None => {
				writeln!(f, "{}", self.source)?;
			}
			Truncation::Start => {
				writeln!(f, "...{}", self.source)?;
			}
			Truncation::End => {
				writeln!(f, "{}...", self.source)?;
			}
			Truncation::Both => {
				writeln!(f, "...{}...", self.source)?;
			}
		}

		let error_offset = self.offset
			+ if matches!(self.truncation, Truncation::Start | Truncation::Both) {
				3
			} else {
				0
			};
		for _ in 0..spacing {
			f.write_str(" ")?;
		}
		f.write_str(" | ")?;
		for _ in 0..error_offset {
			f.write_str(" ")?;
		}
		write!(f, "^ ")?;
		if let Some(ref explain) = self.explain {
			write!(f, "{explain}")?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn truncate_whitespace() {
		let source = "\n\n\n\t      $     \t";
		let offset = source.char_indices().find(|(_, c)| *c == '$').unwrap().0;
		let span = Span {
			offset: offset as u32,
			len: 1,
		};
		let location = Location::of_span_start(source, span);
		let snippet = Snippet::from_source_location(source, location, None);
		assert_eq!(snippet.truncation, Truncation::None);
		assert_eq!(snippet.offset, 0);
		assert_eq!(snippet.source.as_str(), "$");
	}

	#[test]
	fn truncate_start() {
		let source = "     aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa $     \t";
		let offset = source.char_indices().find(|(_, c)| *c == '$').unwrap().0;
		let span = Span {
			offset: offset as u32,
			len: 1,
		};
		let location = Location::of_span_start(source, span);
		let snippet = Snippet::from_source_location(source, location, None);
		assert_eq!(snippet.truncation, Truncation::Start);
		assert_eq!(snippet.offset, 10);
		assert_eq!(snippet.source.as_str(), "aaaaaaaaa $");
	}

	#[test]
	fn render_marks_the_fault() {
		let error = RenderedError {
			text: "some_error".to_string(),
			snippets: vec![Snippet {
				source: "hallo error".to_owned(),
				truncation: Truncation::None,
				location: Location {
					line: 4,
					column: 10,
				},
				offset: 6,
				explain: Some("this is wrong".to_owned()),
			}],
		};
		let rendered = format!("{}", error);
		assert!(rendered.contains("4 | hallo error"));
		assert!(rendered.contains("^ this is wrong"));
	}
}
