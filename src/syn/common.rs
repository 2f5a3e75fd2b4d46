use crate::syn::token::Span;

/// A human readable location inside a string.
///
/// Locations are 1 indexed, the first character on the first line being on
/// line 1 column 1.
#[derive(Clone, Copy, Debug)]
pub struct Location {
	pub line: usize,
	/// In chars.
	pub column: usize,
}

impl Location {
	/// Returns the location of the start of a span in the source.
	pub fn of_span_start(source: &str, span: Span) -> Self {
		// Bytes of input before the span.
		let offset = (span.offset as usize).min(source.len());
		// Bytes of input prior to the line being iterated.
		let mut bytes_prior = 0;
		for (line_idx, line) in source.split('\n').enumerate() {
			// +1 for the '\n'
			let bytes_so_far = bytes_prior + line.len() + 1;
			if bytes_so_far > offset {
				let line_offset = offset - bytes_prior;
				let column = line[..line_offset.min(line.len())].chars().count();
				// +1 because line and column are 1 indexed.
				return Self {
					line: line_idx + 1,
					column: column + 1,
				};
			}
			bytes_prior = bytes_so_far;
		}
		// A span pointing past the end of the source locates at the end.
		let lines = source.split('\n').count().max(1);
		Self {
			line: lines,
			column: source.split('\n').last().map(|l| l.chars().count()).unwrap_or(0) + 1,
		}
	}
}
