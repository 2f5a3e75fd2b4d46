use crate::ctx::Context;
use crate::exec::Scope;
use crate::fnc::args::{self, ArgKind, ArgSpec};
use crate::fnc::{CallArgs, Function, FunctionInfo};
use crate::ql::{Array, Number, Value};
use async_trait::async_trait;

/// `split(string, sep)` — splits a string into an array of strings.
pub struct Split;

#[async_trait]
impl Function for Split {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		const ARGS: &[ArgSpec] = &[
			ArgSpec::required("string", ArgKind::Strand, "the string to split"),
			ArgSpec::required("sep", ArgKind::Strand, "the separator"),
		];
		FunctionInfo {
			name: "split",
			doc: "Splits a string around a separator",
			args: ARGS,
			aggregate: false,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args.args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("split: {e}"));
				return Value::Null;
			}
		};
		let (Some(string), Some(sep)) = (extracted.strand("string"), extracted.strand("sep"))
		else {
			return Value::Null;
		};
		Value::Array(string.split(sep.as_str()).map(Value::from).collect::<Array>())
	}
}

/// `format(format, args)` — printf-style string formatting.
///
/// Supports the `%v`, `%s`, `%d`, `%f` and `%%` verbs, consuming values
/// from the `args` sequence in order.
pub struct Format;

#[async_trait]
impl Function for Format {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		const ARGS: &[ArgSpec] = &[
			ArgSpec::required("format", ArgKind::Strand, "the format string"),
			ArgSpec::optional("args", ArgKind::Any, "the values to interpolate"),
		];
		FunctionInfo {
			name: "format",
			doc: "Formats values into a string, printf style",
			args: ARGS,
			aggregate: false,
			version: 1,
		}
	}

	async fn call(&self, ctx: &Context, scope: &Scope, args: CallArgs) -> Value {
		let extracted = match args::extract(ctx, scope, self.info(scope).args, &args.args).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("format: {e}"));
				return Value::Null;
			}
		};
		let Some(format) = extracted.strand("format") else {
			return Value::Null;
		};
		let values = match extracted.get("args") {
			Some(Value::Array(items)) => items.0.clone(),
			Some(v) => vec![v.clone()],
			None => Vec::new(),
		};
		Value::from(render(&format, &values))
	}
}

fn render(format: &str, values: &[Value]) -> String {
	let mut out = String::with_capacity(format.len());
	let mut values = values.iter();
	let mut chars = format.chars().peekable();
	while let Some(c) = chars.next() {
		if c != '%' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some('%') => out.push('%'),
			Some('v') | Some('s') => match values.next() {
				Some(v) => out.push_str(&v.as_raw_string()),
				None => out.push_str("%!(MISSING)"),
			},
			Some('d') => match values.next() {
				Some(Value::Number(n)) => out.push_str(&n.as_int().to_string()),
				Some(v) => out.push_str(&v.as_raw_string()),
				None => out.push_str("%!(MISSING)"),
			},
			Some('f') => match values.next() {
				Some(Value::Number(n)) => {
					out.push_str(&Number::Float(n.as_float()).to_string())
				}
				Some(v) => out.push_str(&v.as_raw_string()),
				None => out.push_str("%!(MISSING)"),
			},
			Some(other) => {
				out.push('%');
				out.push(other);
			}
			None => out.push('%'),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn render_consumes_values_in_order() {
		let values = vec![Value::from("x"), Value::from(3)];
		assert_eq!(render("%s=%d%%", &values), "x=3%");
		assert_eq!(render("%v and %v and %v", &values), "x and 3 and %!(MISSING)");
	}
}
