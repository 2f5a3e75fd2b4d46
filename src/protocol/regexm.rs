use crate::exec::Scope;
use crate::ql::Value;

/// A registered regex-match behaviour for host value kinds.
pub trait RegexProtocol: Send + Sync {
	fn applicable(&self, a: &Value, b: &Value) -> bool;
	fn matches(&self, scope: &Scope, a: &Value, b: &Value) -> bool;
}

/// Check whether `a` matches the pattern `b`.
///
/// The patterns `.`, `.*` and the empty string always match. Compilation is
/// case-insensitive and compiled patterns are cached on the scope context
/// under `__re<pattern>`. A sequence on the left matches when any element
/// matches.
pub fn regex_match(scope: &Scope, a: &Value, b: &Value) -> bool {
	let pattern = match b {
		Value::Strand(p) => p.as_str(),
		_ => {
			if let Some(imp) =
				super::search(scope, scope.protocols().regexm_impls(), |i| i.applicable(a, b))
			{
				return imp.matches(scope, a, b);
			}
			return false;
		}
	};
	// These patterns match everything, skip the compile
	if matches!(pattern, "" | "." | ".*") {
		return true;
	}
	match a {
		Value::Array(items) => items.iter().any(|item| match_one(scope, item, pattern)),
		a => match_one(scope, a, pattern),
	}
}

fn match_one(scope: &Scope, a: &Value, pattern: &str) -> bool {
	let Some(re) = scope.cached_regex(pattern) else {
		return false;
	};
	match a {
		Value::Strand(v) => re.is_match(v.as_str()),
		Value::Null => false,
		v => re.is_match(v.as_raw_string().as_str()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ql::Array;

	#[test]
	fn trivial_patterns_always_match() {
		let scope = Scope::new_bare();
		assert!(regex_match(&scope, &Value::from("anything"), &Value::from("")));
		assert!(regex_match(&scope, &Value::from("anything"), &Value::from(".")));
		assert!(regex_match(&scope, &Value::from("anything"), &Value::from(".*")));
	}

	#[test]
	fn matching_is_case_insensitive() {
		let scope = Scope::new_bare();
		assert!(regex_match(&scope, &Value::from("Hello World"), &Value::from("^hello")));
		assert!(!regex_match(&scope, &Value::from("Goodbye"), &Value::from("^hello")));
	}

	#[test]
	fn sequences_match_when_any_element_matches() {
		let scope = Scope::new_bare();
		let arr = Value::Array(Array::from(vec!["alpha", "beta"]));
		assert!(regex_match(&scope, &arr, &Value::from("^bet")));
		assert!(!regex_match(&scope, &arr, &Value::from("^gamma")));
	}

	#[test]
	fn compiled_patterns_are_cached() {
		let scope = Scope::new_bare();
		assert!(regex_match(&scope, &Value::from("abc"), &Value::from("b+")));
		// The cached entry is reused on the second match
		assert!(scope.cached_regex("b+").is_some());
	}
}
