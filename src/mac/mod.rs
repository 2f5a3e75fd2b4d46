/// Creates a new insertion-ordered object of key-value pairs
#[macro_export]
#[doc(hidden)]
macro_rules! obj {
    ($($k:expr => $v:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut m = $crate::ql::Object::default();
        $({
            let v: $crate::ql::Value = $v.into();
            m.insert($k.to_string(), v);
        })*
        m
    }};
}

/// A macro that allows lazily parsing a value from the environment variable,
/// with a fallback default value if the variable is not set or parsing fails.
#[macro_export]
#[doc(hidden)]
macro_rules! lazy_env_parse {
	($key:expr, $t:ty, $default:expr) => {
		once_cell::sync::Lazy::new(|| {
			std::env::var($key)
				.and_then(|s| Ok(s.parse::<$t>().unwrap_or($default)))
				.unwrap_or($default)
		})
	};
}
