use once_cell::sync::Lazy;

/// How deep a chain of lazy values may be reduced before yielding Null.
pub const MAX_LAZY_DEPTH: usize = 10;

/// The maximum predicted size, in bytes, of a string produced by the
/// string-repetition operator. Larger products return Null.
pub const MAX_STRAND_PRODUCT: usize = 100 * 1024 * 1024;

/// How long a single scope destructor may run before it is abandoned.
pub const DESTRUCTOR_TIMEOUT_SECS: u64 = 60;

/// Ops-per-second rates above this threshold disable throttling entirely.
pub const THROTTLE_DISABLE_RATE: u64 = 100_000;

/// How many statements deep a query may recurse while parsing.
pub const MAX_QUERY_RECURSION: usize = 20;

/// How many objects and arrays deep a query may recurse while parsing.
pub const MAX_OBJECT_RECURSION: usize = 100;

/// The per-stream capacity of the bounded row channels.
pub static ROW_CHANNEL_SIZE: Lazy<usize> = lazy_env_parse!("RIFFLE_ROW_CHANNEL_SIZE", usize, 128);

/// The maximum number of parallel workers a `foreach` invocation may request.
pub static MAX_FOREACH_WORKERS: Lazy<usize> = lazy_env_parse!("RIFFLE_MAX_FOREACH_WORKERS", usize, 64);
