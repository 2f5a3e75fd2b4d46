//! riffle is an embeddable query engine for a small SQL-like language (QL),
//! designed to be dropped into a host application as a filter/query facility.
//!
//! Hosts register row-producing plugins, scalar functions and operator
//! behaviours for their own data types; queries stream rows lazily through a
//! cancellable pipeline, and unused columns are never computed.
//!
//! ```no_run
//! use riffle::ctx::MutableContext;
//! use riffle::exec::Scope;
//!
//! # async fn example() -> Result<(), riffle::err::Error> {
//! let scope = Scope::new_root();
//! let ctx = MutableContext::background().freeze();
//! let query = riffle::syn::parse("SELECT * FROM range(start=1, end=3)")?;
//! let mut rows = query.eval(&ctx, &scope).await;
//! while let Some(row) = rows.next().await {
//! 	let dict = riffle::exec::row_to_object(&ctx, &scope, &row).await;
//! 	println!("{dict}");
//! }
//! scope.close().await;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

#[macro_use]
mod mac;

pub mod cnf;
pub mod ctx;
pub mod err;
pub mod exec;
pub mod fnc;
pub mod protocol;
pub mod ql;
pub mod syn;

pub use crate::err::Error;
pub use crate::exec::Scope;
pub use crate::ql::Value;
