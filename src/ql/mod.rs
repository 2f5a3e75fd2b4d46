//! The QL value model and abstract syntax tree.
//!
//! Every AST node implements `Display`, emitting the compact canonical form
//! of the node; parsing that form back yields a deeply-equal AST. The
//! [`fmt::pretty`] helpers produce the human-readable layout instead.

pub(crate) mod array;
pub(crate) mod call;
pub(crate) mod cond;
pub(crate) mod datetime;
pub(crate) mod expr;
pub(crate) mod field;
pub(crate) mod fmt;
pub(crate) mod from;
pub(crate) mod group;
pub(crate) mod ident;
pub(crate) mod lazy;
pub(crate) mod limit;
pub(crate) mod number;
pub(crate) mod object;
pub(crate) mod opaque;
pub(crate) mod operator;
pub(crate) mod order;
pub(crate) mod part;
pub(crate) mod pos;
pub(crate) mod pretty;
pub(crate) mod query;
pub(crate) mod row;
pub(crate) mod statement;
pub mod statements;
pub(crate) mod stored;
pub(crate) mod strand;
pub(crate) mod thunk;
pub(crate) mod value;

pub use array::Array;
pub use call::{Arg, FunctionCall};
pub use cond::Cond;
pub use datetime::Datetime;
pub use expr::{Expr, Literal};
pub use field::{Field, Fields};
pub use from::FromSource;
pub use group::Group;
pub use ident::Ident;
pub use lazy::LazyExpr;
pub use limit::Limit;
pub use number::Number;
pub use object::Object;
pub use opaque::Opaque;
pub use operator::Operator;
pub use order::Order;
pub use part::Part;
pub use pos::{Comment, Comments, Pos};
pub use pretty::{pretty, pretty_statement, FormatOptions};
pub use query::Query;
pub use row::LazyRow;
pub use statement::Statement;
pub use statements::{LetExpr, LetStatement, SelectStatement};
pub use stored::{InMemoryMaterializer, Materializer, RowSource, StoredQuery};
pub use strand::Strand;
pub use thunk::Thunk;
pub use value::Value;
