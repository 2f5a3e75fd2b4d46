pub mod select;
pub mod set;

pub use select::SelectStatement;
pub use set::{LetExpr, LetStatement};
