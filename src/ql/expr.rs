use crate::ctx::Context;
use crate::err::Error;
use crate::exec::Scope;
use crate::fnc;
use crate::ql::array::Array;
use crate::ql::call::FunctionCall;
use crate::ql::fmt::Fmt;
use crate::ql::ident::Ident;
use crate::ql::number::Number;
use crate::ql::operator::Operator;
use crate::ql::part::Part;
use crate::ql::statements::select::SelectStatement;
use crate::ql::stored::StoredQuery;
use crate::ql::strand::Strand;
use crate::ql::value::Value;
use crate::protocol;
use async_recursion::async_recursion;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// A literal value appearing directly in the query text.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Literal {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Strand(Strand),
}

impl Eq for Literal {}

impl Literal {
	pub(crate) fn to_value(&self) -> Value {
		match self {
			Literal::Null => Value::Null,
			Literal::Bool(v) => Value::Bool(*v),
			Literal::Int(v) => Value::Number(Number::Int(*v)),
			Literal::Float(v) => Value::Number(Number::Float(*v)),
			Literal::Strand(v) => Value::Strand(v.clone()),
		}
	}
}

impl Display for Literal {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Literal::Null => f.write_str("NULL"),
			Literal::Bool(true) => f.write_str("TRUE"),
			Literal::Bool(false) => f.write_str("FALSE"),
			Literal::Int(v) => Display::fmt(v, f),
			Literal::Float(v) => {
				if v.is_finite() && v.fract() == 0.0 {
					write!(f, "{v:.1}")
				} else {
					Display::fmt(v, f)
				}
			}
			Literal::Strand(v) => Display::fmt(v, f),
		}
	}
}

/// An expression tree node.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Expr {
	/// A literal value
	Literal(Literal),
	/// A symbol resolved against the scope
	Symbol(Ident),
	/// `NOT expr`
	Not(Box<Expr>),
	/// A binary operation
	Binary {
		l: Box<Expr>,
		o: Operator,
		r: Box<Expr>,
	},
	/// A parenthesized comma list, which evaluates to an array
	Comma(Vec<Expr>),
	/// An `[ ... ]` array literal
	Array(Vec<Expr>),
	/// A parenthesized single expression
	Paren(Box<Expr>),
	/// A function invocation
	Call(FunctionCall),
	/// A member access step
	Member {
		expr: Box<Expr>,
		part: Part,
	},
	/// A `{ SELECT ... }` subquery
	Subquery(Arc<SelectStatement>),
}

impl Eq for Expr {}

impl Default for Expr {
	fn default() -> Self {
		Expr::Literal(Literal::Null)
	}
}

impl Expr {
	/// Process this expression, returning a reduced concrete value.
	///
	/// Evaluation never fails with a QL-level error: missing names, protocol
	/// misses and arithmetic edge cases all reduce to defined fallbacks. The
	/// returned error covers internal invariants only.
	#[async_recursion]
	pub(crate) async fn compute(&self, ctx: &Context, scope: &Scope) -> Result<Value, Error> {
		if ctx.is_done() {
			return Ok(Value::Null);
		}
		match self {
			Expr::Literal(v) => Ok(v.to_value()),
			Expr::Symbol(name) => {
				let (val, present) = scope.resolve(ctx, name.as_str()).await;
				if !present && !val.is_null() {
					scope.tracev(format_args!("Symbol {name} resolved to a default value"));
				}
				Ok(val)
			}
			Expr::Not(v) => {
				let v = v.compute(ctx, scope).await?;
				let v = protocol::delazify(ctx, v).await;
				Ok(Value::Bool(!protocol::truthy(scope, &v)))
			}
			Expr::Binary {
				l,
				o,
				r,
			} => {
				let l = l.compute(ctx, scope).await?;
				let l = protocol::delazify(ctx, l).await;
				// Short circuit the boolean operators
				match o {
					Operator::Or if protocol::truthy(scope, &l) => {
						return Ok(Value::Bool(true));
					}
					Operator::And if !protocol::truthy(scope, &l) => {
						return Ok(Value::Bool(false));
					}
					_ => (),
				}
				let r = r.compute(ctx, scope).await?;
				let r = protocol::delazify(ctx, r).await;
				Ok(match o {
					Operator::Or | Operator::And => Value::Bool(protocol::truthy(scope, &r)),
					Operator::Equal => Value::Bool(protocol::eq(scope, &l, &r)),
					Operator::NotEqual => Value::Bool(!protocol::eq(scope, &l, &r)),
					Operator::LessThan => Value::Bool(protocol::lt(scope, &l, &r)),
					Operator::MoreThan => Value::Bool(protocol::gt(scope, &l, &r)),
					Operator::LessThanOrEqual => {
						Value::Bool(protocol::lt(scope, &l, &r) || protocol::eq(scope, &l, &r))
					}
					Operator::MoreThanOrEqual => {
						Value::Bool(protocol::gt(scope, &l, &r) || protocol::eq(scope, &l, &r))
					}
					Operator::In => Value::Bool(protocol::membership(scope, &l, &r)),
					Operator::Matches => Value::Bool(protocol::regex_match(scope, &l, &r)),
					Operator::Add => protocol::add(ctx, scope, l, r).await,
					Operator::Sub => protocol::sub(scope, l, r),
					Operator::Mul => protocol::mul(scope, l, r),
					Operator::Div => protocol::div(scope, l, r),
				})
			}
			Expr::Comma(items) | Expr::Array(items) => {
				let mut arr = Array::with_capacity(items.len());
				for item in items {
					arr.push(item.compute(ctx, scope).await?);
				}
				Ok(Value::Array(arr))
			}
			Expr::Paren(v) => v.compute(ctx, scope).await,
			Expr::Call(call) => fnc::run(ctx, scope, call).await,
			Expr::Member {
				expr,
				part,
			} => {
				let base = expr.compute(ctx, scope).await?;
				let base = protocol::delazify(ctx, base).await;
				match part {
					Part::Field(name) => {
						let key = Value::from(name.as_str());
						Ok(protocol::assoc(ctx, scope, &base, &key).await.0)
					}
					Part::Index(idx) => {
						let key = idx.compute(ctx, scope).await?;
						let key = protocol::delazify(ctx, key).await;
						Ok(protocol::assoc(ctx, scope, &base, &key).await.0)
					}
					Part::Slice {
						start,
						end,
					} => {
						let start = match start {
							Some(e) => Some(e.compute(ctx, scope).await?),
							None => None,
						};
						let end = match end {
							Some(e) => Some(e.compute(ctx, scope).await?),
							None => None,
						};
						Ok(slice(&base, start, end))
					}
				}
			}
			Expr::Subquery(stmt) => {
				let query = StoredQuery::select(stmt.clone(), scope.clone());
				let rows = query.collect(ctx, scope).await;
				reduce_rows(ctx, scope, rows).await
			}
		}
	}
}

/// Reduce a collected subquery result to a single value.
///
/// A result of exactly one row with one column reduces to that cell; any
/// other shape reduces to the materialized row sequence.
pub(crate) async fn reduce_rows(
	ctx: &Context,
	scope: &Scope,
	rows: Vec<Value>,
) -> Result<Value, Error> {
	let mut out = Array::with_capacity(rows.len());
	for row in &rows {
		out.push(Value::Object(crate::exec::row_to_object(ctx, scope, row).await));
	}
	if out.len() == 1 {
		let only = &out[0];
		if let Value::Object(obj) = only {
			if obj.len() == 1 {
				return Ok(obj.values().next().cloned().unwrap_or_default());
			}
		}
	}
	Ok(Value::Array(out))
}

fn slice(base: &Value, start: Option<Value>, end: Option<Value>) -> Value {
	let bound = |v: Option<Value>, default: usize, len: usize| match v {
		Some(Value::Number(n)) => {
			let i = n.as_int();
			if i < 0 {
				len.saturating_sub(i.unsigned_abs() as usize)
			} else {
				(i as usize).min(len)
			}
		}
		_ => default,
	};
	match base {
		Value::Array(arr) => {
			let len = arr.len();
			let s = bound(start, 0, len);
			let e = bound(end, len, len);
			if s >= e {
				Value::Array(Array::new())
			} else {
				Value::Array(Array(arr.0[s..e].to_vec()))
			}
		}
		Value::Strand(v) => {
			let chars: Vec<char> = v.chars().collect();
			let len = chars.len();
			let s = bound(start, 0, len);
			let e = bound(end, len, len);
			if s >= e {
				Value::from("")
			} else {
				Value::from(chars[s..e].iter().collect::<String>())
			}
		}
		_ => Value::Null,
	}
}

impl Display for Expr {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		match self {
			Expr::Literal(v) => Display::fmt(v, f),
			Expr::Symbol(v) => Display::fmt(v, f),
			Expr::Not(v) => write!(f, "NOT {v}"),
			Expr::Binary {
				l,
				o,
				r,
			} => write!(f, "{l} {o} {r}"),
			Expr::Comma(items) => write!(f, "({})", Fmt::comma_separated(items.iter())),
			Expr::Array(items) => write!(f, "[{}]", Fmt::comma_separated(items.iter())),
			Expr::Paren(v) => write!(f, "({v})"),
			Expr::Call(v) => Display::fmt(v, f),
			Expr::Member {
				expr,
				part,
			} => write!(f, "{expr}{part}"),
			Expr::Subquery(v) => write!(f, "{{ {v} }}"),
		}
	}
}
