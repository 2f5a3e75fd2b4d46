use crate::ctx::Context;
use crate::exec::Scope;
use crate::ql::expr::Expr;
use crate::ql::value::Value;
use crate::protocol;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A captured (expression, scope) pair reduced on demand.
///
/// `reduce` evaluates against the scope captured at construction time and
/// memoizes the result; `reduce_with_scope` evaluates against a caller
/// scope, used when the expression is passed as a function argument so that
/// free variables resolve at the call site.
#[derive(Clone)]
pub struct LazyExpr(Arc<LazyInner>);

struct LazyInner {
	expr: Arc<Expr>,
	scope: Scope,
	memo: Mutex<Option<Value>>,
	reducing: AtomicBool,
}

impl LazyExpr {
	pub(crate) fn new(expr: Arc<Expr>, scope: Scope) -> Self {
		Self(Arc::new(LazyInner {
			expr,
			scope,
			memo: Mutex::new(None),
			reducing: AtomicBool::new(false),
		}))
	}

	/// The captured expression
	pub fn expr(&self) -> &Arc<Expr> {
		&self.0.expr
	}

	/// Reduce against the captured scope, memoizing the result.
	pub async fn reduce(&self, ctx: &Context) -> Value {
		if let Some(v) = self.0.memo.lock().unwrap().clone() {
			return v;
		}
		// A re-entrant reduction means the expression refers to itself.
		// Short circuit to Null so self-referential bindings cannot loop.
		if self.0.reducing.swap(true, Ordering::SeqCst) {
			trace!("Recursive reduction of lazy expression {}; returning NULL", self.0.expr);
			return Value::Null;
		}
		let v = self.eval_in(ctx, &self.0.scope).await;
		*self.0.memo.lock().unwrap() = Some(v.clone());
		self.0.reducing.store(false, Ordering::SeqCst);
		v
	}

	/// Reduce against the given scope, without touching the memo.
	pub async fn reduce_with_scope(&self, ctx: &Context, scope: &Scope) -> Value {
		if self.0.reducing.swap(true, Ordering::SeqCst) {
			trace!("Recursive reduction of lazy expression {}; returning NULL", self.0.expr);
			return Value::Null;
		}
		let v = self.eval_in(ctx, scope).await;
		self.0.reducing.store(false, Ordering::SeqCst);
		v
	}

	#[async_recursion::async_recursion]
	async fn eval_in(&self, ctx: &Context, scope: &Scope) -> Value {
		let v = match self.0.expr.compute(ctx, scope).await {
			Ok(v) => v,
			Err(e) => {
				scope.log(format_args!("Error reducing {}: {e}", self.0.expr));
				Value::Null
			}
		};
		protocol::delazify(ctx, v).await
	}

	/// Check whether two lazy expressions share the same state
	pub fn same(&self, other: &LazyExpr) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Debug for LazyExpr {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.debug_struct("LazyExpr").field("expr", &self.0.expr).finish()
	}
}

impl Display for LazyExpr {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(&self.0.expr, f)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;
	use crate::ql::expr::Literal;
	use crate::ql::Ident;
	use crate::ql::Operator;

	#[tokio::test]
	async fn reduce_memoizes() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		scope.append_vars(obj! { "a" => 1 });
		let expr = Arc::new(Expr::Symbol(Ident::from("a")));
		let lazy = LazyExpr::new(expr, scope.clone());
		assert_eq!(lazy.reduce(&ctx).await, Value::from(1));
		// Later changes to the scope do not affect the memoized result
		scope.append_vars(obj! { "a" => 2 });
		assert_eq!(lazy.reduce(&ctx).await, Value::from(1));
	}

	#[tokio::test]
	async fn reduce_with_scope_resolves_at_the_call_site() {
		let ctx = MutableContext::background().freeze();
		let outer = Scope::new_bare();
		outer.append_vars(obj! { "a" => 1 });
		let caller = outer.copy();
		caller.append_vars(obj! { "a" => 10 });
		let lazy = LazyExpr::new(Arc::new(Expr::Symbol(Ident::from("a"))), outer);
		assert_eq!(lazy.reduce_with_scope(&ctx, &caller).await, Value::from(10));
	}

	#[tokio::test]
	async fn self_reference_reduces_to_null() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		// X = 1 + X
		let expr = Arc::new(Expr::Binary {
			l: Box::new(Expr::Literal(Literal::Int(1))),
			o: Operator::Add,
			r: Box::new(Expr::Symbol(Ident::from("X"))),
		});
		let lazy = LazyExpr::new(expr, scope.clone());
		scope.append_vars(obj! { "X" => Value::Lazy(lazy.clone()) });
		// 1 + NULL reduces to NULL, and the reduction terminates
		assert_eq!(lazy.reduce(&ctx).await, Value::Null);
	}
}
