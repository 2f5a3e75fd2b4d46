//! Polymorphic operator dispatch over the heterogeneous value universe.
//!
//! Every operator (truthiness, equality, ordering, arithmetic, membership,
//! regex match, associative lookup, iteration) resolves in three steps:
//!
//! 1. a hand-coded fast path over the built-in value kinds;
//! 2. an ordered walk of the registered implementations, first applicable
//!    wins (each walk increments the protocol-search statistic);
//! 3. a defined default: equality and comparisons are false, truthiness is
//!    false, arithmetic is Null, iteration yields one `{_value: a}` row.

use crate::exec::Scope;
use crate::ql::Value;
use std::sync::{Arc, RwLock};

mod arith;
mod assoc;
mod bools;
mod cmp;
mod eq;
mod iterate;
mod membership;
mod regexm;

pub use arith::{add, div, mul, sub};
pub use arith::{AddProtocol, DivProtocol, MulProtocol, SubProtocol};
pub use assoc::{assoc, AssocProtocol, FieldTable};
pub use bools::{truthy, BoolProtocol};
pub use cmp::{gt, lt, order, GtProtocol, LtProtocol};
pub use eq::{eq, EqProtocol};
pub use iterate::{iterate, IterateProtocol};
pub(crate) use iterate::as_row;
pub use membership::{membership, MembershipProtocol};
pub use regexm::{regex_match, RegexProtocol};

/// A protocol implementation being registered on a scope.
#[non_exhaustive]
pub enum ProtocolImpl {
	Truthy(Arc<dyn BoolProtocol>),
	Eq(Arc<dyn EqProtocol>),
	Lt(Arc<dyn LtProtocol>),
	Gt(Arc<dyn GtProtocol>),
	Add(Arc<dyn AddProtocol>),
	Sub(Arc<dyn SubProtocol>),
	Mul(Arc<dyn MulProtocol>),
	Div(Arc<dyn DivProtocol>),
	Membership(Arc<dyn MembershipProtocol>),
	Match(Arc<dyn RegexProtocol>),
	Assoc(Arc<dyn AssocProtocol>),
	Iterate(Arc<dyn IterateProtocol>),
}

/// The per-operator implementation lists owned by a scope tree.
///
/// Lists are append-only: registration appends under a briefly held writer
/// lock, dispatch reads under a reader lock. Insertion order is resolution
/// order.
#[derive(Default)]
pub struct Protocols {
	truthy: RwLock<Vec<Arc<dyn BoolProtocol>>>,
	eq: RwLock<Vec<Arc<dyn EqProtocol>>>,
	lt: RwLock<Vec<Arc<dyn LtProtocol>>>,
	gt: RwLock<Vec<Arc<dyn GtProtocol>>>,
	add: RwLock<Vec<Arc<dyn AddProtocol>>>,
	sub: RwLock<Vec<Arc<dyn SubProtocol>>>,
	mul: RwLock<Vec<Arc<dyn MulProtocol>>>,
	div: RwLock<Vec<Arc<dyn DivProtocol>>>,
	membership: RwLock<Vec<Arc<dyn MembershipProtocol>>>,
	regexm: RwLock<Vec<Arc<dyn RegexProtocol>>>,
	assoc: RwLock<Vec<Arc<dyn AssocProtocol>>>,
	iterate: RwLock<Vec<Arc<dyn IterateProtocol>>>,
}

impl Protocols {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn add(&self, imp: ProtocolImpl) {
		match imp {
			ProtocolImpl::Truthy(v) => self.truthy.write().unwrap().push(v),
			ProtocolImpl::Eq(v) => self.eq.write().unwrap().push(v),
			ProtocolImpl::Lt(v) => self.lt.write().unwrap().push(v),
			ProtocolImpl::Gt(v) => self.gt.write().unwrap().push(v),
			ProtocolImpl::Add(v) => self.add.write().unwrap().push(v),
			ProtocolImpl::Sub(v) => self.sub.write().unwrap().push(v),
			ProtocolImpl::Mul(v) => self.mul.write().unwrap().push(v),
			ProtocolImpl::Div(v) => self.div.write().unwrap().push(v),
			ProtocolImpl::Membership(v) => self.membership.write().unwrap().push(v),
			ProtocolImpl::Match(v) => self.regexm.write().unwrap().push(v),
			ProtocolImpl::Assoc(v) => self.assoc.write().unwrap().push(v),
			ProtocolImpl::Iterate(v) => self.iterate.write().unwrap().push(v),
		}
	}

	pub(crate) fn truthy_impls(&self) -> Vec<Arc<dyn BoolProtocol>> {
		self.truthy.read().unwrap().clone()
	}
	pub(crate) fn eq_impls(&self) -> Vec<Arc<dyn EqProtocol>> {
		self.eq.read().unwrap().clone()
	}
	pub(crate) fn lt_impls(&self) -> Vec<Arc<dyn LtProtocol>> {
		self.lt.read().unwrap().clone()
	}
	pub(crate) fn gt_impls(&self) -> Vec<Arc<dyn GtProtocol>> {
		self.gt.read().unwrap().clone()
	}
	pub(crate) fn add_impls(&self) -> Vec<Arc<dyn AddProtocol>> {
		self.add.read().unwrap().clone()
	}
	pub(crate) fn sub_impls(&self) -> Vec<Arc<dyn SubProtocol>> {
		self.sub.read().unwrap().clone()
	}
	pub(crate) fn mul_impls(&self) -> Vec<Arc<dyn MulProtocol>> {
		self.mul.read().unwrap().clone()
	}
	pub(crate) fn div_impls(&self) -> Vec<Arc<dyn DivProtocol>> {
		self.div.read().unwrap().clone()
	}
	pub(crate) fn membership_impls(&self) -> Vec<Arc<dyn MembershipProtocol>> {
		self.membership.read().unwrap().clone()
	}
	pub(crate) fn regexm_impls(&self) -> Vec<Arc<dyn RegexProtocol>> {
		self.regexm.read().unwrap().clone()
	}
	pub(crate) fn assoc_impls(&self) -> Vec<Arc<dyn AssocProtocol>> {
		self.assoc.read().unwrap().clone()
	}
	pub(crate) fn iterate_impls(&self) -> Vec<Arc<dyn IterateProtocol>> {
		self.iterate.read().unwrap().clone()
	}
}

/// Reduce a chain of lazy carriers to a concrete value.
///
/// Lazy expressions and thunks are unwrapped up to the configured depth;
/// deeper chains reduce to Null with a trace diagnostic.
#[async_recursion::async_recursion]
pub async fn delazify(ctx: &crate::ctx::Context, v: Value) -> Value {
	let mut v = v;
	for _ in 0..crate::cnf::MAX_LAZY_DEPTH {
		match v {
			Value::Lazy(l) => v = l.reduce(ctx).await,
			Value::Thunk(t) => v = t.call(),
			v => return v,
		}
	}
	trace!("Lazy reduction depth exceeded; returning NULL");
	Value::Null
}

/// Walk a protocol implementation list, returning the first applicable
/// implementation. Each walk counts as one protocol search.
pub(crate) fn search<T, F>(scope: &Scope, impls: Vec<Arc<T>>, applicable: F) -> Option<Arc<T>>
where
	T: ?Sized,
	F: Fn(&T) -> bool,
{
	scope.stats().incr_protocols_searched();
	impls.into_iter().find(|imp| applicable(imp))
}
