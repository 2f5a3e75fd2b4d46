use crate::cnf;
use crate::ctx::Context;
use crate::exec::Scope;
use crate::ql::number::{Number, TryAdd, TryDiv, TryMul, TrySub};
use crate::ql::{Array, Value};

/// A registered addition behaviour for host value kinds.
pub trait AddProtocol: Send + Sync {
	fn applicable(&self, a: &Value, b: &Value) -> bool;
	fn add(&self, scope: &Scope, a: &Value, b: &Value) -> Value;
}

/// A registered subtraction behaviour for host value kinds.
pub trait SubProtocol: Send + Sync {
	fn applicable(&self, a: &Value, b: &Value) -> bool;
	fn sub(&self, scope: &Scope, a: &Value, b: &Value) -> Value;
}

/// A registered multiplication behaviour for host value kinds.
pub trait MulProtocol: Send + Sync {
	fn applicable(&self, a: &Value, b: &Value) -> bool;
	fn mul(&self, scope: &Scope, a: &Value, b: &Value) -> Value;
}

/// A registered division behaviour for host value kinds.
pub trait DivProtocol: Send + Sync {
	fn applicable(&self, a: &Value, b: &Value) -> bool;
	fn div(&self, scope: &Scope, a: &Value, b: &Value) -> Value;
}

/// Add two values.
///
/// Strings concatenate, numbers add with int/float promotion, arrays
/// concatenate, an array plus a scalar appends or prepends it as a single
/// element, and adding two stored queries materializes both and
/// concatenates their rows. Null propagates.
pub async fn add(ctx: &Context, scope: &Scope, a: Value, b: Value) -> Value {
	match (a, b) {
		(Value::Null, _) | (_, Value::Null) => Value::Null,
		(Value::Number(v), Value::Number(w)) => match v.try_add(w) {
			Ok(n) => Value::Number(n),
			Err(e) => {
				scope.log(format_args!("{e}"));
				Value::Null
			}
		},
		(Value::Strand(v), Value::Strand(w)) => Value::Strand(v + w),
		(Value::Array(v), Value::Array(w)) => Value::Array(v.concat(w)),
		(Value::Array(v), w) => Value::Array(v.with_push(w)),
		(v, Value::Array(w)) => Value::Array(w.with_prepend(v)),
		(Value::Query(v), Value::Query(w)) => {
			let mut rows = v.collect(ctx, scope).await;
			rows.append(&mut w.collect(ctx, scope).await);
			Value::Array(Array(rows))
		}
		(a, b) => {
			if let Some(imp) =
				super::search(scope, scope.protocols().add_impls(), |i| i.applicable(&a, &b))
			{
				return imp.add(scope, &a, &b);
			}
			Value::Null
		}
	}
}

/// Subtract `b` from `a`. Numbers only on the fast path; Null propagates.
pub fn sub(scope: &Scope, a: Value, b: Value) -> Value {
	match (a, b) {
		(Value::Null, _) | (_, Value::Null) => Value::Null,
		(Value::Number(v), Value::Number(w)) => match v.try_sub(w) {
			Ok(n) => Value::Number(n),
			Err(e) => {
				scope.log(format_args!("{e}"));
				Value::Null
			}
		},
		(a, b) => {
			if let Some(imp) =
				super::search(scope, scope.protocols().sub_impls(), |i| i.applicable(&a, &b))
			{
				return imp.sub(scope, &a, &b);
			}
			Value::Null
		}
	}
}

/// Multiply two values.
///
/// A string times an integer repeats the string; the predicted size of the
/// product is capped, with oversized products logged and reduced to Null.
pub fn mul(scope: &Scope, a: Value, b: Value) -> Value {
	match (a, b) {
		(Value::Null, _) | (_, Value::Null) => Value::Null,
		(Value::Number(v), Value::Number(w)) => match v.try_mul(w) {
			Ok(n) => Value::Number(n),
			Err(e) => {
				scope.log(format_args!("{e}"));
				Value::Null
			}
		},
		(Value::Strand(v), Value::Number(Number::Int(n)))
		| (Value::Number(Number::Int(n)), Value::Strand(v)) => repeat_strand(scope, v, n),
		(a, b) => {
			if let Some(imp) =
				super::search(scope, scope.protocols().mul_impls(), |i| i.applicable(&a, &b))
			{
				return imp.mul(scope, &a, &b);
			}
			Value::Null
		}
	}
}

fn repeat_strand(scope: &Scope, v: crate::ql::Strand, n: i64) -> Value {
	if n < 0 {
		return Value::Null;
	}
	let predicted = v.len().saturating_mul(n as usize);
	if predicted > cnf::MAX_STRAND_PRODUCT {
		scope.log(format_args!(
			"String multiplication product of {predicted} bytes exceeds the {} byte limit",
			cnf::MAX_STRAND_PRODUCT
		));
		return Value::Null;
	}
	Value::from(v.as_str().repeat(n as usize))
}

/// Divide `a` by `b`.
///
/// Any divisor equal to zero reduces to Null. With a float on either side
/// the division is a float division, otherwise integer division.
pub fn div(scope: &Scope, a: Value, b: Value) -> Value {
	match (a, b) {
		(Value::Null, _) | (_, Value::Null) => Value::Null,
		(Value::Number(v), Value::Number(w)) => {
			if !w.is_truthy() {
				return Value::Null;
			}
			match v.try_div(w) {
				Ok(n) => Value::Number(n),
				Err(e) => {
					scope.log(format_args!("{e}"));
					Value::Null
				}
			}
		}
		(a, b) => {
			if let Some(imp) =
				super::search(scope, scope.protocols().div_impls(), |i| i.applicable(&a, &b))
			{
				return imp.div(scope, &a, &b);
			}
			Value::Null
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;

	#[tokio::test]
	async fn addition_concatenates_and_promotes() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		assert_eq!(
			add(&ctx, &scope, Value::from("foo"), Value::from("bar")).await,
			Value::from("foobar")
		);
		assert_eq!(add(&ctx, &scope, Value::from(1), Value::from(2)).await, Value::from(3));
		assert_eq!(add(&ctx, &scope, Value::from(1), Value::from(0.5)).await, Value::from(1.5));
		assert_eq!(add(&ctx, &scope, Value::Null, Value::from(1)).await, Value::Null);
		assert_eq!(add(&ctx, &scope, Value::from(1), Value::Null).await, Value::Null);
	}

	#[tokio::test]
	async fn array_addition() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		let a = Value::Array(Array::from(vec![1i64, 2, 3]));
		let b = Value::Array(Array::from(vec![4i64, 5]));
		assert_eq!(
			add(&ctx, &scope, a.clone(), b).await,
			Value::Array(Array::from(vec![1i64, 2, 3, 4, 5]))
		);
		assert_eq!(
			add(&ctx, &scope, a.clone(), Value::from(4)).await,
			Value::Array(Array::from(vec![1i64, 2, 3, 4]))
		);
		assert_eq!(
			add(&ctx, &scope, Value::from(0), a).await,
			Value::Array(Array::from(vec![0i64, 1, 2, 3]))
		);
	}

	#[test]
	fn division_by_zero_is_null() {
		let scope = Scope::new_bare();
		assert_eq!(div(&scope, Value::from(10), Value::from(0)), Value::Null);
		assert_eq!(div(&scope, Value::from(10.0), Value::from(0.0)), Value::Null);
		assert_eq!(div(&scope, Value::from(10), Value::from(4)), Value::from(2));
		assert_eq!(div(&scope, Value::from(10.0), Value::from(4)), Value::from(2.5));
	}

	#[test]
	fn string_repetition_is_size_capped() {
		let scope = Scope::new_bare();
		assert_eq!(
			mul(&scope, Value::from("abc"), Value::from(10)),
			Value::from("abcabcabcabcabcabcabcabcabcabc")
		);
		assert_eq!(mul(&scope, Value::from("a"), Value::from(1_000_000_000)), Value::Null);
	}

	#[test]
	fn integer_multiplication_does_not_promote() {
		let scope = Scope::new_bare();
		let v = mul(&scope, Value::from(65535), Value::from(65535));
		let v = mul(&scope, v, Value::from(65535));
		assert_eq!(v, Value::from(281462092005375i64));
	}

	#[test]
	fn unsupported_operands_reduce_to_null() {
		let scope = Scope::new_bare();
		assert_eq!(sub(&scope, Value::from("a"), Value::from(1)), Value::Null);
		assert_eq!(mul(&scope, Value::from(true), Value::from(true)), Value::Null);
	}
}
