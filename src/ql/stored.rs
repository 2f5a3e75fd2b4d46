use crate::ctx::Context;
use crate::exec::{RowStream, Scope};
use crate::ql::ident::Ident;
use crate::ql::object::Object;
use crate::ql::statements::select::SelectStatement;
use crate::ql::value::Value;
use async_trait::async_trait;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// A deferred source of rows.
#[async_trait]
pub trait RowSource: Send + Sync {
	/// Yield a cancellable lazy sequence of rows
	async fn rows(&self, ctx: &Context, scope: &Scope) -> RowStream;

	/// Yield rows with keyword arguments bound to declared parameters.
	/// Sources without parameters ignore the arguments.
	async fn rows_with_args(&self, ctx: &Context, scope: &Scope, _args: Object) -> RowStream {
		self.rows(ctx, scope).await
	}

	/// The already materialized rows, if this source is in-memory
	fn materialized(&self) -> Option<Arc<Vec<Value>>> {
		None
	}

	/// The parameter names of a parameterized stored query
	fn params(&self) -> &[Ident] {
		&[]
	}

	/// A short human-readable description
	fn describe(&self) -> String;
}

/// A first-class deferred row producer.
///
/// Created by `LET name = SELECT ...` (lazy) or `LET name <= SELECT ...`
/// (materialized), or programmatically by hosts. Evaluating a stored query
/// yields a fresh cancellable row stream.
#[derive(Clone)]
pub struct StoredQuery(Arc<dyn RowSource>);

impl StoredQuery {
	/// Wrap a custom row source
	pub fn new(source: Arc<dyn RowSource>) -> Self {
		Self(source)
	}

	/// A stored query over a parsed statement and its captured scope
	pub(crate) fn select(stmt: Arc<SelectStatement>, scope: Scope) -> Self {
		Self(Arc::new(SelectSource {
			stmt,
			scope,
		}))
	}

	/// A parameterized stored query binding call arguments into a child scope
	pub(crate) fn select_with_params(
		params: Vec<Ident>,
		stmt: Arc<SelectStatement>,
		scope: Scope,
	) -> Self {
		Self(Arc::new(ParamSource {
			params,
			stmt,
			scope,
		}))
	}

	/// An in-memory stored query over already materialized rows
	pub fn from_rows(rows: Vec<Value>) -> Self {
		Self(Arc::new(VecSource(Arc::new(rows))))
	}

	/// Evaluate this stored query into a row stream
	pub async fn eval(&self, ctx: &Context, scope: &Scope) -> RowStream {
		self.0.rows(ctx, scope).await
	}

	/// Evaluate with keyword arguments bound to the declared parameters
	pub(crate) async fn eval_with_args(
		&self,
		ctx: &Context,
		scope: &Scope,
		args: Object,
	) -> RowStream {
		if self.0.params().is_empty() && !args.is_empty() {
			scope.log(format_args!("Stored query {} takes no parameters", self.0.describe()));
		}
		self.0.rows_with_args(ctx, scope, args).await
	}

	/// Collect all rows into a vector, using the materialized fast path
	/// where possible
	pub async fn collect(&self, ctx: &Context, scope: &Scope) -> Vec<Value> {
		if let Some(rows) = self.0.materialized() {
			return rows.as_ref().clone();
		}
		self.0.rows(ctx, scope).await.collect().await
	}

	/// The already materialized rows, if any
	pub fn materialized(&self) -> Option<Arc<Vec<Value>>> {
		self.0.materialized()
	}

	/// The declared parameter names
	pub fn params(&self) -> &[Ident] {
		self.0.params()
	}

	/// Check whether two stored queries share the same source
	pub fn same(&self, other: &StoredQuery) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl Debug for StoredQuery {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		f.debug_struct("StoredQuery").field("source", &self.0.describe()).finish()
	}
}

impl Display for StoredQuery {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "{}", self.0.describe())
	}
}

struct SelectSource {
	stmt: Arc<SelectStatement>,
	scope: Scope,
}

#[async_trait]
impl RowSource for SelectSource {
	async fn rows(&self, ctx: &Context, scope: &Scope) -> RowStream {
		// Free variables resolve at the evaluation site; the captured
		// definition scope is the fallback when the query escapes its tree
		if scope.is_closed() {
			return self.stmt.eval(ctx, &self.scope).await;
		}
		self.stmt.eval(ctx, scope).await
	}

	fn describe(&self) -> String {
		self.stmt.to_string()
	}
}

struct ParamSource {
	params: Vec<Ident>,
	stmt: Arc<SelectStatement>,
	scope: Scope,
}

#[async_trait]
impl RowSource for ParamSource {
	async fn rows(&self, ctx: &Context, scope: &Scope) -> RowStream {
		self.rows_with_args(ctx, scope, Object::new()).await
	}

	async fn rows_with_args(&self, ctx: &Context, scope: &Scope, args: Object) -> RowStream {
		// Parameter names shadow outer identifiers in a fresh child scope
		let child = if scope.is_closed() {
			self.scope.copy()
		} else {
			scope.copy()
		};
		let mut frame = Object::new();
		for name in &self.params {
			let (val, present) = args.resolve(name.as_str());
			if !present {
				self.scope.log(format_args!("Missing required arg {name}"));
			}
			frame.insert(name.0.clone(), val);
		}
		child.append_vars(frame);
		self.stmt.eval(ctx, &child).await
	}

	fn params(&self) -> &[Ident] {
		&self.params
	}

	fn describe(&self) -> String {
		self.stmt.to_string()
	}
}

struct VecSource(Arc<Vec<Value>>);

#[async_trait]
impl RowSource for VecSource {
	async fn rows(&self, _ctx: &Context, _scope: &Scope) -> RowStream {
		RowStream::from_values(self.0.as_ref().clone())
	}

	fn materialized(&self) -> Option<Arc<Vec<Value>>> {
		Some(self.0.clone())
	}

	fn describe(&self) -> String {
		format!("<{} materialized rows>", self.0.len())
	}
}

/// Turns a row stream into a stored query, usually by collecting it.
///
/// The default implementation gathers everything into an in-memory vector;
/// hosts can swap in a spill-to-disk implementation for large `LET X <= ...`
/// bindings.
#[async_trait]
pub trait Materializer: Send + Sync {
	async fn materialize(&self, ctx: &Context, scope: &Scope, rows: RowStream) -> StoredQuery;
}

/// The default in-memory materializer.
pub struct InMemoryMaterializer;

#[async_trait]
impl Materializer for InMemoryMaterializer {
	async fn materialize(&self, ctx: &Context, scope: &Scope, mut rows: RowStream) -> StoredQuery {
		let mut out = Vec::new();
		while let Some(row) = rows.next().await {
			// Materialized rows are eager objects
			out.push(Value::Object(crate::exec::row_to_object(ctx, scope, &row).await));
		}
		StoredQuery::from_rows(out)
	}
}
