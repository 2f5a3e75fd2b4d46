use crate::cnf;
use crate::ctx::Context;
use crate::err::Error;
use crate::exec::aggregator::AggregatorCtx;
use crate::exec::explain::Explainer;
use crate::exec::group::{DefaultGrouper, Grouper};
use crate::exec::sort::{DefaultSorter, Sorter};
use crate::exec::stats::Stats;
use crate::exec::throttle::Throttle;
use crate::fnc::{Function, Plugin};
use crate::ql::stored::{InMemoryMaterializer, Materializer};
use crate::ql::{Object, Opaque, Value};
use crate::protocol::{ProtocolImpl, Protocols};
use async_recursion::async_recursion;
use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// The reserved variable name under which the throttle is resolvable.
pub const THROTTLE_VAR: &str = "$throttle";

/// A scope destructor: runs when the owning scope closes.
pub type Destructor = Box<dyn FnOnce() -> futures::future::BoxFuture<'static, ()> + Send>;

/// A host-overridable logger receiving printf-style strings.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

pub(crate) type ScopeId = usize;

/// An entry in the process-wide context mapping shared by a scope tree.
#[derive(Clone)]
pub(crate) enum ContextEntry {
	Value(Value),
	Regex(Arc<regex::Regex>),
}

/// The evaluation environment: a stack of variable frames plus the shared
/// registries, dispatchers and services of the evaluation tree.
///
/// Scopes form a tree held in an arena (nodes are addressed by id, so there
/// are no parent/child reference cycles). [`Scope::copy`] clones the frame
/// stack and shares everything else; [`Scope::close`] tears down the subtree
/// deterministically: children first, then this scope's destructors in
/// reverse registration order.
#[derive(Clone)]
pub struct Scope {
	id: ScopeId,
	core: Arc<ScopeCore>,
}

struct ScopeCore {
	arena: Mutex<Vec<ScopeNode>>,
	functions: RwLock<HashMap<String, Arc<dyn Function>>>,
	plugins: RwLock<HashMap<String, Arc<dyn Plugin>>>,
	protocols: Protocols,
	materializer: RwLock<Arc<dyn Materializer>>,
	grouper: RwLock<Arc<dyn Grouper>>,
	sorter: RwLock<Arc<dyn Sorter>>,
	context: DashMap<String, ContextEntry>,
	stats: Stats,
	log_sink: RwLock<Option<LogSink>>,
}

#[derive(Default)]
struct ScopeNode {
	frames: Vec<Arc<Value>>,
	parent: Option<ScopeId>,
	children: Vec<ScopeId>,
	destructors: Vec<Destructor>,
	aggregator: Option<AggregatorCtx>,
	explainer: Option<Arc<Explainer>>,
	throttle: Option<Arc<Throttle>>,
	closed: bool,
}

impl fmt::Debug for Scope {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Scope").field("id", &self.id).finish()
	}
}

impl Scope {
	/// Create a fresh root scope with the built-in functions and plugins
	/// registered and the reserved variables seeded.
	pub fn new_root() -> Scope {
		let scope = Self::new_bare();
		crate::fnc::register_builtins(&scope);
		scope.append_vars(obj! { "NULL" => Value::Null });
		scope
	}

	/// Create a root scope without any built-ins registered.
	pub fn new_bare() -> Scope {
		let core = ScopeCore {
			arena: Mutex::new(vec![ScopeNode::default()]),
			functions: RwLock::new(HashMap::new()),
			plugins: RwLock::new(HashMap::new()),
			protocols: Protocols::new(),
			materializer: RwLock::new(Arc::new(InMemoryMaterializer)),
			grouper: RwLock::new(Arc::new(DefaultGrouper)),
			sorter: RwLock::new(Arc::new(DefaultSorter)),
			context: DashMap::new(),
			stats: Stats::default(),
			log_sink: RwLock::new(None),
		};
		Scope {
			id: 0,
			core: Arc::new(core),
		}
	}

	/// Create a child scope sharing the registries and dispatchers but with
	/// its own copy of the variable frame stack.
	pub fn copy(&self) -> Scope {
		let mut arena = self.core.arena.lock().unwrap();
		let node = {
			let parent = &arena[self.id];
			ScopeNode {
				frames: parent.frames.clone(),
				parent: Some(self.id),
				children: Vec::new(),
				destructors: Vec::new(),
				aggregator: parent.aggregator.clone(),
				explainer: parent.explainer.clone(),
				throttle: parent.throttle.clone(),
				closed: false,
			}
		};
		let id = arena.len();
		arena.push(node);
		arena[self.id].children.push(id);
		drop(arena);
		self.core.stats.incr_scopes_copied();
		Scope {
			id,
			core: self.core.clone(),
		}
	}

	/// Append a frame of variables to this scope.
	pub fn append_vars(&self, vars: Object) {
		self.append_frame(Value::Object(vars));
	}

	/// Append any row-shaped value as a variable frame.
	pub fn append_frame(&self, frame: Value) {
		let mut arena = self.core.arena.lock().unwrap();
		if !arena[self.id].closed {
			arena[self.id].frames.push(Arc::new(frame));
		}
	}

	/// Resolve a name against the frame stack, newest frame first.
	///
	/// The first frame in which the name is present wins. If no frame has
	/// the name, the most recent frame default value is returned with the
	/// presence flag false; failing that, `(Null, false)`.
	pub async fn resolve(&self, ctx: &Context, name: &str) -> (Value, bool) {
		if name == THROTTLE_VAR {
			if let Some(t) = self.throttle() {
				return (Value::Opaque(Opaque::from_arc("throttle", t)), true);
			}
			return (Value::Null, false);
		}
		let frames = {
			let arena = self.core.arena.lock().unwrap();
			arena[self.id].frames.clone()
		};
		let mut fallback: Option<Value> = None;
		let key = Value::from(name);
		for frame in frames.iter().rev() {
			match frame.as_ref() {
				Value::Object(obj) => {
					let (val, present) = obj.resolve(name);
					if present {
						return (val, true);
					}
					if fallback.is_none() {
						fallback = obj.default_value().cloned();
					}
				}
				frame => {
					let (val, present) =
						crate::protocol::assoc(ctx, self, frame, &key).await;
					if present {
						return (val, true);
					}
				}
			}
		}
		match fallback {
			Some(v) => (v, false),
			None => (Value::Null, false),
		}
	}

	/// Register a destructor from an async closure.
	pub fn defer<F, Fut>(&self, f: F) -> Result<(), Error>
	where
		F: FnOnce() -> Fut + Send + 'static,
		Fut: std::future::Future<Output = ()> + Send + 'static,
	{
		self.on_close(Box::new(move || {
			let fut: futures::future::BoxFuture<'static, ()> = Box::pin(f());
			fut
		}))
	}

	/// Register a destructor to run when this scope closes.
	pub fn on_close(&self, destructor: Destructor) -> Result<(), Error> {
		let mut arena = self.core.arena.lock().unwrap();
		let node = &mut arena[self.id];
		if node.closed {
			return Err(Error::ScopeClosed);
		}
		node.destructors.push(destructor);
		Ok(())
	}

	/// Close this scope, closing all child scopes first and then running the
	/// registered destructors in reverse registration order. Closing twice
	/// is a no-op.
	#[async_recursion]
	pub async fn close(&self) {
		let (children, destructors) = {
			let mut arena = self.core.arena.lock().unwrap();
			let node = &mut arena[self.id];
			if node.closed {
				return;
			}
			node.closed = true;
			// Frames stay readable: lazy rows handed to a consumer may
			// outlive the scope which produced them
			node.throttle = None;
			(std::mem::take(&mut node.children), std::mem::take(&mut node.destructors))
		};
		// Children close before this scope's own destructors run
		for child in children {
			Scope {
				id: child,
				core: self.core.clone(),
			}
			.close()
			.await;
		}
		for destructor in destructors.into_iter().rev() {
			let handle = tokio::spawn(destructor());
			let timeout = Duration::from_secs(cnf::DESTRUCTOR_TIMEOUT_SECS);
			if tokio::time::timeout(timeout, handle).await.is_err() {
				warn!("Scope destructor did not finish within {}s", timeout.as_secs());
			}
		}
		// Remove this scope from its parent's child set
		let mut arena = self.core.arena.lock().unwrap();
		let parent = arena[self.id].parent;
		if let Some(parent) = parent {
			arena[parent].children.retain(|c| *c != self.id);
		}
	}

	/// Check whether this scope has been closed.
	pub fn is_closed(&self) -> bool {
		self.core.arena.lock().unwrap()[self.id].closed
	}

	//
	// Registries
	//

	/// Register functions on the shared registry.
	pub fn append_functions<I>(&self, functions: I)
	where
		I: IntoIterator<Item = Arc<dyn Function>>,
	{
		let mut registry = self.core.functions.write().unwrap();
		for function in functions {
			registry.insert(function.info(self).name.to_string(), function);
		}
	}

	/// Register plugins on the shared registry.
	pub fn append_plugins<I>(&self, plugins: I)
	where
		I: IntoIterator<Item = Arc<dyn Plugin>>,
	{
		let mut registry = self.core.plugins.write().unwrap();
		for plugin in plugins {
			registry.insert(plugin.info(self).name.to_string(), plugin);
		}
	}

	/// Look up a registered function by name.
	pub fn function(&self, name: &str) -> Option<Arc<dyn Function>> {
		self.core.functions.read().unwrap().get(name).cloned()
	}

	/// Look up a registered plugin by name.
	pub fn plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
		self.core.plugins.read().unwrap().get(name).cloned()
	}

	/// The names of all registered plugins.
	pub fn plugin_names(&self) -> Vec<String> {
		self.core.plugins.read().unwrap().keys().cloned().collect()
	}

	/// Register an operator protocol implementation. The implementation is
	/// consulted, in registration order, for every future dispatch which the
	/// built-in fast path does not claim.
	pub fn add_protocol_impl(&self, imp: ProtocolImpl) {
		self.core.protocols.add(imp);
	}

	pub(crate) fn protocols(&self) -> &Protocols {
		&self.core.protocols
	}

	/// Replace the materializer used for `LET name <= ...` bindings.
	pub fn set_materializer(&self, materializer: Arc<dyn Materializer>) {
		*self.core.materializer.write().unwrap() = materializer;
	}

	pub(crate) fn materializer(&self) -> Arc<dyn Materializer> {
		self.core.materializer.read().unwrap().clone()
	}

	/// Replace the grouper driving `GROUP BY` aggregation.
	pub fn set_grouper(&self, grouper: Arc<dyn Grouper>) {
		*self.core.grouper.write().unwrap() = grouper;
	}

	pub(crate) fn grouper(&self) -> Arc<dyn Grouper> {
		self.core.grouper.read().unwrap().clone()
	}

	/// Replace the sorter driving `ORDER BY`.
	pub fn set_sorter(&self, sorter: Arc<dyn Sorter>) {
		*self.core.sorter.write().unwrap() = sorter;
	}

	pub(crate) fn sorter(&self) -> Arc<dyn Sorter> {
		self.core.sorter.read().unwrap().clone()
	}

	//
	// Services
	//

	/// The shared evaluation statistics.
	pub fn stats(&self) -> &Stats {
		&self.core.stats
	}

	/// Install a throttle capping charged operations per second on this
	/// scope and its future copies. The throttle is torn down when the
	/// scope closes.
	pub fn set_throttle(&self, rate: u64) -> Result<(), Error> {
		let throttle = Arc::new(Throttle::new(rate));
		{
			let mut arena = self.core.arena.lock().unwrap();
			let node = &mut arena[self.id];
			if node.closed {
				return Err(Error::ScopeClosed);
			}
			node.throttle = Some(throttle.clone());
		}
		self.defer(move || async move {
			drop(throttle);
		})
	}

	pub(crate) fn throttle(&self) -> Option<Arc<Throttle>> {
		self.core.arena.lock().unwrap()[self.id].throttle.clone()
	}

	/// Charge a single operation against the installed throttle, if any.
	pub async fn charge_op(&self) {
		if let Some(throttle) = self.throttle() {
			throttle.charge_op().await;
		}
	}

	/// The aggregator context shared by this scope, if inside a group.
	pub fn aggregator(&self) -> Option<AggregatorCtx> {
		self.core.arena.lock().unwrap()[self.id].aggregator.clone()
	}

	/// Install a fresh aggregator context on this scope.
	pub fn set_aggregator(&self, aggregator: AggregatorCtx) {
		self.core.arena.lock().unwrap()[self.id].aggregator = Some(aggregator);
	}

	/// Install an explainer receiving evaluation diagnostics.
	pub fn set_explainer(&self, explainer: Arc<Explainer>) {
		self.core.arena.lock().unwrap()[self.id].explainer = Some(explainer);
	}

	/// The explainer visible from this scope, if any.
	pub fn explainer(&self) -> Option<Arc<Explainer>> {
		self.core.arena.lock().unwrap()[self.id].explainer.clone()
	}

	/// Record an explainer diagnostic, if an explainer is installed.
	pub fn explain(&self, args: fmt::Arguments) {
		if let Some(explainer) = self.explainer() {
			explainer.record(args);
		} else {
			trace!("{args}");
		}
	}

	/// Override the logger for this evaluation tree.
	pub fn set_logger(&self, sink: LogSink) {
		*self.core.log_sink.write().unwrap() = Some(sink);
	}

	/// Log a diagnostic visible to the host.
	pub fn log(&self, args: fmt::Arguments) {
		let line = args.to_string();
		warn!("{line}");
		if let Some(sink) = self.core.log_sink.read().unwrap().as_ref() {
			sink(&line);
		}
		if let Some(explainer) = self.explainer() {
			explainer.record(format_args!("{line}"));
		}
	}

	/// Emit a verbose trace diagnostic.
	pub fn tracev(&self, args: fmt::Arguments) {
		trace!("{args}");
	}

	//
	// Context mapping
	//

	/// Read a value from the process-wide context mapping.
	pub fn context_value(&self, key: &str) -> Option<Value> {
		match self.core.context.get(key) {
			Some(entry) => match entry.value() {
				ContextEntry::Value(v) => Some(v.clone()),
				ContextEntry::Regex(_) => None,
			},
			None => None,
		}
	}

	/// Store a value in the process-wide context mapping.
	pub fn set_context_value(&self, key: String, value: Value) {
		self.core.context.insert(key, ContextEntry::Value(value));
	}

	/// Fetch or compile a cached regular expression.
	pub(crate) fn cached_regex(&self, pattern: &str) -> Option<Arc<regex::Regex>> {
		let key = format!("__re{pattern}");
		if let Some(entry) = self.core.context.get(&key) {
			if let ContextEntry::Regex(re) = entry.value() {
				return Some(re.clone());
			}
		}
		// Compilation is always case-insensitive
		match regex::RegexBuilder::new(pattern).case_insensitive(true).build() {
			Ok(re) => {
				let re = Arc::new(re);
				self.core.context.insert(key, ContextEntry::Regex(re.clone()));
				Some(re)
			}
			Err(e) => {
				self.log(format_args!("Invalid regex {pattern}: {e}"));
				None
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[tokio::test]
	async fn newest_frame_shadows_older_ones() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		scope.append_vars(obj! { "a" => 1, "b" => 2 });
		scope.append_vars(obj! { "a" => 10 });
		assert_eq!(scope.resolve(&ctx, "a").await, (Value::from(10), true));
		assert_eq!(scope.resolve(&ctx, "b").await, (Value::from(2), true));
		assert_eq!(scope.resolve(&ctx, "c").await, (Value::Null, false));
	}

	#[tokio::test]
	async fn copies_share_registries_but_not_frames() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		scope.append_vars(obj! { "a" => 1 });
		let child = scope.copy();
		child.append_vars(obj! { "a" => 2 });
		assert_eq!(scope.resolve(&ctx, "a").await, (Value::from(1), true));
		assert_eq!(child.resolve(&ctx, "a").await, (Value::from(2), true));
		assert_eq!(scope.stats().scopes_copied(), 1);
	}

	#[tokio::test]
	async fn destructors_run_in_reverse_order_children_first() {
		let order = Arc::new(Mutex::new(Vec::new()));
		let scope = Scope::new_bare();
		let child = scope.copy();
		for (target, label) in [(&scope, "parent-1"), (&scope, "parent-2"), (&child, "child-1")] {
			let order = order.clone();
			target
				.defer(move || async move {
					order.lock().unwrap().push(label);
				})
				.unwrap();
		}
		scope.close().await;
		let order = order.lock().unwrap();
		assert_eq!(order.as_slice(), ["child-1", "parent-2", "parent-1"]);
	}

	#[tokio::test]
	async fn close_is_idempotent_and_rejects_late_destructors() {
		let runs = Arc::new(AtomicUsize::new(0));
		let scope = Scope::new_bare();
		let counter = runs.clone();
		scope
			.defer(move || async move {
				counter.fetch_add(1, Ordering::SeqCst);
			})
			.unwrap();
		scope.close().await;
		scope.close().await;
		assert_eq!(runs.load(Ordering::SeqCst), 1);
		let res = scope.defer(|| async {});
		assert!(matches!(res, Err(Error::ScopeClosed)));
	}

	#[tokio::test]
	async fn frame_default_value_is_a_fallback() {
		let ctx = MutableContext::background().freeze();
		let scope = Scope::new_bare();
		scope.append_vars(Object::new().with_default(Value::from("fallback")));
		assert_eq!(scope.resolve(&ctx, "anything").await, (Value::from("fallback"), false));
	}
}
