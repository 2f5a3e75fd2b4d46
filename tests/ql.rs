//! End-to-end tests driving parsed queries through the full pipeline.

use riffle::ctx::{Context, MutableContext};
use riffle::exec::{row_to_object, Explainer, Scope};
use riffle::fnc::{CallArgs, Function, FunctionInfo};
use riffle::ql::{Object, Value};
use riffle::syn;
use std::sync::Arc;

fn background() -> Context {
	MutableContext::background().freeze()
}

// Run a program and materialize every produced row.
async fn run(scope: &Scope, source: &str) -> Vec<Object> {
	let ctx = background();
	let query = syn::parse(source).expect("query parses");
	let mut rows = query.eval(&ctx, scope).await;
	let mut out = Vec::new();
	while let Some(row) = rows.next().await {
		out.push(row_to_object(&ctx, scope, &row).await);
	}
	out
}

fn obj(pairs: &[(&str, Value)]) -> Object {
	let mut obj = Object::new();
	for (k, v) in pairs {
		obj.insert(k.to_string(), v.clone());
	}
	obj
}

#[tokio::test]
async fn stored_query_roundtrip_with_filter() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"LET X = SELECT * FROM range(start=1, end=3)  SELECT * FROM X WHERE _value = 2",
	)
	.await;
	assert_eq!(rows, vec![obj(&[("_value", Value::from(2))])]);
	scope.close().await;
}

#[tokio::test]
async fn count_groups_all_rows_into_one_bin() {
	let scope = Scope::new_root();
	let rows =
		run(&scope, "SELECT count() AS n FROM range(start=1, end=3) GROUP BY 1").await;
	assert_eq!(rows, vec![obj(&[("n", Value::from(3))])]);
	scope.close().await;
}

#[tokio::test]
async fn foreach_streams_inner_rows_in_order() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"SELECT * FROM foreach(row=[dict(A=1), dict(A=2)], query={SELECT A*10 AS B FROM scope()})",
	)
	.await;
	assert_eq!(
		rows,
		vec![obj(&[("B", Value::from(10))]), obj(&[("B", Value::from(20))])]
	);
	scope.close().await;
}

#[tokio::test]
async fn explain_reports_unexpected_plugin_arguments() {
	let scope = Scope::new_root();
	let explainer = Arc::new(Explainer::new());
	scope.set_explainer(explainer.clone());
	let rows = run(&scope, "EXPLAIN SELECT 'A' FROM range(end=1, foo=2)").await;
	assert!(rows.is_empty());
	assert!(
		explainer.contains("Unexpected arg foo"),
		"explainer lines: {:?}",
		explainer.lines()
	);
	scope.close().await;
}

struct Panic;

#[async_trait::async_trait]
impl Function for Panic {
	fn info(&self, _scope: &Scope) -> FunctionInfo {
		FunctionInfo {
			name: "panic",
			doc: "Panics when called",
			args: &[],
			aggregate: false,
			version: 1,
		}
	}

	async fn call(&self, _ctx: &Context, _scope: &Scope, _args: CallArgs) -> Value {
		panic!("the panic function was called");
	}
}

#[tokio::test]
async fn if_branches_are_lazy() {
	let scope = Scope::new_root();
	scope.append_functions([Arc::new(Panic) as Arc<dyn Function>]);
	let rows = run(&scope, "SELECT if(condition=FALSE, then=panic()) AS v FROM scope()").await;
	assert_eq!(rows, vec![obj(&[("v", Value::Null)])]);
	scope.close().await;
}

#[tokio::test]
async fn self_referential_let_terminates_with_null() {
	let scope = Scope::new_root();
	let rows = run(&scope, "LET X = 1 + X  SELECT X FROM scope()").await;
	assert_eq!(rows, vec![obj(&[("X", Value::Null)])]);
	scope.close().await;
}

#[tokio::test]
async fn sequence_addition_concatenates() {
	let scope = Scope::new_root();
	let rows = run(&scope, "SELECT (1, 2, 3) + (4, 5) AS v FROM scope()").await;
	let Some(Value::Array(v)) = rows[0].get("v") else {
		panic!("expected an array column");
	};
	let items: Vec<i64> = v
		.iter()
		.map(|v| match v {
			Value::Number(n) => n.as_int(),
			v => panic!("unexpected element {v:?}"),
		})
		.collect();
	assert_eq!(items, [1, 2, 3, 4, 5]);
	scope.close().await;
}

#[tokio::test]
async fn arithmetic_boundaries() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"SELECT 10 / 0 AS a, 'abc' * 10 AS b, 281462092005375 = 65535 * 65535 * 65535 AS c \
		 FROM scope()",
	)
	.await;
	assert_eq!(rows[0].get("a"), Some(&Value::Null));
	assert_eq!(rows[0].get("b"), Some(&Value::from("abcabcabcabcabcabcabcabcabcabc")));
	assert_eq!(rows[0].get("c"), Some(&Value::Bool(true)));
	scope.close().await;
}

#[tokio::test]
async fn oversized_string_product_logs_and_nulls() {
	let scope = Scope::new_root();
	let logged = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
	let sink = logged.clone();
	scope.set_logger(Arc::new(move |line: &str| {
		sink.lock().unwrap().push(line.to_string());
	}));
	let rows = run(&scope, "SELECT 'a' * 1000000000 AS v FROM scope()").await;
	assert_eq!(rows[0].get("v"), Some(&Value::Null));
	assert!(logged.lock().unwrap().iter().any(|l| l.contains("exceeds")));
	scope.close().await;
}

#[tokio::test]
async fn limit_terminates_a_large_stream_early() {
	let scope = Scope::new_root();
	let rows = run(&scope, "SELECT * FROM range(start=1, end=100000000) LIMIT 3").await;
	assert_eq!(rows.len(), 3);
	// The producer was cancelled well before the end of the range
	let scanned = scope.stats().rows_scanned();
	assert!(scanned < 1000, "scanned {scanned} rows for a LIMIT 3 query");
	scope.close().await;
}

#[tokio::test]
async fn group_by_bins_are_independent_and_ordered() {
	let scope = Scope::new_root();
	// Group values by parity; bins emit in first-seen order
	let rows = run(
		&scope,
		"SELECT _value / 2 * 2 = _value AS even, count() AS n, sum(items=_value) AS total \
		 FROM range(start=1, end=6) GROUP BY _value / 2 * 2 = _value",
	)
	.await;
	assert_eq!(
		rows,
		vec![
			obj(&[
				("even", Value::Bool(false)),
				("n", Value::from(3)),
				("total", Value::from(9)),
			]),
			obj(&[
				("even", Value::Bool(true)),
				("n", Value::from(3)),
				("total", Value::from(12)),
			]),
		]
	);
	scope.close().await;
}

#[tokio::test]
async fn order_by_sorts_and_reverses() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"SELECT _value AS v FROM range(start=1, end=3) ORDER BY v DESC",
	)
	.await;
	assert_eq!(
		rows,
		vec![
			obj(&[("v", Value::from(3))]),
			obj(&[("v", Value::from(2))]),
			obj(&[("v", Value::from(1))]),
		]
	);
	scope.close().await;
}

#[tokio::test]
async fn projection_preserves_input_columns_through_star() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"SELECT *, _value * 2 AS doubled FROM range(start=2, end=2)",
	)
	.await;
	assert_eq!(
		rows,
		vec![obj(&[("_value", Value::from(2)), ("doubled", Value::from(4))])]
	);
	scope.close().await;
}

#[tokio::test]
async fn aliases_shadow_star_copies() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"SELECT *, _value * 10 AS _value FROM range(start=3, end=3)",
	)
	.await;
	assert_eq!(rows, vec![obj(&[("_value", Value::from(30))])]);
	scope.close().await;
}

#[tokio::test]
async fn where_sees_projection_aliases() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"SELECT _value * 10 AS big FROM range(start=1, end=3) WHERE big = 20",
	)
	.await;
	assert_eq!(rows, vec![obj(&[("big", Value::from(20))])]);
	scope.close().await;
}

#[tokio::test]
async fn materialized_let_reproduces_rows_in_order() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"LET X <= SELECT * FROM range(start=1, end=4)  SELECT * FROM X",
	)
	.await;
	let values: Vec<Value> = rows.iter().map(|r| r.resolve("_value").0).collect();
	assert_eq!(
		values,
		vec![Value::from(1), Value::from(2), Value::from(3), Value::from(4)]
	);
	scope.close().await;
}

#[tokio::test]
async fn parameterized_stored_queries_bind_arguments() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"LET upto(n) = SELECT * FROM range(start=1, end=n)  SELECT * FROM upto(n=2)",
	)
	.await;
	assert_eq!(
		rows,
		vec![obj(&[("_value", Value::from(1))]), obj(&[("_value", Value::from(2))])]
	);
	scope.close().await;
}

#[tokio::test]
async fn subquery_of_one_cell_reduces_to_a_scalar() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"SELECT {SELECT _value FROM range(start=7, end=7)} AS v FROM scope()",
	)
	.await;
	assert_eq!(rows, vec![obj(&[("v", Value::from(7))])]);
	scope.close().await;
}

#[tokio::test]
async fn flatten_expands_sequence_columns() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"SELECT * FROM flatten(query={SELECT 1 AS id, [10, 20] AS xs FROM scope()})",
	)
	.await;
	assert_eq!(
		rows,
		vec![
			obj(&[("id", Value::from(1)), ("xs", Value::from(10))]),
			obj(&[("id", Value::from(1)), ("xs", Value::from(20))]),
		]
	);
	scope.close().await;
}

#[tokio::test]
async fn scalar_functions_cover_the_builtin_surface() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"SELECT split(string='a,b,c', sep=',') AS parts, \
		 format(format='%s=%d', args=['x', 3]) AS fmt, \
		 len(list=[1, 2, 3]) AS n, \
		 encode(string='abc', type='hex') AS hexed, \
		 get(item=dict(a=5), member='a') AS got, \
		 version(plugin='range') AS ver \
		 FROM scope()",
	)
	.await;
	let row = &rows[0];
	let Some(Value::Array(parts)) = row.get("parts") else {
		panic!("expected parts to be an array");
	};
	assert_eq!(parts.len(), 3);
	assert_eq!(row.get("fmt"), Some(&Value::from("x=3")));
	assert_eq!(row.get("n"), Some(&Value::from(3)));
	assert_eq!(row.get("hexed"), Some(&Value::from("616263")));
	assert_eq!(row.get("got"), Some(&Value::from(5)));
	assert_eq!(row.get("ver"), Some(&Value::from(1)));
	scope.close().await;
}

#[tokio::test]
async fn unknown_from_sources_log_a_suggestion() {
	let scope = Scope::new_root();
	let logged = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
	let sink = logged.clone();
	scope.set_logger(Arc::new(move |line: &str| {
		sink.lock().unwrap().push(line.to_string());
	}));
	let rows = run(&scope, "SELECT * FROM rnge(end=3)").await;
	assert!(rows.is_empty());
	let logged = logged.lock().unwrap();
	assert!(logged.iter().any(|l| l.contains("rnge") && l.contains("range")), "{logged:?}");
	scope.close().await;
}

#[tokio::test]
async fn timestamps_compare_against_epoch_numbers() {
	let scope = Scope::new_root();
	let rows = run(
		&scope,
		"SELECT timestamp(epoch=100) < 200 AS before, timestamp(epoch=100) < 50 AS after \
		 FROM scope()",
	)
	.await;
	assert_eq!(rows[0].get("before"), Some(&Value::Bool(true)));
	assert_eq!(rows[0].get("after"), Some(&Value::Bool(false)));
	scope.close().await;
}
