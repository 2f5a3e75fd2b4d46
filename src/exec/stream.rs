use crate::cnf;
use crate::ctx::Context;
use crate::ql::Value;
use channel::{Receiver, Sender};
use std::future::Future;

/// A pull-based stream of rows backed by a bounded channel.
///
/// Producers own the matching [`Sender`] and close it on exit; consumers
/// pull rows until the channel closes. Dropping the stream unblocks any
/// producer waiting on a full channel.
#[derive(Debug)]
pub struct RowStream {
	rx: Receiver<Value>,
}

impl RowStream {
	/// Receive the next row, or None when the stream is exhausted
	pub async fn next(&mut self) -> Option<Value> {
		self.rx.recv().await.ok()
	}

	/// Drain the stream into a vector
	pub async fn collect(mut self) -> Vec<Value> {
		let mut out = Vec::new();
		while let Some(v) = self.next().await {
			out.push(v);
		}
		out
	}

	/// A stream which yields nothing
	pub fn empty() -> RowStream {
		let (_, rx) = channel::bounded(1);
		RowStream {
			rx,
		}
	}

	/// A stream over an in-memory vector of rows
	pub(crate) fn from_values(values: Vec<Value>) -> RowStream {
		let (tx, rx) = channel::bounded(values.len().max(1));
		for v in values {
			// The channel was sized to hold everything
			let _ = tx.try_send(v);
		}
		drop(tx);
		RowStream {
			rx,
		}
	}
}

/// Create a bounded row channel
pub(crate) fn bounded() -> (Sender<Value>, RowStream) {
	let (tx, rx) = channel::bounded(*cnf::ROW_CHANNEL_SIZE);
	(
		tx,
		RowStream {
			rx,
		},
	)
}

/// Send a row, honouring cancellation.
///
/// Returns false when the producer should stop, either because the context
/// is done or because the consumer went away.
pub(crate) async fn send(ctx: &Context, tx: &Sender<Value>, v: Value) -> bool {
	if ctx.is_done() {
		return false;
	}
	tokio::select! {
		res = tx.send(v) => res.is_ok(),
		_ = wait_done(ctx) => false,
	}
}

/// Resolve once the context is done. Used to unblock producers which are
/// waiting on a full channel when the query is cancelled.
pub(crate) async fn wait_done(ctx: &Context) {
	while ctx.is_ok() {
		tokio::time::sleep(std::time::Duration::from_millis(25)).await;
	}
}

/// Spawn a producer task which owns its sender and closes it on return.
pub(crate) fn spawn_source<F, Fut>(f: F) -> RowStream
where
	F: FnOnce(Sender<Value>) -> Fut,
	Fut: Future<Output = ()> + Send + 'static,
{
	let (tx, stream) = bounded();
	let fut = f(tx);
	tokio::spawn(fut);
	stream
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ctx::MutableContext;

	#[tokio::test]
	async fn producer_stops_when_consumer_drops() {
		let ctx = MutableContext::background().freeze();
		let mut stream = spawn_source(move |tx| async move {
			let mut i = 0i64;
			// An endless producer, stopped by the send failing
			while send(&ctx, &tx, Value::from(i)).await {
				i += 1;
			}
		});
		assert_eq!(stream.next().await, Some(Value::from(0)));
		drop(stream);
	}

	#[tokio::test]
	async fn from_values_preserves_order() {
		let stream = RowStream::from_values(vec![Value::from(1), Value::from(2)]);
		assert_eq!(stream.collect().await, vec![Value::from(1), Value::from(2)]);
	}
}
