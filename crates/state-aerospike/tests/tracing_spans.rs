//! Verifies that `#[instrument]` annotations on `AerospikeStore` produce
//! one span per operation, tagged with the caller's key.

#![allow(clippy::expect_used)]

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use kvstate_state::{DeleteRequest, GetRequest, Metadata, SetRequest, StateStore};
use kvstate_state_aerospike::{AerospikeStore, mock::MockCluster};
use serde_json::json;
use tracing::{
    Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan};

// ---------------------------------------------------------------------------
// Collecting layer: records span names and their `key` field
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct RecordedSpan {
    name: String,
    key: Option<String>,
}

#[derive(Clone, Default)]
struct SpanCollector {
    spans: Arc<Mutex<Vec<RecordedSpan>>>,
}

#[derive(Default)]
struct KeyVisitor(Option<String>);

impl Visit for KeyVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "key" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for SpanCollector
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            let mut visitor = KeyVisitor::default();
            attrs.record(&mut visitor);
            self.spans
                .lock()
                .expect("lock poisoned")
                .push(RecordedSpan { name: span.name().to_owned(), key: visitor.0 });
        }
    }
}

async fn store(cluster: &MockCluster) -> AerospikeStore {
    let metadata = Metadata::from_pairs([("hosts", "127.0.0.1:3000"), ("namespace", "test")]);
    AerospikeStore::init(cluster, &metadata).await.expect("init should succeed")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn set_creates_span_with_key() {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);

    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = store(&MockCluster::new()).await;
    store.set(&SetRequest::new("order-1", json!({"x": 1}))).await.expect("set should succeed");

    let recorded = spans.lock().expect("lock poisoned");
    assert!(
        recorded.iter().any(|s| s.name == "set" && s.key.as_deref() == Some("order-1")),
        "expected a 'set' span with key=order-1, got: {recorded:?}"
    );
}

#[tokio::test]
async fn get_creates_span() {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);

    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = store(&MockCluster::new()).await;
    let _ = store.get(&GetRequest::new("missing")).await;

    let recorded = spans.lock().expect("lock poisoned");
    assert!(recorded.iter().any(|s| s.name == "get"), "expected a 'get' span, got: {recorded:?}");
}

#[tokio::test]
async fn delete_creates_span() {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);

    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = store(&MockCluster::new()).await;
    store.delete(&DeleteRequest::new("key")).await.expect("delete should succeed");

    let recorded = spans.lock().expect("lock poisoned");
    assert!(
        recorded.iter().any(|s| s.name == "delete"),
        "expected a 'delete' span, got: {recorded:?}"
    );
}

#[tokio::test]
async fn bulk_set_nests_one_set_span_per_request() {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);

    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = store(&MockCluster::new()).await;
    let reqs = vec![SetRequest::new("a", json!({})), SetRequest::new("b", json!({}))];
    store.bulk_set(&reqs).await.expect("bulk_set should succeed");

    let recorded = spans.lock().expect("lock poisoned");
    assert!(recorded.iter().any(|s| s.name == "bulk_set"), "got: {recorded:?}");
    assert_eq!(recorded.iter().filter(|s| s.name == "set").count(), 2, "got: {recorded:?}");
}

#[tokio::test]
async fn ping_creates_span() {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);

    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = store(&MockCluster::new()).await;
    store.ping().await.expect("ping should succeed");

    let recorded = spans.lock().expect("lock poisoned");
    assert!(recorded.iter().any(|s| s.name == "ping"), "expected a 'ping' span, got: {recorded:?}");
}

#[tokio::test]
async fn bulk_delete_nests_one_delete_span_per_request() {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);

    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = store(&MockCluster::new()).await;
    let reqs = vec![DeleteRequest::new("a"), DeleteRequest::new("b"), DeleteRequest::new("c")];
    store.bulk_delete(&reqs).await.expect("bulk_delete should succeed");

    let recorded = spans.lock().expect("lock poisoned");
    assert_eq!(recorded.iter().filter(|s| s.name == "bulk_delete").count(), 1, "got: {recorded:?}");
    assert_eq!(recorded.iter().filter(|s| s.name == "delete").count(), 3, "got: {recorded:?}");
}
