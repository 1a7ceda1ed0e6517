use std::{
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use folio_kit::{Cache, CacheError, Debounce, KeyValueStore, Limiter, MemoryStore, Throttle};
use serde_json::{json, Value};
use tokio::time::{self, Instant};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn with_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    (result, logs)
}

type Calls<A> = Arc<Mutex<Vec<(Instant, A)>>>;

fn recorder<A: Send + 'static>() -> (Calls<A>, impl Fn(A) + Send + Sync) {
    let calls: Calls<A> = Arc::default();
    let sink = calls.clone();
    (calls, move |args| sink.lock().unwrap().push((Instant::now(), args)))
}

#[tokio::test(start_paused = true)]
async fn debounce_collapses_burst() {
    let (calls, callback) = recorder();
    let debounce = Debounce::init(Duration::from_millis(50), callback);
    let start = Instant::now();

    for (at, args) in [(0, "t0"), (10, "t10"), (20, "t20")] {
        time::sleep_until(start + Duration::from_millis(at)).await;
        debounce.call(args);
    }
    time::sleep_until(start + Duration::from_millis(200)).await;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], (start + Duration::from_millis(70), "t20"));
}

#[tokio::test(start_paused = true)]
async fn throttle_first_call_wins() {
    let (calls, callback) = recorder();
    let throttle = Throttle::init(Duration::from_millis(100), callback);
    let start = Instant::now();

    for (at, args) in [(0, "t0"), (5, "t5"), (10, "t10"), (150, "t150")] {
        time::sleep_until(start + Duration::from_millis(at)).await;
        throttle.call(args);
    }

    let calls = calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            (start, "t0"),
            (start + Duration::from_millis(150), "t150"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn throttle_never_locks_out() {
    let (calls, callback) = recorder();
    let throttle = Throttle::init(Duration::from_millis(100), callback);

    for round in 0..5 {
        throttle.call(round);
        time::sleep(Duration::from_millis(250)).await;
    }

    assert_eq!(calls.lock().unwrap().len(), 5);
}

#[test]
fn cache_round_trip() {
    let cache = Cache::new(MemoryStore::new());

    cache.save("k", &json!({ "a": 1 }));

    assert_eq!(cache.load::<Value>("k"), Some(json!({ "a": 1 })));
}

#[test]
fn cache_miss_is_quiet() {
    let cache = Cache::new(MemoryStore::new());

    let (loaded, logs) = with_logs(|| cache.load::<Value>("missing"));

    assert_eq!(loaded, None);
    assert!(!logs.contains("ERROR"), "unexpected logs: {logs}");
}

#[test]
fn corrupt_entry_reads_as_missing_and_is_logged() {
    let cache = Cache::new(MemoryStore::new());
    cache.store().set("k", "{not json".to_string()).unwrap();

    let (loaded, logs) = with_logs(|| cache.load::<Value>("k"));

    assert_eq!(loaded, None);
    assert!(logs.contains("ERROR"), "missing error log: {logs}");
    assert!(logs.contains("failed to decode"), "missing decode failure: {logs}");
    assert!(matches!(
        cache.try_load::<Value>("k"),
        Err(CacheError::Decode { .. })
    ));
}

#[test]
fn removing_missing_key_is_quiet() {
    let cache = Cache::new(MemoryStore::new());

    let ((), logs) = with_logs(|| cache.remove("missing"));

    assert!(!logs.contains("ERROR"), "unexpected logs: {logs}");
    assert!(cache.try_remove("missing").is_ok());
}

#[test]
fn quota_failure_is_logged_not_raised() {
    let cache = Cache::new(MemoryStore::with_quota(16));
    let big = "x".repeat(100);

    let ((), logs) = with_logs(|| cache.save("big", &big));

    assert!(logs.contains("failed to save to storage"), "missing log: {logs}");
    assert_eq!(cache.load::<String>("big"), None);
}
