// src/search/dispatcher.rs
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::sink::EntrySink;
use crate::crtsh::CertSource;
use crate::progress::ProgressIndicator;
use crate::stats::{DispatchStats, DispatchSummary};

pub const DEFAULT_WORKERS: usize = 50;

type SharedQueue = Arc<Mutex<mpsc::Receiver<String>>>;

/// Fixed-size worker pool draining a bounded query queue
///
/// Every worker pulls a query, fetches it from the [`CertSource`] and hands
/// the entries to an [`EntrySink`]. A failed query is logged and skipped;
/// it never stops the worker or its siblings.
#[derive(Clone)]
pub struct Dispatcher {
    source: Arc<dyn CertSource>,
    workers: usize,
    queue_capacity: usize,
    progress: ProgressIndicator,
}

/// Everything one worker needs, cloned per task
#[derive(Clone)]
struct WorkerContext {
    label: Arc<str>,
    total: Option<usize>,
    source: Arc<dyn CertSource>,
    sink: Arc<dyn EntrySink>,
    stats: DispatchStats,
    progress: ProgressIndicator,
}

impl Dispatcher {
    /// Create a pool of `workers` tasks (at least one) with a queue as deep
    /// as the pool
    pub fn new(source: Arc<dyn CertSource>, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            source,
            workers,
            queue_capacity: workers,
            progress: ProgressIndicator::disabled(),
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn with_progress(mut self, progress: ProgressIndicator) -> Self {
        self.progress = progress;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn progress(&self) -> &ProgressIndicator {
        &self.progress
    }

    /// Fan out `queries`, then wait until every worker has exited
    ///
    /// The queue is filled from the calling task while the workers drain it;
    /// when this returns every query has been attempted exactly once.
    pub async fn run<I>(&self, label: &str, queries: I, sink: Arc<dyn EntrySink>) -> DispatchSummary
    where
        I: IntoIterator<Item = String>,
    {
        let queries: Vec<String> = queries.into_iter().collect();
        let (tx, handles, stats) = self.spawn_workers(label, Some(queries.len()), sink);

        for query in queries {
            if tx.send(query).await.is_err() {
                error!("{}: all workers exited before the queue was drained", label);
                break;
            }
        }
        // Closing the queue lets idle workers observe the end of input
        drop(tx);

        join_workers(handles).await;
        let summary = stats.snapshot();
        debug!("{} finished: {}", label, summary.format());
        summary
    }

    /// Start a background producer feeding `queries` while the pool drains
    ///
    /// The queue is closed as soon as the producer is done. The returned
    /// handle resolves once every worker has exited, which is also the point
    /// at which the pool drops its last reference to `sink`.
    pub fn spawn_streamed<I>(
        &self,
        label: &str,
        queries: I,
        sink: Arc<dyn EntrySink>,
    ) -> JoinHandle<DispatchSummary>
    where
        I: IntoIterator<Item = String> + Send + 'static,
        I::IntoIter: Send,
    {
        let (tx, handles, stats) = self.spawn_workers(label, None, sink);
        let label = label.to_string();

        let producer_label = label.clone();
        let producer = tokio::spawn(async move {
            let mut queued = 0usize;
            for query in queries {
                if tx.send(query).await.is_err() {
                    error!("{}: all workers exited before the queue was drained", producer_label);
                    break;
                }
                queued += 1;
            }
            debug!("{}: all {} queries queued", producer_label, queued);
        });

        tokio::spawn(async move {
            if let Err(e) = producer.await {
                error!("{}: query producer failed: {}", label, e);
            }
            join_workers(handles).await;
            let summary = stats.snapshot();
            debug!("{} finished: {}", label, summary.format());
            summary
        })
    }

    fn spawn_workers(
        &self,
        label: &str,
        total: Option<usize>,
        sink: Arc<dyn EntrySink>,
    ) -> (mpsc::Sender<String>, Vec<JoinHandle<()>>, DispatchStats) {
        debug!(
            "{}: starting {} workers, queue capacity {}",
            label,
            self.workers(),
            self.queue_capacity()
        );
        let (tx, rx) = mpsc::channel(self.queue_capacity());
        let queue: SharedQueue = Arc::new(Mutex::new(rx));
        let stats = DispatchStats::new();

        let ctx = WorkerContext {
            label: Arc::from(label),
            total,
            source: Arc::clone(&self.source),
            sink,
            stats: stats.clone(),
            progress: self.progress.clone(),
        };

        debug!("{}: starting {} workers", label, self.workers);

        let handles = (0..self.workers)
            .map(|id| {
                let queue = Arc::clone(&queue);
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    worker_loop(id, queue, ctx).await;
                })
            })
            .collect();

        (tx, handles, stats)
    }
}

async fn worker_loop(id: usize, queue: SharedQueue, ctx: WorkerContext) {
    loop {
        // Holding the lock across recv serialises idle workers; once the
        // queue is closed each of them gets None in turn.
        let next = queue.lock().await.recv().await;
        let Some(query) = next else {
            break;
        };

        let n = ctx.stats.record_attempt();
        ctx.progress.set_message(match ctx.total {
            Some(total) => format!("{}: {}/{} queries", ctx.label, n, total),
            None => format!("{}: {} queries", ctx.label, n),
        });

        match ctx.source.fetch(&query).await {
            Ok(entries) => {
                ctx.stats.record_success(entries.len());
                ctx.sink.accept(entries);
            }
            Err(e) => {
                ctx.stats.record_failure();
                warn!("Skipping query: {}", e);
            }
        }
    }

    debug!("{}: worker {} finished", ctx.label, id);
}

async fn join_workers(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(e) = handle.await {
            error!("Worker task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crtsh::{CertificateEntry, FetchError};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Records every query; queries starting with "fail" return an error
    #[derive(Default)]
    struct RecordingSource {
        seen: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl CertSource for RecordingSource {
        async fn fetch(&self, query: &str) -> Result<Vec<CertificateEntry>, FetchError> {
            self.seen.lock().unwrap().push(query.to_string());
            tokio::time::sleep(Duration::from_millis(1)).await;
            if query.starts_with("fail") {
                return Err(FetchError::BadStatus {
                    query: query.to_string(),
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                });
            }
            Ok(vec![CertificateEntry {
                issuer_name: String::new(),
                common_name: query.to_string(),
                name_value: String::new(),
            }])
        }
    }

    /// Counts how often each common name arrives
    #[derive(Default)]
    struct CountingSink {
        counts: StdMutex<HashMap<String, usize>>,
    }

    impl EntrySink for CountingSink {
        fn accept(&self, entries: Vec<CertificateEntry>) {
            let mut counts = self.counts.lock().unwrap();
            for entry in entries {
                *counts.entry(entry.common_name).or_default() += 1;
            }
        }
    }

    fn queries(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("q{}.example.com", i)).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_run_attempts_each_query_once() {
        let source = Arc::new(RecordingSource::default());
        let sink = Arc::new(CountingSink::default());
        let dispatcher = Dispatcher::new(source.clone(), 8);

        let summary = dispatcher.run("test", queries(200), sink.clone()).await;

        assert_eq!(summary.attempted, 200);
        assert_eq!(summary.succeeded, 200);
        assert_eq!(summary.failed, 0);
        assert_eq!(source.seen.lock().unwrap().len(), 200);

        let counts = sink.counts.lock().unwrap();
        assert_eq!(counts.len(), 200);
        assert!(counts.values().all(|&c| c == 1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failures_do_not_stop_the_pool() {
        let source = Arc::new(RecordingSource::default());
        let sink = Arc::new(CountingSink::default());
        let dispatcher = Dispatcher::new(source.clone(), 3);

        let mut input = queries(10);
        input.extend((0..5).map(|i| format!("fail{}", i)));

        let summary = dispatcher.run("test", input, sink.clone()).await;

        assert_eq!(summary.attempted, 15);
        assert_eq!(summary.succeeded, 10);
        assert_eq!(summary.failed, 5);
        assert_eq!(sink.counts.lock().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_run_with_empty_input() {
        let source = Arc::new(RecordingSource::default());
        let dispatcher = Dispatcher::new(source.clone(), 4);

        let summary = dispatcher
            .run("test", Vec::new(), Arc::new(CountingSink::default()))
            .await;

        assert_eq!(summary.attempted, 0);
        assert!(source.seen.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_more_queries_than_queue_capacity() {
        let source = Arc::new(RecordingSource::default());
        let sink = Arc::new(CountingSink::default());
        let dispatcher = Dispatcher::new(source, 2).with_queue_capacity(1);

        let summary = dispatcher.run("test", queries(50), sink.clone()).await;

        assert_eq!(summary.attempted, 50);
        assert_eq!(sink.counts.lock().unwrap().len(), 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_streamed_drains_everything() {
        let source = Arc::new(RecordingSource::default());
        let sink = Arc::new(CountingSink::default());
        let dispatcher = Dispatcher::new(source.clone(), 5);

        let handle = dispatcher.spawn_streamed("stream", queries(120), sink.clone());
        let summary = handle.await.unwrap();

        assert_eq!(summary.attempted, 120);
        assert_eq!(summary.succeeded, 120);
        assert_eq!(sink.counts.lock().unwrap().len(), 120);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_streamed_releases_sink_when_done() {
        let source = Arc::new(RecordingSource::default());
        let sink = Arc::new(CountingSink::default());
        let dispatcher = Dispatcher::new(source, 5);

        let handle = dispatcher.spawn_streamed("stream", queries(20), sink.clone());
        handle.await.unwrap();

        // Only the test's own reference is left
        assert_eq!(Arc::strong_count(&sink), 1);
    }

    #[test]
    fn test_zero_workers_clamped() {
        let dispatcher = Dispatcher::new(Arc::new(RecordingSource::default()), 0).with_queue_capacity(0);

        assert_eq!(dispatcher.workers(), 1);
        assert_eq!(dispatcher.queue_capacity(), 1);
    }
}
