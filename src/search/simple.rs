// src/search/simple.rs
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::dispatcher::Dispatcher;
use super::sink::StreamSink;
use crate::blocklist::Blocklist;
use crate::output::HostnameWriter;

/// One-pass search: stream every query through the pool and print each
/// hostname the first time it shows up
///
/// Output is in first-seen order, which depends on response timing.
/// Returns the number of hostnames written.
pub async fn run_simple<W: Write>(
    dispatcher: &Dispatcher,
    queries: Vec<String>,
    blocklist: Arc<Blocklist>,
    output: &mut HostnameWriter<W>,
) -> Result<usize> {
    info!(
        "Starting simple search: {} queries, {} workers",
        queries.len(),
        dispatcher.workers()
    );

    let (results_tx, mut results_rx) = mpsc::unbounded_channel();
    let sink = Arc::new(StreamSink::new(blocklist, results_tx));
    let dispatch = dispatcher.spawn_streamed("Searching", queries, sink);

    let mut seen = HashSet::new();
    let mut emitted = 0;

    // Ends once every worker has exited and dropped its sink
    while let Some(hostname) = results_rx.recv().await {
        if seen.contains(&hostname) {
            continue;
        }
        output.emit(&hostname)?;
        seen.insert(hostname);
        emitted += 1;
    }

    let summary = dispatch.await.context("Search dispatch task failed")?;
    debug!("Simple search completed: {}", summary.format());
    info!("Found {} unique hostnames", emitted);

    Ok(emitted)
}
