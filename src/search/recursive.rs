// src/search/recursive.rs
use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info};

use super::SearchPlan;
use super::dispatcher::Dispatcher;
use super::sink::CollectSink;
use crate::blocklist::Blocklist;
use crate::filter::ScopeFilter;
use crate::output::HostnameWriter;
use crate::set::ConcurrentSet;

/// Four-stage pivot search
///
/// 1. Query every input domain, bare and wildcard, collecting hostnames and
///    issuer organizations.
/// 2. Query every organization found in stage 1.
/// 3. Query every hostname found in stage 1.
/// 4. Keep the hostnames that belong to an input domain, sorted.
///
/// Stages 2 and 3 are seeded from snapshots taken after stage 1 drained, so
/// each pivot runs for exactly one generation. Every stage waits for its pool
/// to drain before the next one starts.
pub struct RecursiveSearch {
    dispatcher: Dispatcher,
    blocklist: Arc<Blocklist>,
    all_subdomains: ConcurrentSet,
    all_orgs: ConcurrentSet,
}

/// Seeds for the pivot stages, frozen at the end of stage 1
#[derive(Debug)]
pub struct StageOneSnapshot {
    pub subdomains: ConcurrentSet,
    pub orgs: ConcurrentSet,
}

impl RecursiveSearch {
    pub fn new(dispatcher: Dispatcher, blocklist: Arc<Blocklist>) -> Self {
        Self {
            dispatcher,
            blocklist,
            all_subdomains: ConcurrentSet::new(),
            all_orgs: ConcurrentSet::new(),
        }
    }

    /// Run all stages and write the in-scope hostnames, one per line
    ///
    /// Returns the number of hostnames written.
    pub async fn run<W: Write>(
        &self,
        domains: &[String],
        output: &mut HostnameWriter<W>,
    ) -> Result<usize> {
        let results = self.discover(domains).await;

        for hostname in &results {
            output.emit(hostname)?;
        }

        Ok(results.len())
    }

    /// Run all stages and return the in-scope hostnames in ascending order
    pub async fn discover(&self, domains: &[String]) -> Vec<String> {
        info!(
            "Starting recursive search with {} domains and {} workers",
            domains.len(),
            self.dispatcher.workers()
        );

        let seeds = self.stage_one(domains).await;
        self.stage_two(&seeds.orgs).await;
        self.stage_three(&seeds.subdomains).await;
        self.stage_four(domains)
    }

    /// Seed expansion: bare and wildcard query per input domain
    pub async fn stage_one(&self, domains: &[String]) -> StageOneSnapshot {
        let progress = self.dispatcher.progress();
        progress.banner("Stage 1: Finding initial subdomains and organizations...");

        let queries = SearchPlan::Recursive(domains.to_vec()).initial_queries();
        debug!("Stage 1: Processing {} initial domains", domains.len());

        let sink = Arc::new(CollectSink::with_organizations(
            Arc::clone(&self.blocklist),
            self.all_subdomains.clone(),
            self.all_orgs.clone(),
        ));

        // Two queries per domain, so the queue is twice as deep
        let dispatcher = self
            .dispatcher
            .clone()
            .with_queue_capacity(self.dispatcher.workers() * 2);
        dispatcher.run("Stage 1", queries, sink).await;

        let seeds = StageOneSnapshot {
            subdomains: self.all_subdomains.snapshot(),
            orgs: self.all_orgs.snapshot(),
        };

        progress.banner(&format!(
            "Stage 1: Found {} unique subdomains and {} unique organizations.",
            seeds.subdomains.len(),
            seeds.orgs.len()
        ));

        seeds
    }

    /// Organization pivot: hostnames only, no further organizations
    pub async fn stage_two(&self, orgs: &ConcurrentSet) {
        let progress = self.dispatcher.progress();
        progress.banner("Stage 2: Searching based on discovered organizations...");
        debug!("Stage 2: Processing {} organizations", orgs.len());

        let sink = Arc::new(CollectSink::hostnames(
            Arc::clone(&self.blocklist),
            self.all_subdomains.clone(),
        ));
        self.dispatcher.run("Stage 2", orgs.sorted(), sink).await;

        progress.banner(&format!(
            "Stage 2: Total unique domains after org search: {}.",
            self.all_subdomains.len()
        ));
    }

    /// Subdomain pivot: re-query each stage 1 hostname as-is to surface
    /// certificates sharing its SAN list
    pub async fn stage_three(&self, subdomains: &ConcurrentSet) {
        let progress = self.dispatcher.progress();
        progress.banner("Stage 3: Searching based on discovered subdomains...");
        debug!("Stage 3: Processing {} subdomains", subdomains.len());

        let sink = Arc::new(CollectSink::hostnames(
            Arc::clone(&self.blocklist),
            self.all_subdomains.clone(),
        ));
        self.dispatcher.run("Stage 3", subdomains.sorted(), sink).await;

        progress.banner(&format!(
            "Stage 3: Total unique domains after subdomain pivot: {}.",
            self.all_subdomains.len()
        ));
    }

    /// Scope filter: drop everything outside the input domains
    pub fn stage_four(&self, domains: &[String]) -> Vec<String> {
        self.dispatcher
            .progress()
            .banner("Stage 4: Filtering and printing results...");

        let scope = ScopeFilter::from_list(domains);
        debug!(
            "Stage 4: Filtering {} domains for {} initial domains",
            self.all_subdomains.len(),
            scope.count()
        );

        let results: Vec<String> = self
            .all_subdomains
            .sorted()
            .into_iter()
            .filter(|hostname| scope.in_scope(hostname))
            .collect();

        debug!("Stage 4: Filtered to {} final results", results.len());
        results
    }

    /// Everything accumulated so far, in scope or not
    pub fn all_subdomains(&self) -> &ConcurrentSet {
        &self.all_subdomains
    }

    pub fn all_orgs(&self) -> &ConcurrentSet {
        &self.all_orgs
    }
}
