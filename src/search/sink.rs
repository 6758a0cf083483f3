// src/search/sink.rs
//! Where the dispatcher delivers the entries of successful queries

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::blocklist::Blocklist;
use crate::crtsh::CertificateEntry;
use crate::extract;
use crate::set::ConcurrentSet;

/// Receives the entries of every successful query
///
/// Called concurrently from all workers of a pool.
pub trait EntrySink: Send + Sync {
    fn accept(&self, entries: Vec<CertificateEntry>);
}

/// Accumulates hostnames (and optionally organizations) into shared sets
pub struct CollectSink {
    blocklist: Arc<Blocklist>,
    hostnames: ConcurrentSet,
    organizations: Option<ConcurrentSet>,
}

impl CollectSink {
    /// Collect hostnames only
    pub fn hostnames(blocklist: Arc<Blocklist>, hostnames: ConcurrentSet) -> Self {
        Self {
            blocklist,
            hostnames,
            organizations: None,
        }
    }

    /// Collect hostnames and issuer organizations
    pub fn with_organizations(
        blocklist: Arc<Blocklist>,
        hostnames: ConcurrentSet,
        organizations: ConcurrentSet,
    ) -> Self {
        Self {
            blocklist,
            hostnames,
            organizations: Some(organizations),
        }
    }
}

impl EntrySink for CollectSink {
    fn accept(&self, entries: Vec<CertificateEntry>) {
        for entry in &entries {
            let extraction = extract::extract(entry, &self.blocklist);
            for hostname in extraction.hostnames {
                self.hostnames.add(hostname);
            }

            if let (Some(organizations), Some(org)) = (&self.organizations, extraction.organization) {
                organizations.add(org);
            }
        }
    }
}

/// Pushes every extracted hostname onto an unbounded results stream
///
/// The stream closes once the last clone of this sink is dropped.
pub struct StreamSink {
    blocklist: Arc<Blocklist>,
    results: mpsc::UnboundedSender<String>,
}

impl StreamSink {
    pub fn new(blocklist: Arc<Blocklist>, results: mpsc::UnboundedSender<String>) -> Self {
        Self { blocklist, results }
    }
}

impl EntrySink for StreamSink {
    fn accept(&self, entries: Vec<CertificateEntry>) {
        for entry in &entries {
            for hostname in extract::hostnames(entry, &self.blocklist) {
                // Receiver gone means the consumer stopped; nothing to deliver to
                if self.results.send(hostname).is_err() {
                    return;
                }
            }
        }
    }
}
