// src/search/mod.rs
//! Query orchestration: simple fan-out and the recursive pivot pipeline
pub mod dispatcher;
pub mod recursive;
pub mod simple;
pub mod sink;

pub use dispatcher::{DEFAULT_WORKERS, Dispatcher};
pub use recursive::RecursiveSearch;
pub use simple::run_simple;
pub use sink::{CollectSink, EntrySink, StreamSink};

use thiserror::Error;

/// Invalid combination of search inputs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("cannot use domain flags (-d) or stdin and organization flag (-o) together")]
    DomainsWithOrganization,
    #[error("organization search (-o) cannot be combined with recursive search (-r)")]
    RecursiveWithOrganization,
    #[error("recursive search (-r) requires input from -d flags or stdin")]
    RecursiveWithoutDomains,
    #[error("no domains or organization to search for")]
    NoInput,
}

/// A validated search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPlan {
    /// One wildcard query per domain
    Domains(Vec<String>),
    /// A single organization-name query
    Organization(String),
    /// The four-stage pivot pipeline seeded with these domains
    Recursive(Vec<String>),
}

impl SearchPlan {
    /// Validate the inputs gathered from flags and stdin
    pub fn resolve(
        domains: Vec<String>,
        organization: Option<String>,
        recursive: bool,
    ) -> Result<Self, PlanError> {
        let organization = organization.filter(|o| !o.is_empty());
        let has_domains = !domains.is_empty();

        match (has_domains, organization, recursive) {
            (true, Some(_), _) => Err(PlanError::DomainsWithOrganization),
            (_, Some(_), true) => Err(PlanError::RecursiveWithOrganization),
            (false, None, true) => Err(PlanError::RecursiveWithoutDomains),
            (false, None, false) => Err(PlanError::NoInput),
            (false, Some(org), false) => Ok(SearchPlan::Organization(org)),
            (true, None, true) => Ok(SearchPlan::Recursive(domains)),
            (true, None, false) => Ok(SearchPlan::Domains(domains)),
        }
    }

    /// Seed queries for the first (or only) dispatch
    ///
    /// Recursive searches query both the bare domain and its wildcard form;
    /// simple domain searches only the wildcard form.
    pub fn initial_queries(&self) -> Vec<String> {
        match self {
            SearchPlan::Domains(domains) => domains.iter().map(|d| wildcard(d)).collect(),
            SearchPlan::Organization(org) => vec![org.clone()],
            SearchPlan::Recursive(domains) => domains
                .iter()
                .flat_map(|d| [d.clone(), wildcard(d)])
                .collect(),
        }
    }
}

/// crt.sh wildcard form of a domain (`%` is its LIKE wildcard)
pub fn wildcard(domain: &str) -> String {
    format!("%.{}", domain)
}
