// src/filter.rs
//! Scope filtering for recursive search output

/// Keeps hostnames that belong to one of the input domains
///
/// Matching is exact and case-sensitive, the same equality the result sets
/// use: a hostname is in scope if it equals a root domain or ends with
/// `.` + root domain.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    roots: Vec<String>,
}

impl ScopeFilter {
    /// Create a filter from a list of root domains
    pub fn from_list(domains: &[String]) -> Self {
        let mut roots: Vec<String> = Vec::with_capacity(domains.len());
        for domain in domains {
            if !domain.is_empty() && !roots.contains(domain) {
                roots.push(domain.clone());
            }
        }

        Self { roots }
    }

    /// Check if a hostname belongs to any root domain (exact or subdomain)
    pub fn in_scope(&self, hostname: &str) -> bool {
        self.roots.iter().any(|root| {
            hostname == root
                || hostname
                    .strip_suffix(root.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    /// Get the number of root domains in the filter
    pub fn count(&self) -> usize {
        self.roots.len()
    }
}
