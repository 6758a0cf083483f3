// src/extract.rs
//! Hostname and organization extraction from certificate entries

use crate::blocklist::Blocklist;
use crate::crtsh::CertificateEntry;

/// What one certificate entry contributes to a search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Candidate hostnames in field order, duplicates included
    pub hostnames: Vec<String>,
    pub organization: Option<String>,
}

/// Extract hostnames and the issuer organization from an entry
pub fn extract(entry: &CertificateEntry, blocklist: &Blocklist) -> Extraction {
    Extraction {
        hostnames: hostnames(entry, blocklist).collect(),
        organization: organization_name(&entry.issuer_name),
    }
}

/// Iterate over the valid hostnames of an entry
///
/// Both `common_name` and `name_value` may list several names separated by
/// newlines. Names are trimmed; empty names, wildcard names and blocked
/// names are dropped.
pub fn hostnames<'a>(
    entry: &'a CertificateEntry,
    blocklist: &'a Blocklist,
) -> impl Iterator<Item = String> + 'a {
    [entry.common_name.as_str(), entry.name_value.as_str()]
        .into_iter()
        .flat_map(|field| field.split('\n'))
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.contains('*') && !blocklist.is_blocked(name))
        .map(str::to_string)
}

/// Organization (`O=`) attribute of an issuer distinguished name
///
/// Returns the text between the first `O=` that is followed by at least
/// one non-comma character and the next comma (or the end of the string).
pub fn organization_name(issuer: &str) -> Option<String> {
    issuer.match_indices("O=").find_map(|(idx, marker)| {
        let rest = &issuer[idx + marker.len()..];
        let value = rest.split(',').next().unwrap_or_default();
        (!value.is_empty()).then(|| value.to_string())
    })
}
