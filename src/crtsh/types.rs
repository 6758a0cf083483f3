// src/crtsh/types.rs
use serde::{Deserialize, Deserializer, Serialize};

/// One row of crt.sh's `output=json` response.
///
/// crt.sh returns more columns (ids, timestamps, serials); only the three
/// used for discovery are kept. A `null` or missing column reads as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateEntry {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub issuer_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub common_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name_value: String, // newline separated SANs
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}
