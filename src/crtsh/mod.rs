// src/crtsh/mod.rs
pub mod client;
pub mod error;
pub mod types;

pub use client::{CrtShClient, FetchSettings};
pub use error::FetchError;
pub use types::CertificateEntry;

use async_trait::async_trait;

/// Anything that can answer a certificate search query.
///
/// The dispatcher only talks to this trait, so the orchestrator can be
/// driven by crt.sh in production and by canned responses in tests.
#[async_trait]
pub trait CertSource: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<Vec<CertificateEntry>, FetchError>;
}
