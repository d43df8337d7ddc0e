//! Document rendering for placement contracts.
//!
//! `AppState` carries an `Arc<dyn DocumentRenderer>`. The default
//! `MarkdownRenderer` waits a configured latency and emits a markdown contract;
//! a PDF or e-signature backend can replace it without touching the handlers.

pub mod contract;
pub mod handlers;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::documents::contract::{render_contract_md, ContractDocument};

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The contract points at a candidate or client that no longer exists.
    #[error("{role} '{id}' referenced by the contract does not exist")]
    MissingParty { role: &'static str, id: String },

    #[error("rendering failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, document: &ContractDocument) -> Result<RenderedDocument, RenderError>;
}

pub struct MarkdownRenderer {
    latency: Duration,
}

impl MarkdownRenderer {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl DocumentRenderer for MarkdownRenderer {
    async fn render(&self, document: &ContractDocument) -> Result<RenderedDocument, RenderError> {
        tokio::time::sleep(self.latency).await;
        let body = render_contract_md(document);
        if body.is_empty() {
            return Err(RenderError::Failed("empty document".to_string()));
        }
        debug!(
            "Rendered contract {} ({} bytes)",
            document.contract.id,
            body.len()
        );
        Ok(RenderedDocument {
            file_name: document.file_name("md"),
            content_type: "text/markdown; charset=utf-8",
            bytes: Bytes::from(body),
        })
    }
}
