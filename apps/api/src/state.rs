use std::sync::Arc;

use crate::config::Config;
use crate::documents::DocumentRenderer;
use crate::messaging::MessageProvider;
use crate::repo::Repositories;
use crate::retention::RetentionScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    /// Outbound WhatsApp/SMS/email delivery. Default: SimulatedProvider.
    pub messenger: Arc<dyn MessageProvider>,
    /// Contract document backend. Default: MarkdownRenderer.
    pub renderer: Arc<dyn DocumentRenderer>,
    pub retention_scorer: Arc<dyn RetentionScorer>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// Seeded stores and zero-latency simulated services.
    pub fn for_tests() -> Self {
        use std::time::Duration;

        use crate::documents::MarkdownRenderer;
        use crate::messaging::SimulatedProvider;
        use crate::retention::RuleBasedScorer;

        Self {
            repos: Repositories::seeded().expect("fixtures are valid"),
            messenger: Arc::new(SimulatedProvider::new(Duration::ZERO)),
            renderer: Arc::new(MarkdownRenderer::new(Duration::ZERO)),
            retention_scorer: Arc::new(RuleBasedScorer::default()),
            config: Config {
                simulated_latency_ms: 0,
                ..Config::default()
            },
        }
    }
}
