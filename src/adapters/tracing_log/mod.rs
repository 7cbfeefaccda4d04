// Tracing log adapter - Routes LogPort messages into the tracing subscriber

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::ports::*;

/// Tracing log adapter. The subscriber itself is installed once at startup by
/// `utils::logging::init_logging`.
#[derive(Debug, Clone)]
pub struct TracingLogAdapter {
    component: &'static str,
}

impl TracingLogAdapter {
    /// Create new tracing log adapter tagging every event with `component`
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn component(&self) -> &'static str {
        self.component
    }
}

impl Default for TracingLogAdapter {
    fn default() -> Self {
        Self::new("stackclip")
    }
}

#[async_trait]
impl LogPort for TracingLogAdapter {
    async fn info(&self, message: &str) {
        info!(component = self.component, "{}", message);
    }

    async fn warn(&self, message: &str) {
        warn!(component = self.component, "{}", message);
    }

    async fn error(&self, message: &str) {
        error!(component = self.component, "{}", message);
    }

    async fn debug(&self, message: &str) {
        debug!(component = self.component, "{}", message);
    }
}
