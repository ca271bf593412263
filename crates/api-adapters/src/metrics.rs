//! Submission counters, exposed in Prometheus text format at `/metrics`.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

use services::submission::{SubmissionOutcome, SubmissionRecorder};

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Outcome {
    Accepted,
    Rejected,
    Honeypot,
    Throttled,
    StorageError,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OutcomeLabels {
    pub outcome: Outcome,
}

pub struct ApiMetrics {
    registry: Registry,
    submissions: Family<OutcomeLabels, Counter>,
}

impl ApiMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let submissions = Family::<OutcomeLabels, Counter>::default();
        registry.register(
            "maqblog_comment_submissions",
            "Comment submission attempts by outcome",
            submissions.clone(),
        );
        Self {
            registry,
            submissions,
        }
    }

    pub fn encode_text(&self) -> String {
        let mut buffer = String::new();
        if let Err(cause) = encode(&mut buffer, &self.registry) {
            tracing::error!(error = %cause, "metrics encoding failed");
        }
        buffer
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionRecorder for ApiMetrics {
    fn record(&self, outcome: SubmissionOutcome) {
        let outcome = match outcome {
            SubmissionOutcome::Accepted => Outcome::Accepted,
            SubmissionOutcome::Rejected => Outcome::Rejected,
            SubmissionOutcome::Honeypot => Outcome::Honeypot,
            SubmissionOutcome::Throttled => Outcome::Throttled,
            SubmissionOutcome::StorageError => Outcome::StorageError,
        };
        self.submissions
            .get_or_create(&OutcomeLabels { outcome })
            .inc();
    }
}
