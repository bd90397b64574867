//! Resolve metrics.
//!
//! All metrics use OpenTelemetry conventions and are recorded through
//! whatever meter provider the host installs. Without one they are no-ops.

use chainsig_core::SignatureKind;
use chainsig_registry::DecodeOutcome;
use opentelemetry::{
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Metrics handle for resolution and publishing.
#[derive(Clone)]
pub struct ResolveMetrics {
    pub outcomes: Counter<u64>,
    pub candidates: Histogram<u64>,
    pub batch_size: Histogram<u64>,
    pub records: Counter<u64>,
}

impl ResolveMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            outcomes: meter
                .u64_counter("chainsig.resolve.outcomes")
                .with_description("Resolved inputs by outcome")
                .build(),
            candidates: meter
                .u64_histogram("chainsig.resolve.candidates")
                .with_description("Candidate signatures tried per resolve")
                .build(),
            batch_size: meter
                .u64_histogram("chainsig.resolve.batch_size")
                .with_description("Number of inputs in a batch resolve")
                .build(),
            records: meter
                .u64_counter("chainsig.registry.records")
                .with_description("Signature records published to the registry")
                .build(),
        }
    }

    pub fn record_outcome(&self, kind: SignatureKind, outcome: &DecodeOutcome) {
        let attrs = [
            KeyValue::new("kind", kind.as_str()),
            KeyValue::new("outcome", outcome.kind_str()),
        ];
        self.outcomes.add(1, &attrs);
        self.candidates.record(
            outcome.candidates().len() as u64,
            &[KeyValue::new("kind", kind.as_str())],
        );
    }

    pub fn record_batch(&self, kind: SignatureKind, outcomes: &[DecodeOutcome]) {
        self.batch_size
            .record(outcomes.len() as u64, &[KeyValue::new("kind", kind.as_str())]);
        for outcome in outcomes {
            self.record_outcome(kind, outcome);
        }
    }

    pub fn record_publish(&self, records: usize) {
        self.records.add(records as u64, &[]);
    }
}
