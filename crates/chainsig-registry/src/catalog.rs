//! Signature catalog: normalised, deduplicated signature records.
//!
//! Records are keyed by `(kind, human_signature)`. The first occurrence of a
//! signature wins; later sources can only add signatures that have not been
//! seen yet. Iteration order is insertion order, which is what the selector
//! index uses to order colliding candidates.

use std::sync::Arc;

use chainsig_core::{SignatureError, SignatureKind, SignatureRecord};
use indexmap::{map::Entry, IndexMap};
use tracing::{debug, warn};

type Key = (SignatureKind, String);

/// Outcome of ingesting one batch of raw signature strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Signatures added to the catalog.
    pub accepted: usize,
    /// Signatures that parsed but were already present.
    pub duplicates: usize,
    /// Strings that failed to parse. They do not affect the rest of the batch.
    pub rejected: Vec<SignatureError>,
}

impl IngestReport {
    /// Fold another report into this one.
    pub fn absorb(&mut self, other: IngestReport) {
        self.accepted += other.accepted;
        self.duplicates += other.duplicates;
        self.rejected.extend(other.rejected);
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// An insertion-ordered set of signature records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: IndexMap<Key, Arc<SignatureRecord>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from one source, failing on the first malformed string.
    pub fn from_signatures<I, S>(kind: SignatureKind, source: &str, raw: I) -> Result<Self, SignatureError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::new();
        for text in raw {
            let record = SignatureRecord::parse(kind, text.as_ref())?.with_source(source);
            catalog.insert(record);
        }
        Ok(catalog)
    }

    /// Parse and add raw signature strings from `source`.
    ///
    /// Malformed strings are collected in the report and skipped.
    pub fn ingest<I, S>(&mut self, kind: SignatureKind, source: &str, raw: I) -> IngestReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = IngestReport::default();
        for text in raw {
            match SignatureRecord::parse(kind, text.as_ref()) {
                Ok(record) => {
                    if self.insert(record.with_source(source)) {
                        report.accepted += 1;
                    } else {
                        report.duplicates += 1;
                    }
                }
                Err(e) => {
                    warn!(source, kind = %kind, error = %e, "rejected signature");
                    report.rejected.push(e);
                }
            }
        }
        debug!(
            source,
            kind = %kind,
            accepted = report.accepted,
            duplicates = report.duplicates,
            rejected = report.rejected.len(),
            "ingested signature source"
        );
        report
    }

    /// Add a record. Returns `false` if an identical signature was already present.
    pub fn insert(&mut self, record: SignatureRecord) -> bool {
        self.insert_shared(Arc::new(record))
    }

    fn insert_shared(&mut self, record: Arc<SignatureRecord>) -> bool {
        match self.records.entry((record.kind(), record.human_signature().to_string())) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Add every record of `other` not already present. Returns the number added.
    pub fn merge(&mut self, other: &Catalog) -> usize {
        other
            .records
            .values()
            .filter(|r| self.insert_shared(Arc::clone(r)))
            .count()
    }

    /// Set union, with `self` taking precedence.
    pub fn union(mut self, other: Catalog) -> Catalog {
        self.merge(&other);
        self
    }

    pub fn get(&self, kind: SignatureKind, human_signature: &str) -> Option<&Arc<SignatureRecord>> {
        self.records.get(&(kind, human_signature.to_string()))
    }

    pub fn contains(&self, kind: SignatureKind, human_signature: &str) -> bool {
        self.get(kind, human_signature).is_some()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<SignatureRecord>> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records of one kind.
    pub fn count(&self, kind: SignatureKind) -> usize {
        self.records.keys().filter(|(k, _)| *k == kind).count()
    }
}
