//! Published signature registry.
//!
//! The registry holds the current [`Snapshot`] behind an `RwLock<Arc<_>>`.
//! Readers clone the `Arc` and resolve against it without further locking;
//! publishing a new catalog builds its index first and then swaps the
//! reference. Resolves already running keep the snapshot they started with.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chainsig_abi::DecodeOptions;
use chainsig_core::SignatureKind;
use rayon::prelude::*;
use tracing::info;

use crate::catalog::{Catalog, IngestReport};
use crate::index::SelectorIndex;
use crate::resolver::{DecodeOutcome, Resolver};

/// An immutable catalog and the index built from it.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub catalog: Catalog,
    pub index: SelectorIndex,
    /// Incremented on every publish. The initial snapshot is generation 0.
    pub generation: u64,
}

impl Snapshot {
    fn new(catalog: Catalog, generation: u64) -> Self {
        let index = SelectorIndex::build(&catalog);
        Self {
            catalog,
            index,
            generation,
        }
    }
}

/// Thread-safe handle to the current snapshot.
#[derive(Debug)]
pub struct SignatureRegistry {
    current: RwLock<Arc<Snapshot>>,
    /// Serialises publishers so `extend` never loses a concurrent update.
    writer: Mutex<()>,
    resolver: Resolver,
}

impl SignatureRegistry {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_options(catalog, DecodeOptions::default())
    }

    pub fn with_options(catalog: Catalog, options: DecodeOptions) -> Self {
        let snapshot = Snapshot::new(catalog, 0);
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(()),
            resolver: Resolver::new(options),
        }
    }

    pub fn options(&self) -> DecodeOptions {
        self.resolver.options
    }

    /// The snapshot current at the time of the call.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }

    /// Replace the catalog. Returns the new generation number.
    pub fn publish(&self, catalog: Catalog) -> u64 {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.swap(catalog)
    }

    /// Ingest more signatures on top of the current catalog and publish the
    /// result.
    pub fn extend<I, S>(&self, kind: SignatureKind, source: &str, raw: I) -> IngestReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut catalog = self.snapshot().catalog.clone();
        let report = catalog.ingest(kind, source, raw);
        if report.accepted > 0 {
            self.swap(catalog);
        }
        report
    }

    /// Caller holds `writer`.
    fn swap(&self, catalog: Catalog) -> u64 {
        let generation = self.generation() + 1;
        let next = Arc::new(Snapshot::new(catalog, generation));
        info!(
            generation,
            records = next.catalog.len(),
            selectors = next.index.selector_count(),
            "published signature snapshot"
        );
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
        generation
    }

    pub fn resolve(&self, kind: SignatureKind, raw: &[u8]) -> DecodeOutcome {
        self.resolver.resolve(&self.snapshot().index, kind, raw)
    }

    pub fn resolve_call(&self, calldata: &[u8]) -> DecodeOutcome {
        self.resolver.resolve_call(&self.snapshot().index, calldata)
    }

    pub fn resolve_log(&self, topics: &[[u8; 32]], data: &[u8]) -> DecodeOutcome {
        self.resolver.resolve_log(&self.snapshot().index, topics, data)
    }

    /// Resolve many inputs in parallel against a single snapshot.
    /// Outcomes are returned in input order.
    pub fn resolve_batch<T>(&self, kind: SignatureKind, inputs: &[T]) -> Vec<DecodeOutcome>
    where
        T: AsRef<[u8]> + Sync,
    {
        let snapshot = self.snapshot();
        let resolver = self.resolver;
        inputs
            .par_iter()
            .map(|raw| resolver.resolve(&snapshot.index, kind, raw.as_ref()))
            .collect()
    }
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        Self::new(Catalog::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn registry_is_shareable() {
        assert_send_sync::<SignatureRegistry>();
        assert_send_sync::<Snapshot>();
    }

    #[test]
    fn extend_publishes_only_when_something_was_added() {
        let registry = SignatureRegistry::default();
        assert_eq!(registry.generation(), 0);
        let report = registry.extend(SignatureKind::Function, "a", ["f()"]);
        assert_eq!(report.accepted, 1);
        assert_eq!(registry.generation(), 1);
        let report = registry.extend(SignatureKind::Function, "b", ["f( )"]);
        assert_eq!(report.duplicates, 1);
        assert_eq!(registry.generation(), 1);
        assert_eq!(registry.snapshot().catalog.get(SignatureKind::Function, "f()").unwrap().source(), "a");
    }

    #[test]
    fn batch_preserves_order() {
        let registry = SignatureRegistry::default();
        registry.extend(SignatureKind::Function, "t", ["f()", "g()"]);
        let f = chainsig_core::Selector::compute(SignatureKind::Function, "f()");
        let g = chainsig_core::Selector::compute(SignatureKind::Function, "g()");
        let inputs = vec![g.as_bytes().to_vec(), vec![0u8; 2], f.as_bytes().to_vec()];
        let outcomes = registry.resolve_batch(SignatureKind::Function, &inputs);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].matches()[0].record.name(), "g");
        assert_eq!(outcomes[1], DecodeOutcome::NoMatch { selector: None });
        assert_eq!(outcomes[2].matches()[0].record.name(), "f");
    }
}
