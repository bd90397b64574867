//! Selector index: selector → every record that hashes to it.
//!
//! Buckets keep catalog insertion order so that colliding candidates are
//! always reported in the same order for the same catalog.

use std::sync::Arc;

use chainsig_core::{Selector, SignatureRecord};
use indexmap::IndexMap;
use tracing::info;

use crate::catalog::Catalog;

/// Read-only lookup table built from a catalog.
#[derive(Debug, Clone, Default)]
pub struct SelectorIndex {
    buckets: IndexMap<Selector, Vec<Arc<SignatureRecord>>>,
    records: usize,
}

impl SelectorIndex {
    /// Index every record in `catalog`, in catalog order.
    pub fn build(catalog: &Catalog) -> Self {
        let index = Self::from_entries(catalog.iter().map(|r| (r.selector(), Arc::clone(r))));
        info!(
            records = index.len(),
            selectors = index.selector_count(),
            collisions = index.collisions().count(),
            "built selector index"
        );
        index
    }

    /// File each record under the given selector, in iteration order, with
    /// no deduplication. Lets tests stage collisions that keccak-256 will not
    /// produce on demand; [`SelectorIndex::build`] is the only constructor
    /// that guarantees every record sits under its own selector.
    #[doc(hidden)]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Selector, Arc<SignatureRecord>)>,
    {
        let mut index = Self::default();
        for (selector, record) in entries {
            index.buckets.entry(selector).or_default().push(record);
            index.records += 1;
        }
        index
    }

    /// Candidates filed under `selector`, or an empty slice.
    pub fn lookup(&self, selector: &Selector) -> &[Arc<SignatureRecord>] {
        self.buckets.get(selector).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn lookup_function(&self, selector: [u8; 4]) -> &[Arc<SignatureRecord>] {
        self.lookup(&Selector::Function(selector))
    }

    pub fn lookup_event(&self, topic0: [u8; 32]) -> &[Arc<SignatureRecord>] {
        self.lookup(&Selector::Event(topic0))
    }

    /// Buckets holding more than one record, in first-insertion order.
    pub fn collisions(&self) -> impl Iterator<Item = (&Selector, &[Arc<SignatureRecord>])> {
        self.iter().filter(|(_, bucket)| bucket.len() > 1)
    }

    /// All buckets in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Selector, &[Arc<SignatureRecord>])> {
        self.buckets.iter().map(|(s, b)| (s, b.as_slice()))
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Number of distinct selectors.
    pub fn selector_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainsig_core::SignatureKind;

    #[test]
    fn real_collision_shares_a_bucket() {
        let catalog = Catalog::from_signatures(
            SignatureKind::Function,
            "t",
            ["burn(uint256)", "transfer(address,uint256)", "collate_propagate_storage(bytes16)"],
        )
        .unwrap();
        let index = SelectorIndex::build(&catalog);
        assert_eq!(index.len(), 3);
        assert_eq!(index.selector_count(), 2);

        let bucket = index.lookup_function([0x42, 0x96, 0x6c, 0x68]);
        let sigs: Vec<_> = bucket.iter().map(|r| r.human_signature()).collect();
        assert_eq!(sigs, ["burn(uint256)", "collate_propagate_storage(bytes16)"]);
        assert_eq!(index.collisions().count(), 1);
    }

    #[test]
    fn functions_and_events_never_share_keys() {
        let mut catalog = Catalog::new();
        catalog.ingest(SignatureKind::Function, "t", ["Transfer(address,address,uint256)"]);
        catalog.ingest(SignatureKind::Event, "t", ["Transfer(address,address,uint256)"]);
        let index = SelectorIndex::build(&catalog);
        assert_eq!(index.selector_count(), 2);
        assert_eq!(index.collisions().count(), 0);
        assert!(index.lookup_function([0xdd, 0xf2, 0x52, 0xad]).len() == 1);
    }

    #[test]
    fn staged_entries_share_a_bucket() {
        let foo = Arc::new(SignatureRecord::parse(SignatureKind::Function, "foo(uint256)").unwrap());
        let bar = Arc::new(SignatureRecord::parse(SignatureKind::Function, "bar(uint256)").unwrap());
        let index = SelectorIndex::from_entries([
            (foo.selector(), Arc::clone(&foo)),
            (foo.selector(), Arc::clone(&bar)),
        ]);
        assert_eq!(index.selector_count(), 1);
        let names: Vec<_> = index.lookup(&foo.selector()).iter().map(|r| r.name()).collect();
        assert_eq!(names, ["foo", "bar"]);
        // the record itself still reports its own selector
        assert_ne!(bar.selector(), foo.selector());
    }

    #[test]
    fn unknown_selector_is_empty() {
        let index = SelectorIndex::default();
        assert!(index.is_empty());
        assert!(index.lookup_function([0, 0, 0, 0]).is_empty());
    }
}
