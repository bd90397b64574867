//! # chainsig-registry
//!
//! Signature catalog, selector index and the collision-aware resolver.
//!
//! ```ignore
//! let mut catalog = chainsig_registry::builtin::catalog();
//! catalog.ingest(SignatureKind::Function, "local", ["burn(uint256)"]);
//! let registry = SignatureRegistry::new(catalog);
//! match registry.resolve_call(&calldata) {
//!     DecodeOutcome::Unique(m) => println!("{m}"),
//!     DecodeOutcome::Ambiguous(all) => println!("{} candidates", all.len()),
//!     other => println!("{other}"),
//! }
//! ```

pub mod builtin;
pub mod catalog;
pub mod index;
pub mod registry;
pub mod resolver;
pub mod source;

pub use catalog::{Catalog, IngestReport};
pub use index::SelectorIndex;
pub use registry::{SignatureRegistry, Snapshot};
pub use resolver::{resolve, resolve_call, resolve_log, DecodeOutcome, Match, Rejection, Resolver};
pub use source::SourceError;
