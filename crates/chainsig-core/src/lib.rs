//! # chainsig-core
//!
//! Core types shared by every ChainSig crate:
//! - [`ParamType`]: the closed ABI parameter grammar
//! - [`SignatureRecord`]: a parsed, canonicalised function or event signature
//! - [`Selector`]: the keccak-256 prefix a record is indexed under
//! - [`DecodedValue`]: a typed value produced by the payload decoder
//! - the error taxonomy for ingestion, decoding and encoding

pub mod error;
pub mod selector;
pub mod signature;
pub mod types;
pub mod value;

pub use error::{DecodeError, EncodeError, SignatureError};
pub use selector::{keccak256, Selector};
pub use signature::SignatureRecord;
pub use types::{Param, ParamType, SignatureKind};
pub use value::DecodedValue;
