//! # chainsig-abi
//!
//! Structural ABI codec for ChainSig.
//!
//! - [`decode`] / [`decode_with`]: head/tail payload decoding with strict
//!   bounds, offset and padding checks
//! - [`encode`] / [`encode_call`]: the inverse, for fixtures and tooling
//! - [`decode_log`]: event logs split across topics and data

pub mod decoder;
pub mod encoder;
pub mod event;

pub use decoder::{decode, decode_with, DecodeOptions};
pub use encoder::{encode, encode_call};
pub use event::decode_log;
