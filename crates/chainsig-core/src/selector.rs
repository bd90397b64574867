//! Selector computation.
//!
//! A selector is the keccak-256 hash of a canonical signature string,
//! truncated to 4 bytes for functions and kept whole (32 bytes) for events:
//!   keccak256("transfer(address,uint256)")[..4] → 0xa9059cbb
//!   keccak256("Transfer(address,address,uint256)") → 0xddf252ad…b3ef

use serde::{Serialize, Serializer};
use std::fmt;
use tiny_keccak::{Hasher, Keccak};

use crate::types::SignatureKind;

/// keccak-256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// The index key a signature is filed under.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selector {
    Function([u8; 4]),
    Event([u8; 32]),
}

impl Selector {
    /// Hash a canonical signature string into a selector of the given kind.
    pub fn compute(kind: SignatureKind, canonical: &str) -> Self {
        let hash = keccak256(canonical.as_bytes());
        match kind {
            SignatureKind::Function => Selector::Function([hash[0], hash[1], hash[2], hash[3]]),
            SignatureKind::Event => Selector::Event(hash),
        }
    }

    /// Build a selector from the leading bytes of `raw`.
    /// Returns `None` if `raw` is shorter than the selector width.
    pub fn from_prefix(kind: SignatureKind, raw: &[u8]) -> Option<Self> {
        match kind {
            SignatureKind::Function => <[u8; 4]>::try_from(raw.get(..4)?).ok().map(Selector::Function),
            SignatureKind::Event => <[u8; 32]>::try_from(raw.get(..32)?).ok().map(Selector::Event),
        }
    }

    /// Parse a `0x`-prefixed (or bare) hex selector. The length picks the kind:
    /// 8 hex digits for a function, 64 for an event.
    pub fn from_hex(s: &str) -> Option<Self> {
        let stripped = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(stripped).ok()?;
        match bytes.len() {
            4 => Self::from_prefix(SignatureKind::Function, &bytes),
            32 => Self::from_prefix(SignatureKind::Event, &bytes),
            _ => None,
        }
    }

    pub fn kind(&self) -> SignatureKind {
        match self {
            Selector::Function(_) => SignatureKind::Function,
            Selector::Event(_) => SignatureKind::Event,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Selector::Function(b) => b,
            Selector::Event(b) => b,
        }
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.as_bytes()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.to_hex())
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc20_transfer_selector() {
        let sel = Selector::compute(SignatureKind::Function, "transfer(address,uint256)");
        assert_eq!(sel.to_hex(), "0xa9059cbb");
        assert_eq!(sel.kind(), SignatureKind::Function);
    }

    #[test]
    fn erc20_transfer_event_topic() {
        let sel = Selector::compute(SignatureKind::Event, "Transfer(address,address,uint256)");
        assert_eq!(
            sel.to_hex(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn from_hex_picks_kind_by_length() {
        assert_eq!(
            Selector::from_hex("0xa9059cbb"),
            Some(Selector::Function([0xa9, 0x05, 0x9c, 0xbb]))
        );
        let topic = Selector::from_hex(
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
        )
        .unwrap();
        assert_eq!(topic.kind(), SignatureKind::Event);
        assert!(Selector::from_hex("0xa9059c").is_none());
        assert!(Selector::from_hex("zz").is_none());
    }

    #[test]
    fn from_prefix_requires_full_width() {
        assert!(Selector::from_prefix(SignatureKind::Function, &[1, 2, 3]).is_none());
        assert_eq!(
            Selector::from_prefix(SignatureKind::Function, &[1, 2, 3, 4, 5]),
            Some(Selector::Function([1, 2, 3, 4]))
        );
        assert!(Selector::from_prefix(SignatureKind::Event, &[0u8; 31]).is_none());
    }
}
