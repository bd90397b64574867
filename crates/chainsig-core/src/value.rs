//! Decoded ABI values.
//!
//! `DecodedValue` mirrors [`ParamType`] one-to-one. Integers and addresses
//! use the `alloy-primitives` types so callers can do arithmetic on them
//! without re-parsing.

use alloy_primitives::{Address, I256, U256};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::EncodeError;
use crate::types::ParamType;

/// A value produced by the payload decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    /// Unsigned integer and its declared bit width.
    Uint(U256, usize),
    /// Signed integer and its declared bit width.
    Int(I256, usize),
    Bool(bool),
    Address(Address),
    /// `bytesN`; the vector is exactly N bytes long.
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<DecodedValue>),
    FixedArray(Vec<DecodedValue>),
    Tuple(Vec<DecodedValue>),
}

impl DecodedValue {
    /// Convenience constructor for a `uint256`.
    pub fn uint256(v: u64) -> Self {
        DecodedValue::Uint(U256::from(v), 256)
    }

    pub fn as_u256(&self) -> Option<U256> {
        match self {
            DecodedValue::Uint(v, _) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            DecodedValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DecodedValue::Bytes(b) | DecodedValue::FixedBytes(b) => Some(b),
            _ => None,
        }
    }

    /// Elements of an array, fixed array or tuple.
    pub fn as_slice(&self) -> Option<&[DecodedValue]> {
        match self {
            DecodedValue::Array(v) | DecodedValue::FixedArray(v) | DecodedValue::Tuple(v) => Some(v),
            _ => None,
        }
    }

    /// Short variant label used in JSON output and type-mismatch messages.
    pub fn kind_str(&self) -> &'static str {
        match self {
            DecodedValue::Uint(..) => "uint",
            DecodedValue::Int(..) => "int",
            DecodedValue::Bool(_) => "bool",
            DecodedValue::Address(_) => "address",
            DecodedValue::FixedBytes(_) => "fixed_bytes",
            DecodedValue::Bytes(_) => "bytes",
            DecodedValue::String(_) => "string",
            DecodedValue::Array(_) => "array",
            DecodedValue::FixedArray(_) => "fixed_array",
            DecodedValue::Tuple(_) => "tuple",
        }
    }

    /// Build a value of type `ty` from loosely-typed JSON (CLI arguments,
    /// fixture files).
    ///
    /// Integers may be JSON numbers or decimal / `0x`-hex strings; byte
    /// values and addresses are hex strings; arrays and tuples are JSON arrays.
    pub fn from_json(ty: &ParamType, json: &serde_json::Value) -> Result<Self, EncodeError> {
        use serde_json::Value as J;

        let mismatch = || EncodeError::TypeMismatch {
            expected: ty.to_string(),
            got: json.to_string(),
        };
        let out_of_range = |reason: String| EncodeError::ValueOutOfRange {
            ty: ty.to_string(),
            reason,
        };

        match (ty, json) {
            (ParamType::Bool, J::Bool(b)) => Ok(DecodedValue::Bool(*b)),

            (ParamType::Uint(bits), J::Number(n)) => {
                let v = n.as_u64().ok_or_else(mismatch)?;
                Ok(DecodedValue::Uint(U256::from(v), *bits))
            }
            (ParamType::Uint(bits), J::String(s)) => {
                let parsed = match strip_hex(s) {
                    Some(h) => U256::from_str_radix(h, 16),
                    None => U256::from_str_radix(s, 10),
                };
                let v = parsed.map_err(|e| out_of_range(e.to_string()))?;
                Ok(DecodedValue::Uint(v, *bits))
            }

            (ParamType::Int(bits), J::Number(n)) => {
                let v = n.as_i64().ok_or_else(mismatch)?;
                let v = I256::try_from(v as i128).map_err(|e| out_of_range(e.to_string()))?;
                Ok(DecodedValue::Int(v, *bits))
            }
            (ParamType::Int(bits), J::String(s)) => {
                let v = I256::from_str(s).map_err(|e| out_of_range(e.to_string()))?;
                Ok(DecodedValue::Int(v, *bits))
            }

            (ParamType::Address, J::String(s)) => {
                let a = Address::from_str(s).map_err(|e| out_of_range(e.to_string()))?;
                Ok(DecodedValue::Address(a))
            }

            (ParamType::FixedBytes(n), J::String(s)) => {
                let b = decode_hex(s).ok_or_else(mismatch)?;
                if b.len() != *n {
                    return Err(out_of_range(format!("expected {n} bytes, got {}", b.len())));
                }
                Ok(DecodedValue::FixedBytes(b))
            }
            (ParamType::Bytes, J::String(s)) => {
                Ok(DecodedValue::Bytes(decode_hex(s).ok_or_else(mismatch)?))
            }
            (ParamType::String, J::String(s)) => Ok(DecodedValue::String(s.clone())),

            (ParamType::Array(elem), J::Array(items)) => items
                .iter()
                .map(|item| Self::from_json(elem, item))
                .collect::<Result<Vec<_>, _>>()
                .map(DecodedValue::Array),
            (ParamType::FixedArray(elem, len), J::Array(items)) => {
                if items.len() != *len {
                    return Err(EncodeError::LengthMismatch {
                        expected: *len,
                        got: items.len(),
                    });
                }
                items
                    .iter()
                    .map(|item| Self::from_json(elem, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(DecodedValue::FixedArray)
            }
            (ParamType::Tuple(members), J::Array(items)) => {
                if items.len() != members.len() {
                    return Err(EncodeError::LengthMismatch {
                        expected: members.len(),
                        got: items.len(),
                    });
                }
                members
                    .iter()
                    .zip(items)
                    .map(|(m, item)| Self::from_json(m, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(DecodedValue::Tuple)
            }

            _ => Err(mismatch()),
        }
    }
}

fn strip_hex(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    hex::decode(strip_hex(s).unwrap_or(s)).ok()
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Uint(v, _) => write!(f, "{v}"),
            DecodedValue::Int(v, _) => write!(f, "{v}"),
            DecodedValue::Bool(b) => write!(f, "{b}"),
            DecodedValue::Address(a) => write!(f, "{}", a.to_checksum(None)),
            DecodedValue::FixedBytes(b) | DecodedValue::Bytes(b) => {
                write!(f, "0x{}", hex::encode(b))
            }
            DecodedValue::String(s) => write!(f, "{s:?}"),
            DecodedValue::Array(items) | DecodedValue::FixedArray(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            DecodedValue::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

/// Serialized as `{ "type": <kind>, "value": <value> }`, with `bits` added for
/// integers. Integers are decimal strings so 256-bit values survive JSON.
impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let bits = match self {
            DecodedValue::Uint(_, b) | DecodedValue::Int(_, b) => Some(*b),
            _ => None,
        };
        let mut st = serializer.serialize_struct("DecodedValue", if bits.is_some() { 3 } else { 2 })?;
        st.serialize_field("type", self.kind_str())?;
        if let Some(b) = bits {
            st.serialize_field("bits", &b)?;
        }
        match self {
            DecodedValue::Uint(v, _) => st.serialize_field("value", &v.to_string())?,
            DecodedValue::Int(v, _) => st.serialize_field("value", &v.to_string())?,
            DecodedValue::Bool(b) => st.serialize_field("value", b)?,
            DecodedValue::Address(a) => st.serialize_field("value", &a.to_checksum(None))?,
            DecodedValue::FixedBytes(b) | DecodedValue::Bytes(b) => {
                st.serialize_field("value", &format!("0x{}", hex::encode(b)))?
            }
            DecodedValue::String(s) => st.serialize_field("value", s)?,
            DecodedValue::Array(items)
            | DecodedValue::FixedArray(items)
            | DecodedValue::Tuple(items) => st.serialize_field("value", items)?,
        }
        st.end()
    }
}
