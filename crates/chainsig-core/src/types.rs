//! The ABI parameter grammar.
//!
//! `ParamType` is a closed, recursive set of variants. Anything outside it is
//! rejected when a signature is parsed, so the decoder never sees an unknown
//! type.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Whether a signature describes a function call or an event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureKind {
    Function,
    Event,
}

impl SignatureKind {
    /// Width of the selector in bytes: 4 for functions, 32 for events.
    pub const fn selector_width(self) -> usize {
        match self {
            SignatureKind::Function => 4,
            SignatureKind::Event => 32,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignatureKind::Function => "function",
            SignatureKind::Event => "event",
        }
    }
}

impl fmt::Display for SignatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for SignatureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "function" | "fn" | "call" => Ok(SignatureKind::Function),
            "event" | "log" => Ok(SignatureKind::Event),
            other => Err(format!("unknown signature kind '{other}'")),
        }
    }
}

/// An ABI parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// `uintN`, N in 8..=256 and a multiple of 8.
    Uint(usize),
    /// `intN`, N in 8..=256 and a multiple of 8.
    Int(usize),
    Bool,
    Address,
    /// `bytesN`, N in 1..=32.
    FixedBytes(usize),
    /// Dynamic `bytes`.
    Bytes,
    String,
    /// `T[]`
    Array(Box<ParamType>),
    /// `T[N]`
    FixedArray(Box<ParamType>, usize),
    /// `(T1,T2,...)`
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Returns `true` if values of this type live in the tail region and are
    /// referenced from the head by an offset.
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(elem, _) => elem.is_dynamic(),
            ParamType::Tuple(members) => members.iter().any(ParamType::is_dynamic),
            _ => false,
        }
    }

    /// Number of bytes this type occupies in a head region.
    ///
    /// Dynamic types occupy a single offset slot; static composites are inlined.
    /// Saturates at `usize::MAX` for layouts too large to address.
    pub fn head_size(&self) -> usize {
        self.checked_head_size().unwrap_or(usize::MAX)
    }

    /// Minimum number of bytes any encoding of this type can occupy, counting
    /// its tail. Used to reject impossible length prefixes before allocating.
    /// Saturates at `usize::MAX`.
    pub fn min_encoded_size(&self) -> usize {
        self.checked_min_encoded_size().unwrap_or(usize::MAX)
    }

    /// Minimum bytes one member of a sequence takes: its head slot plus, when
    /// dynamic, the smallest tail it can point to. Saturates at `usize::MAX`.
    pub fn min_slot_size(&self) -> usize {
        self.checked_slot_size().unwrap_or(usize::MAX)
    }

    pub fn checked_head_size(&self) -> Option<usize> {
        if self.is_dynamic() {
            return Some(32);
        }
        match self {
            ParamType::FixedArray(elem, len) => elem.checked_head_size()?.checked_mul(*len),
            ParamType::Tuple(members) => members
                .iter()
                .try_fold(0usize, |acc, m| acc.checked_add(m.checked_head_size()?)),
            _ => Some(32),
        }
    }

    pub fn checked_min_encoded_size(&self) -> Option<usize> {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => Some(32),
            ParamType::FixedArray(elem, len) => elem.checked_slot_size()?.checked_mul(*len),
            ParamType::Tuple(members) => members
                .iter()
                .try_fold(0usize, |acc, m| acc.checked_add(m.checked_slot_size()?)),
            _ => Some(32),
        }
    }

    fn checked_slot_size(&self) -> Option<usize> {
        if self.is_dynamic() {
            self.checked_min_encoded_size()?.checked_add(32)
        } else {
            self.checked_head_size()
        }
    }

    /// `true` if every size this type and its nested element types need can
    /// be computed without overflowing `usize`.
    pub fn layout_fits(&self) -> bool {
        if self.checked_slot_size().is_none() {
            return false;
        }
        match self {
            ParamType::Array(elem) | ParamType::FixedArray(elem, _) => elem.layout_fits(),
            ParamType::Tuple(members) => members.iter().all(ParamType::layout_fits),
            _ => true,
        }
    }

    /// `true` unless this is an elementary type with a width outside the ABI
    /// grammar (`uintN`/`intN` need N in 8..=256 step 8, `bytesN` N in 1..=32).
    /// Composite types are not inspected.
    pub fn has_valid_width(&self) -> bool {
        match self {
            ParamType::Uint(bits) | ParamType::Int(bits) => bits % 8 == 0 && (8..=256).contains(bits),
            ParamType::FixedBytes(n) => (1..=32).contains(n),
            _ => true,
        }
    }

    /// Nesting depth of composite types (primitives are depth 0).
    pub fn depth(&self) -> usize {
        match self {
            ParamType::Array(elem) | ParamType::FixedArray(elem, _) => 1 + elem.depth(),
            ParamType::Tuple(members) => 1 + members.iter().map(ParamType::depth).max().unwrap_or(0),
            _ => 0,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Address => write!(f, "address"),
            ParamType::FixedBytes(n) => write!(f, "bytes{n}"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::String => write!(f, "string"),
            ParamType::Array(elem) => write!(f, "{elem}[]"),
            ParamType::FixedArray(elem, len) => write!(f, "{elem}[{len}]"),
            ParamType::Tuple(members) => {
                f.write_str("(")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{m}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Serialize for ParamType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single parameter of a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Param {
    /// Declared name, if the source text had one. Display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: ParamType,
    /// Event parameters only: value is carried in a topic instead of `data`.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
}

impl Param {
    pub fn new(ty: ParamType) -> Self {
        Self {
            name: None,
            ty,
            indexed: false,
        }
    }

    pub fn named(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: Some(name.into()),
            ty,
            indexed: false,
        }
    }
}
