//! Resolution engine: selector lookup plus a decode attempt per candidate.
//!
//! Every candidate in a bucket is tried. A selector collision where more than
//! one layout decodes is reported as [`DecodeOutcome::Ambiguous`]; the engine
//! never picks a winner.

use std::fmt;
use std::sync::Arc;

use chainsig_abi::{decode_log, decode_with, DecodeOptions};
use chainsig_core::{DecodeError, DecodedValue, Selector, SignatureKind, SignatureRecord};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use tracing::trace;

use crate::index::SelectorIndex;

// ─── Outcome types ───────────────────────────────────────────────────────────

/// A candidate whose layout decoded the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub record: Arc<SignatureRecord>,
    pub values: Vec<DecodedValue>,
}

/// A candidate that was tried and the reason it was eliminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub record: Arc<SignatureRecord>,
    pub error: DecodeError,
}

/// Result of resolving one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Exactly one candidate decoded.
    Unique(Match),
    /// Two or more candidates decoded, in index order.
    Ambiguous(Vec<Match>),
    /// No candidate is indexed under the selector. `None` when the input was
    /// too short to contain one.
    NoMatch { selector: Option<Selector> },
    /// The selector is known but no candidate's layout fits the payload.
    MatchedButMalformed(Vec<Rejection>),
}

impl DecodeOutcome {
    pub fn is_unique(&self) -> bool {
        matches!(self, DecodeOutcome::Unique(_))
    }

    /// Successful decodes: one for `Unique`, all of them for `Ambiguous`.
    pub fn matches(&self) -> &[Match] {
        match self {
            DecodeOutcome::Unique(m) => std::slice::from_ref(m),
            DecodeOutcome::Ambiguous(ms) => ms,
            _ => &[],
        }
    }

    /// Every record that was tried, successful or not.
    pub fn candidates(&self) -> Vec<&Arc<SignatureRecord>> {
        match self {
            DecodeOutcome::MatchedButMalformed(rs) => rs.iter().map(|r| &r.record).collect(),
            _ => self.matches().iter().map(|m| &m.record).collect(),
        }
    }

    /// The selector the input was filed under, when there was one.
    pub fn selector(&self) -> Option<Selector> {
        match self {
            DecodeOutcome::NoMatch { selector } => *selector,
            _ => self.candidates().first().map(|r| r.selector()),
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            DecodeOutcome::Unique(_) => "unique",
            DecodeOutcome::Ambiguous(_) => "ambiguous",
            DecodeOutcome::NoMatch { .. } => "no_match",
            DecodeOutcome::MatchedButMalformed(_) => "malformed",
        }
    }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Resolves calldata and logs against a [`SelectorIndex`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    pub options: DecodeOptions,
}

impl Resolver {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Split `raw` into selector and payload by the width `kind` implies.
    /// For events `raw` is `topic0 ‖ data`.
    pub fn resolve(&self, index: &SelectorIndex, kind: SignatureKind, raw: &[u8]) -> DecodeOutcome {
        match kind {
            SignatureKind::Function => self.resolve_call(index, raw),
            SignatureKind::Event => match <[u8; 32]>::try_from(raw.get(..32).unwrap_or_default()) {
                Ok(topic0) => self.resolve_log(index, &[topic0], &raw[32..]),
                Err(_) => DecodeOutcome::NoMatch { selector: None },
            },
        }
    }

    /// Resolve transaction calldata (`selector ‖ arguments`).
    pub fn resolve_call(&self, index: &SelectorIndex, calldata: &[u8]) -> DecodeOutcome {
        let Some(selector) = Selector::from_prefix(SignatureKind::Function, calldata) else {
            return DecodeOutcome::NoMatch { selector: None };
        };
        let payload = &calldata[SignatureKind::Function.selector_width()..];
        self.attempt(index, selector, |record| {
            decode_with(&record.types(), payload, self.options)
        })
    }

    /// Resolve an event log given its topics and data.
    pub fn resolve_log(&self, index: &SelectorIndex, topics: &[[u8; 32]], data: &[u8]) -> DecodeOutcome {
        let Some(topic0) = topics.first() else {
            return DecodeOutcome::NoMatch { selector: None };
        };
        self.attempt(index, Selector::Event(*topic0), |record| {
            decode_log(record.params(), topics, data, self.options)
        })
    }

    fn attempt<F>(&self, index: &SelectorIndex, selector: Selector, decode: F) -> DecodeOutcome
    where
        F: Fn(&SignatureRecord) -> Result<Vec<DecodedValue>, DecodeError>,
    {
        let bucket = index.lookup(&selector);
        if bucket.is_empty() {
            return DecodeOutcome::NoMatch {
                selector: Some(selector),
            };
        }

        let mut matched = Vec::new();
        let mut rejected = Vec::new();
        for record in bucket {
            match decode(record) {
                Ok(values) => matched.push(Match {
                    record: Arc::clone(record),
                    values,
                }),
                Err(error) => {
                    trace!(
                        selector = %selector,
                        candidate = %record.human_signature(),
                        error = %error,
                        "candidate rejected"
                    );
                    rejected.push(Rejection {
                        record: Arc::clone(record),
                        error,
                    });
                }
            }
        }

        match matched.len() {
            0 => DecodeOutcome::MatchedButMalformed(rejected),
            1 => DecodeOutcome::Unique(matched.remove(0)),
            _ => DecodeOutcome::Ambiguous(matched),
        }
    }
}

/// Resolve with default decode options.
pub fn resolve(index: &SelectorIndex, kind: SignatureKind, raw: &[u8]) -> DecodeOutcome {
    Resolver::default().resolve(index, kind, raw)
}

pub fn resolve_call(index: &SelectorIndex, calldata: &[u8]) -> DecodeOutcome {
    Resolver::default().resolve_call(index, calldata)
}

pub fn resolve_log(index: &SelectorIndex, topics: &[[u8; 32]], data: &[u8]) -> DecodeOutcome {
    Resolver::default().resolve_log(index, topics, data)
}

// ─── Rendering ───────────────────────────────────────────────────────────────

impl Serialize for Match {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Arg<'a> {
            name: String,
            #[serde(rename = "type")]
            ty: &'a chainsig_core::ParamType,
            #[serde(skip_serializing_if = "std::ops::Not::not")]
            indexed: bool,
            value: &'a DecodedValue,
        }

        let args: Vec<Arg<'_>> = self
            .record
            .params()
            .iter()
            .zip(&self.values)
            .enumerate()
            .map(|(i, (p, v))| Arg {
                name: self.record.param_name(i),
                ty: &p.ty,
                indexed: p.indexed,
                value: v,
            })
            .collect();

        let mut st = serializer.serialize_struct("Match", 5)?;
        st.serialize_field("kind", &self.record.kind())?;
        st.serialize_field("signature", self.record.human_signature())?;
        st.serialize_field("selector", &self.record.selector())?;
        st.serialize_field("source", self.record.source())?;
        st.serialize_field("args", &args)?;
        st.end()
    }
}

impl Serialize for Rejection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Rejection", 4)?;
        st.serialize_field("signature", self.record.human_signature())?;
        st.serialize_field("source", self.record.source())?;
        st.serialize_field("error", &self.error)?;
        st.serialize_field("message", &self.error.to_string())?;
        st.end()
    }
}

impl Serialize for DecodeOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("DecodeOutcome", 3)?;
        st.serialize_field("outcome", self.kind_str())?;
        st.serialize_field("selector", &self.selector())?;
        match self {
            DecodeOutcome::Unique(m) => st.serialize_field("matches", std::slice::from_ref(m))?,
            DecodeOutcome::Ambiguous(ms) => st.serialize_field("matches", ms)?,
            DecodeOutcome::NoMatch { .. } => st.skip_field("matches")?,
            DecodeOutcome::MatchedButMalformed(rs) => st.serialize_field("rejections", rs)?,
        }
        st.end()
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}  {}  [{}]",
            self.record.kind(),
            self.record.display_signature(),
            self.record.selector(),
            self.record.source()
        )?;
        for (i, (param, value)) in self.record.params().iter().zip(&self.values).enumerate() {
            writeln!(f, "  [{i}] {}: {} = {value}", self.record.param_name(i), param.ty)?;
        }
        Ok(())
    }
}

impl fmt::Display for DecodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeOutcome::Unique(m) => write!(f, "{m}"),
            DecodeOutcome::Ambiguous(ms) => {
                writeln!(f, "ambiguous: {} candidates decode", ms.len())?;
                for m in ms {
                    write!(f, "{m}")?;
                }
                Ok(())
            }
            DecodeOutcome::NoMatch { selector: Some(s) } => writeln!(f, "no match for selector {s}"),
            DecodeOutcome::NoMatch { selector: None } => {
                writeln!(f, "no match: input shorter than a selector")
            }
            DecodeOutcome::MatchedButMalformed(rs) => {
                let selector = rs.first().map(|r| r.record.selector().to_hex()).unwrap_or_default();
                writeln!(
                    f,
                    "selector {selector} is known but none of {} candidates decode",
                    rs.len()
                )?;
                for r in rs {
                    writeln!(f, "  {}: {}", r.record.human_signature(), r.error)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn index(sigs: &[&str]) -> SelectorIndex {
        let catalog = Catalog::from_signatures(SignatureKind::Function, "test", sigs).unwrap();
        SelectorIndex::build(&catalog)
    }

    fn calldata(selector: &str, words: &[u64]) -> Vec<u8> {
        let mut out = hex::decode(selector).unwrap();
        for w in words {
            out.extend([0u8; 24]);
            out.extend(w.to_be_bytes());
        }
        out
    }

    #[test]
    fn short_input_has_no_selector() {
        let idx = index(&["transfer(address,uint256)"]);
        assert_eq!(
            resolve_call(&idx, &[0xa9, 0x05]),
            DecodeOutcome::NoMatch { selector: None }
        );
        assert_eq!(
            resolve(&idx, SignatureKind::Event, &[0u8; 31]),
            DecodeOutcome::NoMatch { selector: None }
        );
    }

    #[test]
    fn known_selector_bad_payload_is_malformed() {
        let idx = index(&["transfer(address,uint256)"]);
        let outcome = resolve_call(&idx, &calldata("a9059cbb", &[1]));
        let DecodeOutcome::MatchedButMalformed(rejections) = &outcome else {
            panic!("expected malformed, got {outcome:?}");
        };
        assert_eq!(rejections.len(), 1);
        assert!(matches!(rejections[0].error, DecodeError::TruncatedPayload { .. }));
        assert_eq!(outcome.kind_str(), "malformed");
        assert_eq!(outcome.selector().unwrap().to_hex(), "0xa9059cbb");
    }

    #[test]
    fn collision_filters_by_layout() {
        let idx = index(&["burn(uint256)", "collate_propagate_storage(bytes16)"]);
        // a small integer is not valid bytes16 padding, so only burn decodes
        let outcome = resolve_call(&idx, &calldata("42966c68", &[1000]));
        assert!(outcome.is_unique());
        assert_eq!(outcome.matches()[0].record.name(), "burn");
        assert_eq!(outcome.candidates().len(), 1);
    }

    #[test]
    fn outcome_json_shape() {
        let idx = index(&["approve(address spender,uint256 amount)"]);
        let outcome = resolve_call(&idx, &calldata("095ea7b3", &[2, 5]));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "unique");
        assert_eq!(json["selector"], "0x095ea7b3");
        assert_eq!(json["matches"][0]["args"][0]["name"], "spender");
        assert_eq!(json["matches"][0]["args"][1]["value"]["value"], "5");
    }

    #[test]
    fn display_lists_arguments() {
        let idx = index(&["approve(address spender,uint256 amount)"]);
        let text = resolve_call(&idx, &calldata("095ea7b3", &[2, 5])).to_string();
        assert!(text.starts_with("function approve(address spender, uint256 amount)"));
        assert!(text.contains("[1] amount: uint256 = 5"));
    }
}
