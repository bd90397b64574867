//! Event log decoding.
//!
//! Indexed parameters travel in `topics[1..]`, the rest are ABI-encoded in
//! `data`. Value types (integers, bool, address, bytesN) are stored in their
//! topic word directly. Everything else (strings, bytes, arrays, tuples) is
//! stored as the keccak-256 hash of its encoding and cannot be recovered, so
//! it surfaces as the raw 32-byte hash.

use chainsig_core::{DecodeError, DecodedValue, Param, ParamType};

use crate::decoder::{decode_refs, decode_word, DecodeOptions};

/// Decode an event log against `params`.
///
/// `topics[0]` is the event selector; the caller has already matched it.
/// Values come back in declaration order, indexed and non-indexed interleaved
/// as declared.
pub fn decode_log(
    params: &[Param],
    topics: &[[u8; 32]],
    data: &[u8],
    options: DecodeOptions,
) -> Result<Vec<DecodedValue>, DecodeError> {
    let indexed = params.iter().filter(|p| p.indexed).count();
    let expected = indexed + 1;
    if topics.len() != expected {
        return Err(DecodeError::TopicCount {
            expected,
            got: topics.len(),
        });
    }

    let body: Vec<&ParamType> = params
        .iter()
        .filter(|p| !p.indexed)
        .map(|p| &p.ty)
        .collect();
    let mut body_values = decode_refs(&body, data, options)?.into_iter();
    let mut topic_words = topics[1..].iter();

    let mut values = Vec::with_capacity(params.len());
    for param in params {
        let value = if param.indexed {
            match topic_words.next() {
                Some(word) => topic_value(&param.ty, word)?,
                None => {
                    return Err(DecodeError::TopicCount {
                        expected,
                        got: topics.len(),
                    })
                }
            }
        } else {
            match body_values.next() {
                Some(v) => v,
                None => {
                    return Err(DecodeError::MalformedEncoding {
                        reason: "log data yielded fewer values than parameters".into(),
                    })
                }
            }
        };
        values.push(value);
    }
    Ok(values)
}

fn topic_value(ty: &ParamType, word: &[u8; 32]) -> Result<DecodedValue, DecodeError> {
    match ty {
        ParamType::Uint(_)
        | ParamType::Int(_)
        | ParamType::Bool
        | ParamType::Address
        | ParamType::FixedBytes(_) => decode_word(ty, word),
        _ => Ok(DecodedValue::FixedBytes(word.to_vec())),
    }
}
