//! Head/tail ABI payload decoder.
//!
//! Decodes a byte payload against a parameter layout. Every structural rule
//! is checked and any violation fails closed: a payload either decodes
//! cleanly against a layout or is rejected with a [`DecodeError`] explaining
//! why. The resolver relies on this to tell colliding candidates apart.
//!
//! Offsets are relative to the start of the enclosing encoding, must land
//! in that encoding's tail region, and must not go backwards.

use alloy_primitives::{Address, I256, U256};
use chainsig_core::{signature::MAX_TYPE_DEPTH, DecodeError, DecodedValue, ParamType};

const WORD: usize = 32;

/// Knobs for a single decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Accept bytes past the last word the layout accounts for.
    pub allow_trailing_bytes: bool,
    /// Maximum composite nesting the decoder will descend into.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            allow_trailing_bytes: false,
            max_depth: MAX_TYPE_DEPTH,
        }
    }
}

/// Decode `data` as the ABI encoding of `types` using default options.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<DecodedValue>, DecodeError> {
    decode_with(types, data, DecodeOptions::default())
}

/// Decode `data` as the ABI encoding of `types`.
pub fn decode_with(
    types: &[ParamType],
    data: &[u8],
    options: DecodeOptions,
) -> Result<Vec<DecodedValue>, DecodeError> {
    let mut decoder = Decoder::new(data, options);
    let values = decoder.sequence(0, types.len(), |i| &types[i], 0)?;
    decoder.finish()?;
    Ok(values)
}

/// Same as [`decode_with`] over borrowed types. Used for the `data` part of
/// event logs, where the non-indexed parameters are a subset of the record.
pub(crate) fn decode_refs(
    types: &[&ParamType],
    data: &[u8],
    options: DecodeOptions,
) -> Result<Vec<DecodedValue>, DecodeError> {
    let mut decoder = Decoder::new(data, options);
    let values = decoder.sequence(0, types.len(), |i| types[i], 0)?;
    decoder.finish()?;
    Ok(values)
}

/// Decode a single value type from a 32-byte word (an event topic).
pub(crate) fn decode_word(ty: &ParamType, word: &[u8; 32]) -> Result<DecodedValue, DecodeError> {
    primitive(ty, word)
}

// ─── Decoder state ───────────────────────────────────────────────────────────

struct Decoder<'a> {
    data: &'a [u8],
    options: DecodeOptions,
    /// End of the furthest word any part of the layout has touched.
    high_water: usize,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            data,
            options,
            high_water: 0,
        }
    }

    fn finish(&self) -> Result<(), DecodeError> {
        if !self.options.allow_trailing_bytes && self.data.len() > self.high_water {
            return Err(DecodeError::MalformedEncoding {
                reason: format!(
                    "{} trailing bytes after offset {}",
                    self.data.len() - self.high_water,
                    self.high_water
                ),
            });
        }
        Ok(())
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::TruncatedPayload {
            needed,
            available: self.data.len(),
        }
    }

    fn enter(&self, depth: usize) -> Result<(), DecodeError> {
        if depth >= self.options.max_depth {
            return Err(DecodeError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }

    /// The 32-byte word at `pos`.
    fn word(&mut self, pos: usize) -> Result<&'a [u8; 32], DecodeError> {
        let data = self.data;
        let end = pos.checked_add(WORD).ok_or_else(|| self.truncated(usize::MAX))?;
        let slice = data.get(pos..end).ok_or_else(|| self.truncated(end))?;
        self.high_water = self.high_water.max(end);
        <&[u8; 32]>::try_from(slice).map_err(|_| self.truncated(end))
    }

    /// A head slot holding an offset. Offsets that cannot fit a `u64` can
    /// never point inside the payload.
    fn offset(&mut self, pos: usize) -> Result<usize, DecodeError> {
        let word = self.word(pos)?;
        word_to_usize(word).ok_or_else(|| DecodeError::MalformedEncoding {
            reason: format!("offset at {pos} exceeds payload"),
        })
    }

    /// A length prefix. An unrepresentable length is reported as truncation.
    fn length(&mut self, pos: usize) -> Result<usize, DecodeError> {
        let word = self.word(pos)?;
        Ok(word_to_usize(word).unwrap_or(usize::MAX))
    }

    /// Decode `count` consecutive members laid out head/tail from `base`.
    fn sequence<'t, F>(
        &mut self,
        base: usize,
        count: usize,
        type_at: F,
        depth: usize,
    ) -> Result<Vec<DecodedValue>, DecodeError>
    where
        F: Fn(usize) -> &'t ParamType,
    {
        let head_len = (0..count)
            .try_fold(0usize, |acc, i| acc.checked_add(type_at(i).head_size()))
            .ok_or_else(|| self.truncated(usize::MAX))?;
        let head_end = base
            .checked_add(head_len)
            .ok_or_else(|| self.truncated(usize::MAX))?;
        if head_end > self.data.len() {
            return Err(self.truncated(head_end));
        }

        let mut values = Vec::with_capacity(count);
        let mut cursor = base;
        let mut tail_floor = head_end;
        for i in 0..count {
            let ty = type_at(i);
            if ty.is_dynamic() {
                let rel = self.offset(cursor)?;
                let target = base.checked_add(rel).filter(|t| *t <= self.data.len());
                let target = match target {
                    Some(t) if t >= head_end => t,
                    _ => {
                        return Err(DecodeError::MalformedEncoding {
                            reason: format!("offset {rel} at {cursor} points outside the tail"),
                        })
                    }
                };
                if target < tail_floor {
                    return Err(DecodeError::MalformedEncoding {
                        reason: format!("offset {rel} at {cursor} goes backwards"),
                    });
                }
                tail_floor = target;
                values.push(self.tail(ty, target, depth)?);
            } else {
                values.push(self.inline(ty, cursor, depth)?);
            }
            cursor += ty.head_size();
        }
        Ok(values)
    }

    /// A static value stored in place at `pos`.
    fn inline(&mut self, ty: &ParamType, pos: usize, depth: usize) -> Result<DecodedValue, DecodeError> {
        match ty {
            ParamType::FixedArray(elem, len) => {
                self.enter(depth)?;
                self.check_count(*len, elem, pos)?;
                self.sequence(pos, *len, |_| elem.as_ref(), depth + 1)
                    .map(DecodedValue::FixedArray)
            }
            ParamType::Tuple(members) => {
                self.enter(depth)?;
                self.sequence(pos, members.len(), |i| &members[i], depth + 1)
                    .map(DecodedValue::Tuple)
            }
            _ => {
                let word = self.word(pos)?;
                primitive(ty, word)
            }
        }
    }

    /// A dynamic value whose encoding starts at `pos`.
    fn tail(&mut self, ty: &ParamType, pos: usize, depth: usize) -> Result<DecodedValue, DecodeError> {
        match ty {
            ParamType::Bytes => self.byte_string(pos).map(DecodedValue::Bytes),
            ParamType::String => {
                let raw = self.byte_string(pos)?;
                String::from_utf8(raw)
                    .map(DecodedValue::String)
                    .map_err(|e| DecodeError::MalformedEncoding {
                        reason: format!("string at {pos} is not valid UTF-8: {e}"),
                    })
            }
            ParamType::Array(elem) => {
                self.enter(depth)?;
                let len = self.length(pos)?;
                let start = pos + WORD;
                self.check_count(len, elem, start)?;
                self.sequence(start, len, |_| elem.as_ref(), depth + 1)
                    .map(DecodedValue::Array)
            }
            ParamType::FixedArray(elem, len) => {
                self.enter(depth)?;
                self.check_count(*len, elem, pos)?;
                self.sequence(pos, *len, |_| elem.as_ref(), depth + 1)
                    .map(DecodedValue::FixedArray)
            }
            ParamType::Tuple(members) => {
                self.enter(depth)?;
                self.sequence(pos, members.len(), |i| &members[i], depth + 1)
                    .map(DecodedValue::Tuple)
            }
            // static types never sit behind an offset
            _ => self.inline(ty, pos, depth),
        }
    }

    fn byte_string(&mut self, pos: usize) -> Result<Vec<u8>, DecodeError> {
        let len = self.length(pos)?;
        let start = pos + WORD;
        let end = start.checked_add(len).ok_or_else(|| self.truncated(usize::MAX))?;
        let bytes = self.data.get(start..end).ok_or_else(|| self.truncated(end))?;
        let padded = start.saturating_add(len.div_ceil(WORD) * WORD);
        self.high_water = self.high_water.max(padded.min(self.data.len()).max(end));
        Ok(bytes.to_vec())
    }

    /// Reject element counts that cannot fit in what is left of the payload
    /// before anything is allocated for them.
    fn check_count(&self, count: usize, elem: &ParamType, start: usize) -> Result<(), DecodeError> {
        let needed = count.saturating_mul(elem.min_slot_size().max(1));
        let remaining = self.data.len().saturating_sub(start);
        if needed > remaining {
            return Err(self.truncated(start.saturating_add(needed)));
        }
        Ok(())
    }
}

// ─── Word interpretation ─────────────────────────────────────────────────────

fn word_to_usize(word: &[u8; 32]) -> Option<usize> {
    if word[..24].iter().any(|b| *b != 0) {
        return None;
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(low)).ok()
}

fn out_of_range(ty: &ParamType, reason: impl Into<String>) -> DecodeError {
    DecodeError::OutOfRangeValue {
        ty: ty.to_string(),
        reason: reason.into(),
    }
}

fn primitive(ty: &ParamType, word: &[u8; 32]) -> Result<DecodedValue, DecodeError> {
    if !ty.has_valid_width() {
        return Err(DecodeError::MalformedEncoding {
            reason: format!("{ty} is not a valid ABI type"),
        });
    }
    match ty {
        ParamType::Uint(bits) => {
            let pad = WORD - bits / 8;
            if word[..pad].iter().any(|b| *b != 0) {
                return Err(out_of_range(ty, "bits set above declared width"));
            }
            Ok(DecodedValue::Uint(U256::from_be_slice(word), *bits))
        }
        ParamType::Int(bits) => {
            let pad = WORD - bits / 8;
            let fill = if word[pad] & 0x80 != 0 { 0xff } else { 0x00 };
            if word[..pad].iter().any(|b| *b != fill) {
                return Err(out_of_range(ty, "high bits are not a sign extension"));
            }
            Ok(DecodedValue::Int(I256::from_raw(U256::from_be_slice(word)), *bits))
        }
        ParamType::Bool => match (word[..31].iter().all(|b| *b == 0), word[31]) {
            (true, 0) => Ok(DecodedValue::Bool(false)),
            (true, 1) => Ok(DecodedValue::Bool(true)),
            _ => Err(out_of_range(ty, "bool word is neither 0 nor 1")),
        },
        ParamType::Address => {
            if word[..12].iter().any(|b| *b != 0) {
                return Err(out_of_range(ty, "upper 12 bytes are not zero"));
            }
            Ok(DecodedValue::Address(Address::from_slice(&word[12..])))
        }
        ParamType::FixedBytes(n) => {
            if word[*n..].iter().any(|b| *b != 0) {
                return Err(out_of_range(ty, "non-zero right padding"));
            }
            Ok(DecodedValue::FixedBytes(word[..*n].to_vec()))
        }
        other => Err(DecodeError::MalformedEncoding {
            reason: format!("{other} is not a single-word type"),
        }),
    }
}
