//! ABI encoder, the inverse of the decoder.
//!
//! Used to build fixtures and by the CLI `encode` command. Values must
//! conform to their declared types; nothing is coerced.

use chainsig_core::{DecodedValue, EncodeError, ParamType, SignatureRecord};

const WORD: usize = 32;

/// ABI-encode `values` as a sequence of `types`.
pub fn encode(types: &[ParamType], values: &[DecodedValue]) -> Result<Vec<u8>, EncodeError> {
    if types.len() != values.len() {
        return Err(EncodeError::LengthMismatch {
            expected: types.len(),
            got: values.len(),
        });
    }
    sequence(|i| &types[i], values)
}

/// Calldata for `record`: selector followed by the encoded arguments.
pub fn encode_call(record: &SignatureRecord, values: &[DecodedValue]) -> Result<Vec<u8>, EncodeError> {
    let mut out = record.selector().as_bytes().to_vec();
    out.extend(encode(&record.types(), values)?);
    Ok(out)
}

fn sequence<'t, F>(type_at: F, values: &[DecodedValue]) -> Result<Vec<u8>, EncodeError>
where
    F: Fn(usize) -> &'t ParamType,
{
    let head_len = (0..values.len())
        .map(|i| type_at(i).head_size())
        .fold(0usize, usize::saturating_add);
    let mut head = Vec::new();
    let mut tail = Vec::new();
    for (i, value) in values.iter().enumerate() {
        let ty = type_at(i);
        let encoded = single(ty, value)?;
        if ty.is_dynamic() {
            head.extend(usize_word(head_len.saturating_add(tail.len())));
            tail.extend(encoded);
        } else {
            head.extend(encoded);
        }
    }
    head.extend(tail);
    Ok(head)
}

fn single(ty: &ParamType, value: &DecodedValue) -> Result<Vec<u8>, EncodeError> {
    let out_of_range = |reason: &str| EncodeError::ValueOutOfRange {
        ty: ty.to_string(),
        reason: reason.to_string(),
    };

    if !ty.has_valid_width() {
        return Err(out_of_range("not a valid ABI type"));
    }

    match (ty, value) {
        (ParamType::Uint(bits), DecodedValue::Uint(v, _)) => {
            if v.bit_len() > *bits {
                return Err(out_of_range("value wider than declared bits"));
            }
            Ok(v.to_be_bytes::<32>().to_vec())
        }
        (ParamType::Int(bits), DecodedValue::Int(v, _)) => {
            let word = v.to_be_bytes::<32>();
            let pad = WORD - bits / 8;
            let fill = if word[pad] & 0x80 != 0 { 0xff } else { 0x00 };
            if word[..pad].iter().any(|b| *b != fill) {
                return Err(out_of_range("value does not fit declared bits"));
            }
            Ok(word.to_vec())
        }
        (ParamType::Bool, DecodedValue::Bool(b)) => Ok(usize_word(usize::from(*b)).to_vec()),
        (ParamType::Address, DecodedValue::Address(a)) => {
            let mut word = vec![0u8; 12];
            word.extend_from_slice(a.as_slice());
            Ok(word)
        }
        (ParamType::FixedBytes(n), DecodedValue::FixedBytes(b)) => {
            if b.len() != *n {
                return Err(out_of_range("byte length differs from declared size"));
            }
            Ok(padded(b))
        }
        (ParamType::Bytes, DecodedValue::Bytes(b)) => Ok(length_prefixed(b)),
        (ParamType::String, DecodedValue::String(s)) => Ok(length_prefixed(s.as_bytes())),
        (ParamType::Array(elem), DecodedValue::Array(items)) => {
            let mut out = usize_word(items.len()).to_vec();
            out.extend(sequence(|_| elem.as_ref(), items)?);
            Ok(out)
        }
        (ParamType::FixedArray(elem, len), DecodedValue::FixedArray(items)) => {
            if items.len() != *len {
                return Err(EncodeError::LengthMismatch {
                    expected: *len,
                    got: items.len(),
                });
            }
            sequence(|_| elem.as_ref(), items)
        }
        (ParamType::Tuple(members), DecodedValue::Tuple(items)) => {
            if items.len() != members.len() {
                return Err(EncodeError::LengthMismatch {
                    expected: members.len(),
                    got: items.len(),
                });
            }
            sequence(|i| &members[i], items)
        }
        _ => Err(EncodeError::TypeMismatch {
            expected: ty.to_string(),
            got: value.kind_str().to_string(),
        }),
    }
}

fn usize_word(n: usize) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&(n as u64).to_be_bytes());
    word
}

fn padded(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out.resize(bytes.len().div_ceil(WORD) * WORD, 0);
    out
}

fn length_prefixed(bytes: &[u8]) -> Vec<u8> {
    let mut out = usize_word(bytes.len()).to_vec();
    out.extend(padded(bytes));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, I256, U256};
    use chainsig_core::SignatureKind;

    #[test]
    fn encodes_transfer_calldata() {
        let rec = SignatureRecord::parse(SignatureKind::Function, "transfer(address,uint256)").unwrap();
        let calldata = encode_call(
            &rec,
            &[
                DecodedValue::Address(Address::with_last_byte(1)),
                DecodedValue::uint256(1000),
            ],
        )
        .unwrap();
        assert_eq!(
            hex::encode(&calldata),
            "a9059cbb\
             0000000000000000000000000000000000000000000000000000000000000001\
             00000000000000000000000000000000000000000000000000000000000003e8"
        );
    }

    #[test]
    fn encodes_dynamic_string() {
        let out = encode(&[ParamType::String], &[DecodedValue::String("hi".into())]).unwrap();
        assert_eq!(out.len(), 96);
        assert_eq!(out[31], 0x20);
        assert_eq!(out[63], 2);
        assert_eq!(&out[64..66], b"hi");
    }

    #[test]
    fn rejects_non_conforming_values() {
        assert!(matches!(
            encode(&[ParamType::Uint(8)], &[DecodedValue::uint256(256)]),
            Err(EncodeError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            encode(&[ParamType::Int(8)], &[DecodedValue::Int(I256::try_from(200i64).unwrap(), 256)]),
            Err(EncodeError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            encode(&[ParamType::Bool], &[DecodedValue::Uint(U256::ZERO, 256)]),
            Err(EncodeError::TypeMismatch { .. })
        ));
        assert_eq!(
            encode(&[ParamType::Bool], &[]),
            Err(EncodeError::LengthMismatch { expected: 1, got: 0 })
        );
    }

    #[test]
    fn rejects_hand_built_widths_outside_the_grammar() {
        let zero = DecodedValue::Int(I256::ZERO, 256);
        assert!(matches!(
            encode(&[ParamType::Int(0)], &[zero]),
            Err(EncodeError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            encode(&[ParamType::Uint(300)], &[DecodedValue::uint256(1)]),
            Err(EncodeError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            encode(&[ParamType::FixedBytes(40)], &[DecodedValue::FixedBytes(vec![0; 40])]),
            Err(EncodeError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn oversized_fixed_array_is_a_length_mismatch() {
        let ty = ParamType::FixedArray(Box::new(ParamType::Uint(256)), usize::MAX);
        let value = DecodedValue::FixedArray(vec![DecodedValue::uint256(1)]);
        assert!(matches!(
            encode(&[ParamType::String, ty], &[DecodedValue::String("a".into()), value]),
            Err(EncodeError::LengthMismatch { got: 1, .. })
        ));
    }
}
