//! Encoder/decoder agreement on golden vectors and nested layouts.

use alloy_primitives::{Address, I256, U256};
use chainsig_abi::{decode, decode_with, encode, encode_call, DecodeOptions};
use chainsig_core::{DecodeError, DecodedValue, ParamType, SignatureKind, SignatureRecord};
use serde_json::Value;

fn fixtures() -> Vec<Value> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/abi/solidity_docs.json");
    let text = std::fs::read_to_string(path).expect("read fixture");
    serde_json::from_str(&text).expect("parse fixture")
}

fn unhex(s: &str) -> Vec<u8> {
    hex::decode(s.trim_start_matches("0x")).expect("fixture hex")
}

#[test]
fn golden_vectors_encode_and_decode() {
    for case in fixtures() {
        let name = case["name"].as_str().unwrap();
        let record =
            SignatureRecord::parse(SignatureKind::Function, case["signature"].as_str().unwrap())
                .unwrap();
        let types = record.types();
        let args = case["args"].as_array().unwrap();
        let values: Vec<DecodedValue> = types
            .iter()
            .zip(args)
            .map(|(ty, arg)| DecodedValue::from_json(ty, arg).unwrap())
            .collect();

        let expected = unhex(case["calldata"].as_str().unwrap());
        let calldata = encode_call(&record, &values).unwrap();
        assert_eq!(hex::encode(&calldata), hex::encode(&expected), "{name}: encoding");

        let decoded = decode(&types, &expected[4..]).unwrap();
        assert_eq!(decoded, values, "{name}: decoding");
    }
}

#[test]
fn nested_dynamic_layout_round_trips() {
    let record = SignatureRecord::parse(
        SignatureKind::Function,
        "multicall((address target, bytes data)[] calls, string[2] labels, int24 tick)",
    )
    .unwrap();
    let call = |last: u8, data: &[u8]| {
        DecodedValue::Tuple(vec![
            DecodedValue::Address(Address::with_last_byte(last)),
            DecodedValue::Bytes(data.to_vec()),
        ])
    };
    let values = vec![
        DecodedValue::Array(vec![call(1, &[0xde, 0xad, 0xbe, 0xef]), call(2, &[0u8; 40])]),
        DecodedValue::FixedArray(vec![
            DecodedValue::String("first".into()),
            DecodedValue::String(String::new()),
        ]),
        DecodedValue::Int(I256::try_from(-887272i64).unwrap(), 24),
    ];
    let types = record.types();
    let encoded = encode(&types, &values).unwrap();
    assert_eq!(encoded.len() % 32, 0);
    assert_eq!(decode(&types, &encoded).unwrap(), values);
}

#[test]
fn every_truncation_of_a_valid_payload_fails() {
    let types = vec![
        ParamType::Address,
        ParamType::Array(Box::new(ParamType::Uint(256))),
        ParamType::String,
    ];
    let values = vec![
        DecodedValue::Address(Address::with_last_byte(9)),
        DecodedValue::Array(vec![DecodedValue::Uint(U256::from(5u8), 256)]),
        DecodedValue::String("chainsig".into()),
    ];
    let encoded = encode(&types, &values).unwrap();
    for cut in (0..encoded.len()).step_by(32) {
        let err = decode(&types, &encoded[..cut]).unwrap_err();
        assert!(
            matches!(
                err,
                DecodeError::TruncatedPayload { .. } | DecodeError::MalformedEncoding { .. }
            ),
            "cut at {cut}: {err:?}"
        );
    }
}

#[test]
fn trailing_word_only_accepted_when_allowed() {
    let types = vec![ParamType::Bool];
    let mut encoded = encode(&types, &[DecodedValue::Bool(true)]).unwrap();
    encoded.extend([0u8; 32]);
    assert!(matches!(
        decode(&types, &encoded),
        Err(DecodeError::MalformedEncoding { .. })
    ));
    let lenient = DecodeOptions {
        allow_trailing_bytes: true,
        ..DecodeOptions::default()
    };
    assert_eq!(
        decode_with(&types, &encoded, lenient).unwrap(),
        vec![DecodedValue::Bool(true)]
    );
}
