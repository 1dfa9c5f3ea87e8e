//! # Canonical Serialization — Sorted-Key Byte Production
//!
//! Defines `CanonicalBytes`, the sole construction path for bytes used in
//! digest computation over structured data (fallback proof synthesis,
//! transaction-record digests).
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()`, which rejects floats and
//! then serializes via JCS (RFC 8785: sorted keys, compact separators,
//! deterministic byte sequence).
//!
//! This makes the "wrong serialization path" defect class structurally
//! impossible: any function requiring canonical bytes must accept
//! `&CanonicalBytes`, and the only way to produce one is through this
//! pipeline. Two processes that build the same proof inputs therefore
//! synthesize byte-identical fallback proofs.
//!
//! ## Float Rejection
//!
//! Floats have non-deterministic canonical-number edge cases across
//! serializer implementations. All numeric values on the digest path are
//! integers (centipoint scores, micro-unit features) or strings.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization with float rejection.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - All numeric values are integers, never floats.
/// - All object keys are strings, serialized in sorted order with compact
///   separators (RFC 8785).
///
/// These invariants are enforced by the constructor and cannot be violated
/// by downstream code because the inner `Vec<u8>` is private.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// This is the ONLY way to construct `CanonicalBytes`. All structured
    /// digest computation in the stack must flow through this constructor.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains
    /// float numbers. Returns `CanonicalizationError::SerializationFailed`
    /// if JCS serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let checked = reject_floats(value)?;
        let s = serde_jcs::to_string(&checked)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively walk a JSON value and reject any non-integer number.
///
/// Integers (representable as `i64`/`u64`) pass through; `null`, `bool`,
/// and `string` are untouched; objects and arrays are recursed.
fn reject_floats(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut checked = serde_json::Map::new();
            for (k, v) in map {
                checked.insert(k, reject_floats(v)?);
            }
            Ok(Value::Object(checked))
        }
        Value::Array(arr) => {
            let checked: Result<Vec<_>, _> = arr.into_iter().map(reject_floats).collect();
            Ok(Value::Array(checked?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_keys_compact_separators() {
        let data = serde_json::json!({"score": 7525, "address": "addr_test1abc", "nonce": 7});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"address":"addr_test1abc","nonce":7,"score":7525}"#);
    }

    #[test]
    fn nested_objects_sorted() {
        let data = serde_json::json!({
            "public_inputs": {"subject_hash": 42, "expected_score": 7525},
            "circuit": "compute_score"
        });
        let cb = CanonicalBytes::new(&data).unwrap();
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(
            s,
            r#"{"circuit":"compute_score","public_inputs":{"expected_score":7525,"subject_hash":42}}"#
        );
    }

    #[test]
    fn float_rejected() {
        let data = serde_json::json!({"score": 75.25});
        match CanonicalBytes::new(&data) {
            Err(CanonicalizationError::FloatRejected(f)) => assert_eq!(f, 75.25),
            other => panic!("expected FloatRejected, got {other:?}"),
        }
    }

    #[test]
    fn deeply_nested_float_rejected() {
        let data = serde_json::json!({"a": {"b": [{"c": 0.5}]}});
        assert!(CanonicalBytes::new(&data).is_err());
    }

    #[test]
    fn integers_and_negatives_accepted() {
        let data = serde_json::json!({"bias": -12, "weight": 200000});
        let cb = CanonicalBytes::new(&data).expect("integers should be accepted");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"bias":-12,"weight":200000}"#);
    }

    #[test]
    fn null_and_bool_passthrough() {
        let data = serde_json::json!({"proof": null, "valid": true});
        let cb = CanonicalBytes::new(&data).unwrap();
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"proof":null,"valid":true}"#);
    }

    #[test]
    fn empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), 2);
    }

    #[test]
    fn unicode_passthrough() {
        let data = serde_json::json!({"memo": "\u{00e9}chantillon"});
        let cb = CanonicalBytes::new(&data).unwrap();
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert!(s.contains('\u{00e9}'));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating JSON values without floats — the domain of
    /// everything the stack puts on the digest path.
    fn json_value_no_floats() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ]{0,40}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,10}", inner, 0..8).prop_map(|m| {
                    let map: serde_json::Map<String, Value> = m.into_iter().collect();
                    Value::Object(map)
                }),
            ]
        })
    }

    proptest! {
        /// Canonicalization never fails for float-free values.
        #[test]
        fn never_fails_without_floats(value in json_value_no_floats()) {
            prop_assert!(CanonicalBytes::new(&value).is_ok());
        }

        /// Same input always produces the same bytes.
        #[test]
        fn deterministic(value in json_value_no_floats()) {
            let a = CanonicalBytes::new(&value).unwrap();
            let b = CanonicalBytes::new(&value).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        /// Output is valid JSON with lexicographically sorted keys.
        #[test]
        fn keys_sorted(keys in prop::collection::btree_set("[a-z]{1,8}", 2..6)) {
            let map: serde_json::Map<String, Value> = keys
                .iter()
                .enumerate()
                .map(|(i, k)| (k.clone(), serde_json::json!(i)))
                .collect();
            let cb = CanonicalBytes::new(&Value::Object(map)).unwrap();
            let parsed: serde_json::Map<String, Value> =
                serde_json::from_slice(cb.as_bytes()).unwrap();
            let output_keys: Vec<&String> = parsed.keys().collect();
            let mut sorted = output_keys.clone();
            sorted.sort();
            prop_assert_eq!(output_keys, sorted);
        }

        /// Any value containing a non-integer float is rejected.
        #[test]
        fn floats_always_rejected(f in any::<f64>().prop_filter("not integer", |f| {
            f.fract() != 0.0 && f.is_finite()
        })) {
            let result = CanonicalBytes::new(&serde_json::json!({"v": f}));
            prop_assert!(result.is_err());
        }
    }
}
