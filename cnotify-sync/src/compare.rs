//! Structural fingerprint comparison.
//!
//! Deep equality over JSON value trees is the sole drift signal: the
//! controller compares the freshly generated fingerprint against the
//! persisted record through this module, never through pointer identity or
//! derived `PartialEq`.

use crate::fingerprint::AudienceFingerprint;
use serde_json::Value;

/// Structural deep equality between two JSON values.
///
/// Objects are equal iff their key sets match (order-independent) and every
/// value is pairwise equal under the same rule; arrays compare elementwise;
/// primitives compare by value. `Null` never equals a composite.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, va)| y.get(key).is_some_and(|vb| deep_equal(va, vb)))
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(va, vb)| deep_equal(va, vb))
        }
        _ => a == b,
    }
}

/// Structural equality between two fingerprints.
pub fn fingerprints_equal(a: &AudienceFingerprint, b: &AudienceFingerprint) -> bool {
    match (serde_json::to_value(a), serde_json::to_value(b)) {
        (Ok(va), Ok(vb)) => deep_equal(&va, &vb),
        _ => false,
    }
}
