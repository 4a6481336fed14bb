//! Canonical, sort-keyed JSON used for hashing, signing, and wire transport.
//!
//! `serde_json::Map` is backed by a `BTreeMap` unless the `preserve_order`
//! feature is enabled (it isn't, here), so converting a value through
//! `serde_json::Value` before serializing sorts every object's keys
//! lexicographically at every nesting level. Serializing a struct directly
//! would instead emit its fields in declaration order, which is why every
//! hashable image goes through `to_value` first.

use serde::Serialize;
use shared::BlockchainError;

/// Serializes `value` to sort-keyed, whitespace-free UTF-8 JSON bytes.
///
/// # Errors
/// Returns an error if `value`'s `Serialize` impl fails.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>, BlockchainError> {
    let as_value = serde_json::to_value(value)
        .map_err(|e| BlockchainError::SerializationError(e.to_string()))?;
    serde_json::to_vec(&as_value).map_err(|e| BlockchainError::SerializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    struct Unsorted {
        zebra: u32,
        apple: u32,
        mango: Nested,
    }

    #[derive(Serialize, Deserialize)]
    struct Nested {
        z: u32,
        a: u32,
    }

    #[test]
    fn keys_are_sorted_at_every_nesting_level() {
        let value = Unsorted {
            zebra: 1,
            apple: 2,
            mango: Nested { z: 3, a: 4 },
        };
        let bytes = canonical_json(&value).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, r#"{"apple":2,"mango":{"a":4,"z":3},"zebra":1}"#);
    }

    #[test]
    fn no_insignificant_whitespace() {
        let value = Unsorted {
            zebra: 1,
            apple: 2,
            mango: Nested { z: 3, a: 4 },
        };
        let bytes = canonical_json(&value).unwrap();
        assert!(!bytes.contains(&b' '));
        assert!(!bytes.contains(&b'\n'));
    }

    #[test]
    fn equal_values_serialize_identically() {
        let a = Unsorted {
            zebra: 1,
            apple: 2,
            mango: Nested { z: 3, a: 4 },
        };
        let b = Unsorted {
            zebra: 1,
            apple: 2,
            mango: Nested { z: 3, a: 4 },
        };
        assert_eq!(canonical_json(&a).unwrap(), canonical_json(&b).unwrap());
    }
}
