//! JSON and MessagePack payload encoding.
//!
//! Errors carry the object key so they read the same as transfer errors.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// Encode a value as JSON bytes.
pub fn to_json<T: Serialize + ?Sized>(value: &T, key: &str) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec(value).map_err(|e| serialization_error(key, e))
}

/// Decode JSON bytes into a value.
pub fn from_json<T: DeserializeOwned>(bytes: &[u8], key: &str) -> Result<T, StorageError> {
    serde_json::from_slice(bytes).map_err(|e| serialization_error(key, e))
}

/// Encode a value as MessagePack bytes.
///
/// Structs are written as maps keyed by field name so payloads stay
/// readable by other MessagePack implementations.
pub fn to_msgpack<T: Serialize + ?Sized>(value: &T, key: &str) -> Result<Vec<u8>, StorageError> {
    rmp_serde::to_vec_named(value).map_err(|e| serialization_error(key, e))
}

/// Decode MessagePack bytes into a value.
pub fn from_msgpack<T: DeserializeOwned>(bytes: &[u8], key: &str) -> Result<T, StorageError> {
    rmp_serde::from_slice(bytes).map_err(|e| serialization_error(key, e))
}

fn serialization_error(key: &str, err: impl std::fmt::Display) -> StorageError {
    StorageError::Serialization {
        key: key.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Spec {
        name: String,
        replicas: u32,
    }

    #[test]
    fn test_json_encoding() {
        let spec = Spec {
            name: "api".to_string(),
            replicas: 2,
        };
        let bytes: Vec<u8> = to_json(&spec, "spec.json").unwrap();
        assert_eq!(bytes, br#"{"name":"api","replicas":2}"#);
    }

    #[test]
    fn test_json_decode_error_carries_key() {
        let err = from_json::<Spec>(b"{not json", "spec.json").unwrap_err();
        assert!(matches!(err, StorageError::Serialization { ref key, .. } if key == "spec.json"));
    }

    #[test]
    fn test_msgpack_uses_field_names() {
        let spec = Spec {
            name: "api".to_string(),
            replicas: 2,
        };
        let bytes: Vec<u8> = to_msgpack(&spec, "spec.msgpack").unwrap();

        // Named encoding decodes as a plain map.
        let map: BTreeMap<String, serde_json::Value> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(map["name"], "api");
        assert_eq!(map["replicas"], 2);

        let decoded: Spec = from_msgpack(&bytes, "spec.msgpack").unwrap();
        assert_eq!(decoded, spec);
    }

    #[test]
    fn test_msgpack_decode_error_carries_key() {
        let err = from_msgpack::<Spec>(&[0xc1], "bad.msgpack").unwrap_err();
        assert!(matches!(err, StorageError::Serialization { ref key, .. } if key == "bad.msgpack"));
    }
}
