//! Structural hashing of model values.

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

/// Hash raw bytes.
pub fn content_hash(data: &[u8]) -> u64 {
    xxh3_64(data)
}

/// Hash the JSON serialization of a value.
///
/// Values that fail to serialize hash to 0, which never matches a real
/// hash of a populated component and so disables fast paths keyed on it.
pub fn structural_hash<T: Serialize>(value: &T) -> u64 {
    serde_json::to_vec(value).map_or(0, |bytes| content_hash(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash() {
        let hash = content_hash(b"org.example.Color");
        assert_ne!(hash, 0);
        assert_eq!(hash, content_hash(b"org.example.Color"));
        assert_ne!(hash, content_hash(b"org.example.Colour"));
    }

    #[test]
    fn test_structural_hash_follows_content() {
        let a = vec!["RED", "GREEN"];
        let b = vec!["RED", "GREEN"];
        let c = vec!["GREEN", "RED"];
        assert_eq!(structural_hash(&a), structural_hash(&b));
        assert_ne!(structural_hash(&a), structural_hash(&c));
    }
}
