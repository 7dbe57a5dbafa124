//! Content-addressed cache keys for tool results.
//!
//! A key is the SHA-256 of the tool name and the canonical JSON form of the input.
//! Canonicalization sorts object keys recursively, so two inputs that differ only in
//! field order produce the same key.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Deterministic key for a `(tool name, input)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Compute the key for a tool invocation.
    pub fn compute(tool_name: &str, input: &serde_json::Value) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(tool_name.as_bytes());
        // NUL separator keeps ("ab", "c") and ("a", "bc") apart
        hasher.update([0u8]);
        hasher.update(canonicalize(input).as_bytes());
        let digest = hasher.finalize();

        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serialize a JSON value with object keys sorted at every depth.
///
/// Arrays keep their order; only object member order is normalized.
pub fn canonicalize(value: &serde_json::Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        }
        serde_json::Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonicalize_sorts_nested_keys() {
        let value = json!({"b": 1, "a": {"z": true, "y": [3, {"d": null, "c": "x"}]}});
        assert_eq!(
            canonicalize(&value),
            r#"{"a":{"y":[3,{"c":"x","d":null}],"z":true},"b":1}"#
        );
    }

    #[test]
    fn test_reordered_fields_share_a_key() {
        let a = CacheKey::compute("grep_search", &json!({"pattern": "TODO", "path": "/src"}));
        let b = CacheKey::compute("grep_search", &json!({"path": "/src", "pattern": "TODO"}));
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_tool_name_is_part_of_key() {
        let input = json!({"path": "/src"});
        assert_ne!(
            CacheKey::compute("read_file", &input),
            CacheKey::compute("list_dir", &input)
        );
    }

    #[test]
    fn test_array_order_matters() {
        assert_ne!(
            CacheKey::compute("t", &json!([1, 2])),
            CacheKey::compute("t", &json!([2, 1]))
        );
    }

    #[test]
    fn test_separator_prevents_collisions() {
        assert_ne!(
            CacheKey::compute("ab", &json!("c")),
            CacheKey::compute("a", &json!("bc"))
        );
    }
}
