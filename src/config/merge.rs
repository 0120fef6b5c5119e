//! Configuration merge logic
//!
//! Objects deep-merge by key, arrays and scalars are replaced by the later
//! layer.

use serde_json::Value;

/// Deep merge two JSON values.
///
/// - Objects: deep-merge by key (recursive)
/// - Arrays: REPLACE (overlay wins entirely)
/// - Scalars: override (overlay wins)
/// - Null: override (null can override any value)
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        // No concatenation
        (Value::Array(_), overlay @ Value::Array(_)) => overlay,

        (_, overlay) => overlay,
    }
}

/// Merge layers in order; the last layer has highest precedence
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(json!({"timeout_seconds": 100}), json!({"timeout_seconds": 30}));
        assert_eq!(result["timeout_seconds"], 30);
    }

    #[test]
    fn test_object_deep_merge() {
        let base = json!({
            "api": {
                "server": "https://adwords.google.com",
                "enable_gzip": true
            }
        });
        let overlay = json!({
            "api": {
                "server": "https://adwords-sandbox.google.com"
            }
        });
        let result = deep_merge(base, overlay);

        assert_eq!(result["api"]["server"], "https://adwords-sandbox.google.com");
        assert_eq!(result["api"]["enable_gzip"], true);
    }

    #[test]
    fn test_array_replace() {
        let result = deep_merge(json!({"ids": [1, 2, 3]}), json!({"ids": [9]}));
        assert_eq!(result["ids"], json!([9]));
    }

    #[test]
    fn test_null_override() {
        let result = deep_merge(json!({"client_customer_id": "123-456-7890"}), json!({"client_customer_id": null}));
        assert!(result["client_customer_id"].is_null());
    }

    #[test]
    fn test_merge_layers_precedence() {
        let builtin = json!({
            "api": {"timeout_seconds": 100},
            "jobs": {"poll_interval_ms": 2000, "status_retries": 3}
        });
        let user = json!({"jobs": {"poll_interval_ms": 5000}});
        let project = json!({"jobs": {"status_retries": 5}});
        let cli = json!({"jobs": {"poll_interval_ms": 250}});

        let result = merge_layers(vec![builtin, user, project, cli]);

        assert_eq!(result["api"]["timeout_seconds"], 100);
        assert_eq!(result["jobs"]["poll_interval_ms"], 250);
        assert_eq!(result["jobs"]["status_retries"], 5);
    }
}
