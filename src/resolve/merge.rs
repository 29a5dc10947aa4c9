//! JSON configuration merging.
//!
//! The merge is key-wise for objects (overlay wins per key, recursing into
//! nested objects), wholesale for arrays and scalars, and `null` in the
//! overlay removes the key. This is the single merge primitive used for
//! scope layering, root defaults, and PATCH requests.

use serde_json::Value;

/// Merge `overlay` onto `base`.
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                if value.is_null() {
                    base.remove(&key);
                    continue;
                }
                let merged = match base.remove(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        // Arrays and scalars are replaced wholesale
        (_, overlay) => overlay,
    }
}
