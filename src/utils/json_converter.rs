use serde_json::Value;

/// Render a JSON value as a compact human-readable string for error lists.
pub fn value_to_short_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_short_string)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(obj) => obj
            .iter()
            .map(|(k, v)| format!("{}: {}", k, value_to_short_string(v)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_values_flatten() {
        assert_eq!(value_to_short_string(&json!(null)), "");
        assert_eq!(value_to_short_string(&json!(["a", 2, true])), "a, 2, true");
        assert_eq!(value_to_short_string(&json!({"cpu": [2, 4]})), "cpu: 2, 4");
    }
}
