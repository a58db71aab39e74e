//! Structured values a schema describes, plus record path helpers.

use std::collections::BTreeMap;

use serde::Serialize;

/// A structured value produced or consumed by a codec tree.
///
/// Records are string-keyed maps; dot-segmented keys in a schema denote
/// nesting, so a field keyed `"a.b"` reads from and decodes into
/// `{"a": {"b": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value, produced by pad blocks.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Raw bit payload ('0'/'1' characters) carried by binary blocks.
    Bits(String),
    Array(Vec<Value>),
    Record(BTreeMap<String, Value>),
}

impl Value {
    /// Follows a dot-separated path into nested records. Returns None if any
    /// segment is missing or crosses a non-record value.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        for segment in path.split('.') {
            match current {
                Value::Record(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Converts a JSON value into a [Value]. Integral numbers become
    /// [Value::Int], everything else numeric becomes [Value::Float].
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Record(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

/// Re-nests dot-segmented keys into hierarchical records:
/// `[("a.b", x), ("a.c", y)]` becomes `{"a": {"b": x, "c": y}}`.
/// Same-prefix siblings merge into one nested record.
pub fn nest(flat: Vec<(String, Value)>) -> Value {
    let mut root: BTreeMap<String, Value> = BTreeMap::new();
    for (key, value) in flat {
        insert_path(&mut root, &key, value);
    }
    Value::Record(root)
}

fn insert_path(map: &mut BTreeMap<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Record(BTreeMap::new()));
            if let Value::Record(inner) = entry {
                insert_path(inner, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_flat_and_nested() {
        let value = nest(vec![
            ("a.b".to_string(), Value::Int(1)),
            ("a.c".to_string(), Value::Bool(true)),
            ("d".to_string(), Value::Str("x".to_string())),
        ]);

        assert_eq!(value.lookup("a.b"), Some(&Value::Int(1)));
        assert_eq!(value.lookup("a.c"), Some(&Value::Bool(true)));
        assert_eq!(value.lookup("d"), Some(&Value::Str("x".to_string())));
        assert_eq!(value.lookup("a.missing"), None);
        assert_eq!(value.lookup("d.b"), None);
    }

    #[test]
    fn test_nest_merges_siblings() {
        let value = nest(vec![
            ("a.b".to_string(), Value::Int(1)),
            ("a.c".to_string(), Value::Int(2)),
        ]);

        let expected = Value::Record(BTreeMap::from([(
            "a".to_string(),
            Value::Record(BTreeMap::from([
                ("b".to_string(), Value::Int(1)),
                ("c".to_string(), Value::Int(2)),
            ])),
        )]));
        assert_eq!(value, expected);
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({ "a": 1, "b": [true, 2.5], "c": null });
        let value = Value::from_json(&json);

        assert_eq!(value.lookup("a"), Some(&Value::Int(1)));
        assert_eq!(
            value.lookup("b"),
            Some(&Value::Array(vec![Value::Bool(true), Value::Float(2.5)]))
        );
        assert_eq!(value.lookup("c"), Some(&Value::Null));
    }
}
