//! Table-driven checking of raw schema nodes.
//!
//! Each block type declares which fields it requires and which it accepts; a
//! node is rejected if a required field is missing, a field value has the
//! wrong JSON kind, or the node carries a field outside the declared set.
//! `key`, `type` and the literal `value` override are accepted on every node.

use serde_json::{Map, Value as Json};

use crate::errors::SchemaError;

/// JSON kinds a schema field may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    Int,
    Number,
    Str,
    List,
    Map,
}

impl Kind {
    fn matches(self, v: &Json) -> bool {
        match self {
            Kind::Int => v.is_i64() || v.is_u64(),
            Kind::Number => v.is_number(),
            Kind::Str => v.is_string(),
            Kind::List => v.is_array(),
            Kind::Map => v.is_object(),
        }
    }
}

/// One declared schema field: its name and the JSON kinds it accepts.
pub(crate) struct Rule {
    pub name: &'static str,
    pub kinds: &'static [Kind],
}

pub(crate) const fn rule(name: &'static str, kinds: &'static [Kind]) -> Rule {
    Rule { name, kinds }
}

/// Checks `node` against the declared field set. Required fields must be
/// present and match one of their kinds; optional fields must match when
/// present; anything else besides `key`, `type` and `value` is rejected.
pub(crate) fn check_node(
    node: &Map<String, Json>,
    required: &[Rule],
    optional: &[Rule],
) -> Result<(), SchemaError> {
    for rule in required {
        match node.get(rule.name) {
            None => return Err(SchemaError::MissingKey(rule.name.to_string())),
            Some(v) if !matches_any(rule, v) => {
                return Err(SchemaError::InvalidType(rule.name.to_string()));
            }
            Some(_) => {}
        }
    }

    for rule in optional {
        if let Some(v) = node.get(rule.name) {
            if !matches_any(rule, v) {
                return Err(SchemaError::InvalidType(rule.name.to_string()));
            }
        }
    }

    for field in node.keys() {
        let declared = field == "key"
            || field == "type"
            || field == "value"
            || required.iter().any(|r| r.name == field)
            || optional.iter().any(|r| r.name == field);
        if !declared {
            return Err(SchemaError::UnexpectedKey(field.clone()));
        }
    }

    Ok(())
}

fn matches_any(rule: &Rule, v: &Json) -> bool {
    rule.kinds.iter().any(|k| k.matches(v))
}

/// Upper bound for declared bit widths and string lengths that are not
/// capped at 64 by numeric assembly. Generous for any real payload while
/// keeping derived sizes and allocations bounded.
pub(crate) const MAX_SIZE: u64 = 1 << 20;

/// Reads a positive integer size field, rejecting zero and values above `max`.
pub(crate) fn size_field(
    node: &Map<String, Json>,
    name: &str,
    max: u64,
) -> Result<usize, SchemaError> {
    let v = node
        .get(name)
        .and_then(Json::as_u64)
        .ok_or_else(|| SchemaError::InvalidType(name.to_string()))?;
    if v == 0 || v > max {
        return Err(SchemaError::InvalidType(name.to_string()));
    }
    Ok(v as usize)
}

/// Reads an optional numeric field, falling back to `default` when absent.
pub(crate) fn number_field(
    node: &Map<String, Json>,
    name: &str,
    default: f64,
) -> Result<f64, SchemaError> {
    match node.get(name) {
        None => Ok(default),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| SchemaError::InvalidType(name.to_string())),
    }
}
