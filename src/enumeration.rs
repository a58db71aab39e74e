//! Enumeration codecs: ordered threshold buckets and labelled categories.
//!
//! Both encode a small index through an internal [IntegerBlock] sized with
//! `ceil(log2(entry count))` bits.

use serde_json::{Map, Value as Json};

use crate::{
    bits,
    errors::{CodecError, SchemaError},
    scalar::IntegerBlock,
    validate::{Kind, check_node, rule},
    value::Value,
};

/// Decode result for an index past the label table.
const OUT_OF_RANGE: &str = "error";

/// Strictly ascending thresholds bucketing a number, with named buckets.
/// An implicit upper bucket catches everything at or above the last
/// threshold.
#[derive(Debug, Clone)]
pub struct StepsBlock {
    steps: Vec<f64>,
    names: Vec<String>,
    index: IntegerBlock,
}

impl StepsBlock {
    pub(crate) fn build(node: &Map<String, Json>) -> Result<Self, SchemaError> {
        check_node(
            node,
            &[rule("steps", &[Kind::List])],
            &[rule("steps_names", &[Kind::List])],
        )?;

        let raw = node
            .get("steps")
            .and_then(Json::as_array)
            .ok_or_else(|| SchemaError::MissingKey("steps".to_string()))?;
        let mut steps = Vec::with_capacity(raw.len());
        for v in raw {
            steps.push(
                v.as_f64()
                    .ok_or_else(|| SchemaError::InvalidType("steps".to_string()))?,
            );
        }
        if steps.is_empty() {
            return Err(SchemaError::InvalidType("steps".to_string()));
        }
        if !steps.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(SchemaError::UnsortedSteps);
        }

        let names = match node.get("steps_names").and_then(Json::as_array) {
            Some(raw_names) => {
                if raw_names.len() != steps.len() + 1 {
                    return Err(SchemaError::BadNamesLength);
                }
                let mut names = Vec::with_capacity(raw_names.len());
                for v in raw_names {
                    names.push(
                        v.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| SchemaError::InvalidType("steps_names".to_string()))?,
                    );
                }
                names
            }
            None => default_names(&steps),
        };

        let index = IntegerBlock::new(bits::bit_width(steps.len() + 1), 0);
        Ok(StepsBlock {
            steps,
            names,
            index,
        })
    }

    pub(crate) fn encode(&self, key: &str, value: &Value) -> Result<String, CodecError> {
        let v = match value {
            Value::Int(n) => *n as f64,
            Value::Float(f) => *f,
            _ => return Err(CodecError::InvalidValue(key.to_string())),
        };
        // First threshold strictly greater than the value; the fallthrough
        // is the implicit upper bucket.
        let bucket = self
            .steps
            .iter()
            .position(|s| v < *s)
            .unwrap_or(self.steps.len());
        Ok(self.index.encode_raw(bucket as i64))
    }

    pub(crate) fn decode(&self, message: &str) -> Result<Value, CodecError> {
        let index = bits::parse_bits(message)? as usize;
        let name = self
            .names
            .get(index)
            .map(String::as_str)
            .unwrap_or(OUT_OF_RANGE);
        Ok(Value::Str(name.to_string()))
    }

    pub(crate) fn bits(&self) -> usize {
        self.index.bits()
    }
}

/// Auto-generated range labels: `x<a`, `a<=x<b`, ..., `x>=z`.
fn default_names(steps: &[f64]) -> Vec<String> {
    let mut names = Vec::with_capacity(steps.len() + 1);
    names.push(format!("x<{}", steps[0]));
    for pair in steps.windows(2) {
        names.push(format!("{}<=x<{}", pair[0], pair[1]));
    }
    names.push(format!("x>={}", steps[steps.len() - 1]));
    names
}

/// Closed label list with an appended "unknown" sentinel. Inputs outside the
/// list encode to the sentinel index.
#[derive(Debug, Clone)]
pub struct CategoriesBlock {
    categories: Vec<String>,
    index: IntegerBlock,
}

impl CategoriesBlock {
    pub(crate) fn build(node: &Map<String, Json>) -> Result<Self, SchemaError> {
        check_node(node, &[rule("categories", &[Kind::List])], &[])?;

        let raw = node
            .get("categories")
            .and_then(Json::as_array)
            .ok_or_else(|| SchemaError::MissingKey("categories".to_string()))?;
        let mut categories = Vec::with_capacity(raw.len() + 1);
        for v in raw {
            categories.push(
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| SchemaError::InvalidType("categories".to_string()))?,
            );
        }
        if categories.is_empty() {
            return Err(SchemaError::InvalidType("categories".to_string()));
        }
        categories.push("unknown".to_string());

        // Width follows the count after the sentinel append; an index the
        // width can represent but the table cannot decodes to "error".
        let index = IntegerBlock::new(bits::bit_width(categories.len()), 0);
        Ok(CategoriesBlock { categories, index })
    }

    pub(crate) fn encode(&self, value: &Value) -> Result<String, CodecError> {
        let sentinel = self.categories.len() - 1;
        let index = match value {
            Value::Str(s) => self
                .categories
                .iter()
                .position(|c| c == s)
                .unwrap_or(sentinel),
            _ => sentinel,
        };
        Ok(self.index.encode_raw(index as i64))
    }

    pub(crate) fn decode(&self, message: &str) -> Result<Value, CodecError> {
        let index = bits::parse_bits(message)? as usize;
        let label = self
            .categories
            .get(index)
            .map(String::as_str)
            .unwrap_or(OUT_OF_RANGE);
        Ok(Value::Str(label.to_string()))
    }

    pub(crate) fn bits(&self) -> usize {
        self.index.bits()
    }
}
