//! Composite codecs: length-prefixed arrays and ordered-field objects.
//!
//! These are the variable-width nodes: how many bits they occupy in a
//! message depends on the data, so [ArrayBlock::bit_length] and
//! [ObjectBlock::bit_length] must walk a concrete bit-string prefix.

use serde_json::{Map, Value as Json};

use crate::{
    block::Block,
    errors::{CodecError, SchemaError},
    scalar::IntegerBlock,
    validate::{Kind, check_node, rule, size_field},
    value::{self, Value},
};

/// Homogeneous repeated block behind an inline length prefix. Input longer
/// than the prefix can express is truncated silently.
#[derive(Debug, Clone)]
pub struct ArrayBlock {
    length: IntegerBlock,
    item: Box<Block>,
}

impl ArrayBlock {
    pub(crate) fn build(node: &Map<String, Json>) -> Result<Self, SchemaError> {
        check_node(
            node,
            &[rule("bits", &[Kind::Int]), rule("blocks", &[Kind::Map])],
            &[],
        )?;
        let bits = size_field(node, "bits", 64)?;
        let child = node
            .get("blocks")
            .ok_or_else(|| SchemaError::MissingKey("blocks".to_string()))?;
        Ok(ArrayBlock {
            length: IntegerBlock::new(bits, 0),
            item: Box::new(Block::build(child)?),
        })
    }

    fn max_length(&self) -> usize {
        self.length.max_value() as usize
    }

    pub(crate) fn encode(&self, key: &str, value: &Value) -> Result<String, CodecError> {
        let items = match value {
            Value::Array(items) => items.as_slice(),
            _ => return Err(CodecError::InvalidValue(key.to_string())),
        };
        let keep = items.len().min(self.max_length());
        let mut out = self.length.encode_raw(keep as i64);
        for item in &items[..keep] {
            out.push_str(&self.item.encode(item)?);
        }
        Ok(out)
    }

    pub(crate) fn decode(&self, message: &str) -> Result<Value, CodecError> {
        let prefix = self.length.bits();
        if message.len() < prefix {
            return Err(CodecError::OutOfBounds);
        }
        let count = self.length.decode_raw(&message[..prefix])? as usize;
        let mut rest = &message[prefix..];
        let mut items = Vec::with_capacity(count.min(rest.len()));
        for _ in 0..count {
            let (item, remainder) = self.item.consume(rest)?;
            items.push(item);
            rest = remainder;
        }
        Ok(Value::Array(items))
    }

    pub(crate) fn bit_length(&self, message: &str) -> Result<usize, CodecError> {
        let prefix = self.length.bits();
        if message.len() < prefix {
            return Err(CodecError::OutOfBounds);
        }
        let count = self.length.decode_raw(&message[..prefix])? as usize;
        let mut total = prefix;
        let mut rest = &message[prefix..];
        for _ in 0..count {
            let item_bits = self.item.bit_length(rest)?;
            if rest.len() < item_bits {
                return Err(CodecError::OutOfBounds);
            }
            total += item_bits;
            rest = &rest[item_bits..];
        }
        Ok(total)
    }
}

/// Two field keys conflict when they are equal or one names a record the
/// other treats as a leaf (`"a"` against `"a.b"`): flattened, they would
/// collide in the decoded record.
fn keys_conflict(a: &str, b: &str) -> bool {
    fn covers(short: &str, long: &str) -> bool {
        long.starts_with(short) && long.as_bytes().get(short.len()) == Some(&b'.')
    }
    a == b || covers(a, b) || covers(b, a)
}

/// Ordered list of named blocks; schema order fixes bit order, so no length
/// prefix is needed. Field keys may be dot-segmented to read from and decode
/// into nested records.
#[derive(Debug, Clone)]
pub struct ObjectBlock {
    fields: Vec<Block>,
}

impl ObjectBlock {
    pub(crate) fn build(node: &Map<String, Json>) -> Result<Self, SchemaError> {
        // `items` is accepted as an alias for `blocklist`.
        check_node(
            node,
            &[],
            &[
                rule("blocklist", &[Kind::List]),
                rule("items", &[Kind::List]),
            ],
        )?;
        let children = node
            .get("blocklist")
            .or_else(|| node.get("items"))
            .and_then(Json::as_array)
            .ok_or_else(|| SchemaError::MissingKey("blocklist".to_string()))?;
        if children.is_empty() {
            return Err(SchemaError::InvalidType("blocklist".to_string()));
        }

        let mut fields = Vec::with_capacity(children.len());
        for child in children {
            fields.push(Block::build(child)?);
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| keys_conflict(f.key(), field.key())) {
                return Err(SchemaError::InvalidType(field.key().to_string()));
            }
        }

        Ok(ObjectBlock { fields })
    }

    pub(crate) fn encode(&self, key: &str, value: &Value) -> Result<String, CodecError> {
        if !matches!(value, Value::Record(_) | Value::Null) {
            return Err(CodecError::InvalidValue(key.to_string()));
        }
        let mut out = String::new();
        for field in &self.fields {
            let encoded = match value.lookup(field.key()) {
                Some(resolved) => field.encode(resolved)?,
                None if field.takes_no_input() => field.encode(&Value::Null)?,
                None => return Err(CodecError::MissingField(field.key().to_string())),
            };
            out.push_str(&encoded);
        }
        Ok(out)
    }

    pub(crate) fn decode(&self, message: &str) -> Result<Value, CodecError> {
        let mut rest = message;
        let mut flat = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let (decoded, remainder) = field.consume(rest)?;
            flat.push((field.key().to_string(), decoded));
            rest = remainder;
        }
        Ok(value::nest(flat))
    }

    pub(crate) fn bit_length(&self, message: &str) -> Result<usize, CodecError> {
        let mut total = 0;
        let mut rest = message;
        for field in &self.fields {
            let field_bits = field.bit_length(rest)?;
            if rest.len() < field_bits {
                return Err(CodecError::OutOfBounds);
            }
            total += field_bits;
            rest = &rest[field_bits..];
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn node(json: Json) -> Map<String, Json> {
        json.as_object().unwrap().clone()
    }

    fn int_items(values: &[i64]) -> Value {
        Value::Array(values.iter().map(|v| Value::Int(*v)).collect())
    }

    #[test]
    fn test_array_length_prefix_then_items() {
        let block = ArrayBlock::build(&node(json!({
            "key": "readings",
            "type": "array",
            "bits": 8,
            "blocks": { "key": "reading", "type": "integer", "bits": 6 },
        })))
        .unwrap();

        let encoded = block.encode("readings", &int_items(&[1, 2, 3])).unwrap();
        assert_eq!(encoded, "00000011000001000010000011");
        assert_eq!(block.decode(&encoded).unwrap(), int_items(&[1, 2, 3]));
        assert_eq!(block.bit_length(&encoded).unwrap(), 26);
    }

    #[test]
    fn test_array_truncates_past_max_length() {
        let block = ArrayBlock::build(&node(json!({
            "key": "readings",
            "type": "array",
            "bits": 2,
            "blocks": { "key": "reading", "type": "integer", "bits": 4 },
        })))
        .unwrap();

        let encoded = block
            .encode("readings", &int_items(&[1, 2, 3, 4, 5]))
            .unwrap();
        assert_eq!(encoded, "11000100100011");
        assert_eq!(block.decode(&encoded).unwrap(), int_items(&[1, 2, 3]));
    }

    #[test]
    fn test_array_of_arrays_bit_length_recurses() {
        let block = ArrayBlock::build(&node(json!({
            "key": "matrix",
            "type": "array",
            "bits": 2,
            "blocks": {
                "key": "row",
                "type": "array",
                "bits": 2,
                "blocks": { "key": "cell", "type": "integer", "bits": 3 },
            },
        })))
        .unwrap();

        let rows = Value::Array(vec![int_items(&[1]), int_items(&[2, 3])]);
        let encoded = block.encode("matrix", &rows).unwrap();
        // Outer prefix 10, then "01 001" and "10 010 011".
        assert_eq!(encoded, "100100110010011");
        assert_eq!(block.bit_length(&encoded).unwrap(), encoded.len());
        assert_eq!(block.decode(&encoded).unwrap(), rows);
    }

    #[test]
    fn test_array_short_message_is_out_of_bounds() {
        let block = ArrayBlock::build(&node(json!({
            "key": "readings",
            "type": "array",
            "bits": 4,
            "blocks": { "key": "reading", "type": "integer", "bits": 8 },
        })))
        .unwrap();
        assert_eq!(
            block.bit_length("0011000").unwrap_err(),
            CodecError::OutOfBounds
        );
    }

    #[test]
    fn test_object_field_order_and_dotted_keys() {
        let block = ObjectBlock::build(&node(json!({
            "key": "payload",
            "type": "object",
            "blocklist": [
                { "key": "sensor.id", "type": "integer", "bits": 4 },
                { "key": "sensor.ok", "type": "boolean" },
                { "key": "count", "type": "integer", "bits": 3 },
            ],
        })))
        .unwrap();

        let input = value::nest(vec![
            ("sensor.id".to_string(), Value::Int(9)),
            ("sensor.ok".to_string(), Value::Bool(true)),
            ("count".to_string(), Value::Int(5)),
        ]);
        let encoded = block.encode("payload", &input).unwrap();
        assert_eq!(encoded, "10011101");

        let decoded = block.decode(&encoded).unwrap();
        assert_eq!(decoded, input);
        assert_eq!(decoded.lookup("sensor.id"), Some(&Value::Int(9)));
    }

    #[test]
    fn test_object_missing_field() {
        let block = ObjectBlock::build(&node(json!({
            "key": "payload",
            "type": "object",
            "blocklist": [{ "key": "count", "type": "integer", "bits": 3 }],
        })))
        .unwrap();

        let err = block
            .encode("payload", &Value::Record(BTreeMap::new()))
            .unwrap_err();
        assert_eq!(err, CodecError::MissingField("count".to_string()));
    }

    #[test]
    fn test_object_pad_and_literal_need_no_input() {
        let block = ObjectBlock::build(&node(json!({
            "key": "payload",
            "type": "object",
            "blocklist": [
                { "key": "version", "type": "integer", "bits": 4, "value": 2 },
                { "key": "reserved", "type": "pad", "bits": 2 },
            ],
        })))
        .unwrap();

        let encoded = block
            .encode("payload", &Value::Record(BTreeMap::new()))
            .unwrap();
        assert_eq!(encoded, "001011");

        let decoded = block.decode(&encoded).unwrap();
        assert_eq!(decoded.lookup("version"), Some(&Value::Int(2)));
        assert_eq!(decoded.lookup("reserved"), Some(&Value::Null));
    }

    #[test]
    fn test_object_rejects_duplicate_keys() {
        let err = ObjectBlock::build(&node(json!({
            "key": "payload",
            "type": "object",
            "blocklist": [
                { "key": "a", "type": "boolean" },
                { "key": "a", "type": "boolean" },
            ],
        })))
        .unwrap_err();
        assert_eq!(err, SchemaError::InvalidType("a".to_string()));
    }

    #[test]
    fn test_object_rejects_prefix_conflicting_keys() {
        // "a" as a leaf and "a.b" under it would collide after nesting, so
        // the conflict must be caught at build time, not lost on decode.
        let err = ObjectBlock::build(&node(json!({
            "key": "payload",
            "type": "object",
            "blocklist": [
                { "key": "a", "type": "integer", "bits": 4 },
                { "key": "a.b", "type": "boolean" },
            ],
        })))
        .unwrap_err();
        assert_eq!(err, SchemaError::InvalidType("a.b".to_string()));

        // Order does not matter.
        let err = ObjectBlock::build(&node(json!({
            "key": "payload",
            "type": "object",
            "blocklist": [
                { "key": "a.b", "type": "boolean" },
                { "key": "a", "type": "integer", "bits": 4 },
            ],
        })))
        .unwrap_err();
        assert_eq!(err, SchemaError::InvalidType("a".to_string()));
    }

    #[test]
    fn test_object_allows_shared_prefix_without_conflict() {
        // "ab" only shares characters with "a.b", not a record path.
        let block = ObjectBlock::build(&node(json!({
            "key": "payload",
            "type": "object",
            "blocklist": [
                { "key": "ab", "type": "boolean" },
                { "key": "a.b", "type": "boolean" },
            ],
        })))
        .unwrap();
        let input = value::nest(vec![
            ("ab".to_string(), Value::Bool(true)),
            ("a.b".to_string(), Value::Bool(false)),
        ]);
        let encoded = block.encode("payload", &input).unwrap();
        assert_eq!(block.decode(&encoded).unwrap(), input);
    }

    #[test]
    fn test_object_accepts_items_alias() {
        let block = ObjectBlock::build(&node(json!({
            "key": "payload",
            "type": "object",
            "items": [{ "key": "a", "type": "boolean" }],
        })))
        .unwrap();
        let input = value::nest(vec![("a".to_string(), Value::Bool(true))]);
        assert_eq!(block.encode("payload", &input).unwrap(), "1");
    }
}
