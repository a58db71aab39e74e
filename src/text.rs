//! Fixed-length text codec over a 64-symbol alphabet.
//!
//! Each character becomes one 6-bit index into the standard base64 symbol
//! table. Space has no slot of its own and aliases to index 62 ('+'); any
//! other unrecognized character aliases to index 63. A schema may override
//! individual slots through `custom_alphabet`, which applies to both
//! directions.

use serde_json::{Map, Value as Json};

use crate::{
    bits,
    errors::{CodecError, SchemaError},
    scalar::IntegerBlock,
    validate::{Kind, MAX_SIZE, check_node, rule, size_field},
    value::Value,
};

const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const SPACE_INDEX: usize = 62;
const UNKNOWN_INDEX: usize = 63;

/// Fixed-length text, one 6-bit alphabet index per character. Short input
/// is padded on the left with spaces; overlong input keeps its first
/// `length` characters.
#[derive(Debug, Clone)]
pub struct TextBlock {
    length: usize,
    table: Vec<char>,
    index: IntegerBlock,
}

impl TextBlock {
    pub(crate) fn build(node: &Map<String, Json>) -> Result<Self, SchemaError> {
        check_node(
            node,
            &[rule("length", &[Kind::Int])],
            &[rule("custom_alphabet", &[Kind::Map])],
        )?;
        let length = size_field(node, "length", MAX_SIZE)?;

        let mut table: Vec<char> = ALPHABET.iter().map(|b| *b as char).collect();
        if let Some(custom) = node.get("custom_alphabet").and_then(Json::as_object) {
            for (slot, replacement) in custom {
                let index: usize = slot
                    .parse()
                    .map_err(|_| SchemaError::InvalidType("custom_alphabet".to_string()))?;
                if index >= table.len() {
                    return Err(SchemaError::InvalidType("custom_alphabet".to_string()));
                }
                table[index] = single_char(replacement)
                    .ok_or_else(|| SchemaError::InvalidType("custom_alphabet".to_string()))?;
            }
        }

        Ok(TextBlock {
            length,
            table,
            index: IntegerBlock::new(6, 0),
        })
    }

    pub(crate) fn encode(&self, key: &str, value: &Value) -> Result<String, CodecError> {
        let text = match value {
            Value::Str(s) => s.as_str(),
            _ => return Err(CodecError::InvalidValue(key.to_string())),
        };
        let mut out = String::with_capacity(6 * self.length);
        for c in pad_left(text, self.length).chars() {
            out.push_str(&self.index.encode_raw(self.char_index(c) as i64));
        }
        Ok(out)
    }

    pub(crate) fn decode(&self, message: &str) -> Result<Value, CodecError> {
        let mut out = String::with_capacity(self.length);
        for group in 0..self.length {
            let index = bits::parse_bits(&message[group * 6..(group + 1) * 6])? as usize;
            out.push(self.table[index]);
        }
        Ok(Value::Str(out))
    }

    fn char_index(&self, c: char) -> usize {
        if let Some(index) = self.table.iter().position(|t| *t == c) {
            index
        } else if c == ' ' {
            SPACE_INDEX
        } else {
            UNKNOWN_INDEX
        }
    }

    pub(crate) fn bits(&self) -> usize {
        6 * self.length
    }
}

fn single_char(v: &Json) -> Option<char> {
    let s = v.as_str()?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Pads with leading spaces to `length`; overlong input keeps its first
/// `length` characters.
fn pad_left(text: &str, length: usize) -> String {
    let count = text.chars().count();
    if count >= length {
        text.chars().take(length).collect()
    } else {
        let mut out = String::with_capacity(length);
        for _ in 0..length - count {
            out.push(' ');
        }
        out.push_str(text);
        out
    }
}
