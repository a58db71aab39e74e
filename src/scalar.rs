//! Scalar codecs: boolean, binary, integer, float and pad.
//!
//! Every scalar has a constant bit width known at build time. Out-of-range
//! numeric inputs clamp silently to the representable range.

use serde_json::{Map, Value as Json};

use crate::{
    bits,
    errors::{CodecError, SchemaError},
    validate::{Kind, MAX_SIZE, check_node, number_field, rule, size_field},
    value::Value,
};

/// Single-bit truth value: non-zero numbers count as true.
#[derive(Debug, Clone)]
pub struct BooleanBlock;

impl BooleanBlock {
    pub(crate) fn build(node: &Map<String, Json>) -> Result<Self, SchemaError> {
        check_node(node, &[], &[])?;
        Ok(BooleanBlock)
    }

    pub(crate) fn encode(&self, key: &str, value: &Value) -> Result<String, CodecError> {
        let truthy = match value {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            _ => return Err(CodecError::InvalidValue(key.to_string())),
        };
        Ok(if truthy { "1" } else { "0" }.to_string())
    }

    pub(crate) fn decode(&self, message: &str) -> Value {
        Value::Bool(message == "1")
    }
}

/// Raw bit or hex payload, padded and truncated to a fixed width on encode.
/// Decode passes the observed bits through untouched.
#[derive(Debug, Clone)]
pub struct BinaryBlock {
    bits: usize,
}

impl BinaryBlock {
    pub(crate) fn build(node: &Map<String, Json>) -> Result<Self, SchemaError> {
        check_node(node, &[rule("bits", &[Kind::Int])], &[])?;
        Ok(BinaryBlock {
            bits: size_field(node, "bits", MAX_SIZE)?,
        })
    }

    pub(crate) fn encode(&self, key: &str, value: &Value) -> Result<String, CodecError> {
        let raw = match value {
            Value::Bits(s) | Value::Str(s) => s.as_str(),
            _ => return Err(CodecError::InvalidValue(key.to_string())),
        };
        let expanded = if bits::is_bitstring(raw) {
            raw.to_string()
        } else {
            bits::hex_to_bits(raw)?
        };
        Ok(bits::fit_left(&expanded, self.bits))
    }

    pub(crate) fn decode(&self, message: &str) -> Value {
        Value::Bits(message.to_string())
    }

    pub(crate) fn bits(&self) -> usize {
        self.bits
    }
}

/// Offset integer with silent clamping to the representable range.
#[derive(Debug, Clone)]
pub struct IntegerBlock {
    bits: usize,
    offset: i64,
}

impl IntegerBlock {
    pub(crate) fn build(node: &Map<String, Json>) -> Result<Self, SchemaError> {
        check_node(
            node,
            &[rule("bits", &[Kind::Int])],
            &[rule("offset", &[Kind::Int])],
        )?;
        let bits = size_field(node, "bits", 64)?;
        let offset = match node.get("offset") {
            Some(v) => v
                .as_i64()
                .ok_or_else(|| SchemaError::InvalidType("offset".to_string()))?,
            None => 0,
        };
        Ok(IntegerBlock { bits, offset })
    }

    /// Internal constructor for codecs that encode through an integer
    /// (enumerations, string indices, array length prefixes).
    pub(crate) fn new(bits: usize, offset: i64) -> Self {
        IntegerBlock { bits, offset }
    }

    /// Largest raw value representable in `bits`.
    pub(crate) fn max_value(&self) -> u64 {
        if self.bits == 64 {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }

    pub(crate) fn encode(&self, key: &str, value: &Value) -> Result<String, CodecError> {
        match value {
            Value::Int(n) => Ok(self.encode_raw(*n)),
            _ => Err(CodecError::InvalidValue(key.to_string())),
        }
    }

    /// Clamps `value - offset` into the representable range and formats it.
    pub(crate) fn encode_raw(&self, value: i64) -> String {
        let shifted = (value as i128) - (self.offset as i128);
        let clamped = shifted.clamp(0, self.max_value() as i128) as u64;
        bits::format_bits(clamped, self.bits)
    }

    pub(crate) fn decode(&self, message: &str) -> Result<Value, CodecError> {
        Ok(Value::Int(self.decode_raw(message)?))
    }

    pub(crate) fn decode_raw(&self, message: &str) -> Result<i64, CodecError> {
        let parsed = bits::parse_bits(message)?;
        let value = (self.offset as i128) + (parsed as i128);
        Ok(value.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    pub(crate) fn bits(&self) -> usize {
        self.bits
    }
}

/// How quantized float values are rounded to a bucket index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approximation {
    /// Round half to even.
    Round,
    Floor,
    Ceil,
}

/// Float quantized over a closed range. Lossy: a round-trip lands within one
/// quantization step of the original.
#[derive(Debug, Clone)]
pub struct FloatBlock {
    bits: usize,
    lower: f64,
    upper: f64,
    approximation: Approximation,
}

impl FloatBlock {
    pub(crate) fn build(node: &Map<String, Json>) -> Result<Self, SchemaError> {
        check_node(
            node,
            &[rule("bits", &[Kind::Int])],
            &[
                rule("lower", &[Kind::Number]),
                rule("upper", &[Kind::Number]),
                rule("approximation", &[Kind::Str]),
            ],
        )?;
        let bits = size_field(node, "bits", 64)?;
        let lower = number_field(node, "lower", 0.0)?;
        let upper = number_field(node, "upper", 1.0)?;
        if !(upper > lower) {
            return Err(SchemaError::InvalidType("upper".to_string()));
        }
        let approximation = match node.get("approximation").and_then(Json::as_str) {
            None | Some("round") => Approximation::Round,
            Some("floor") => Approximation::Floor,
            Some("ceil") => Approximation::Ceil,
            Some(_) => return Err(SchemaError::InvalidType("approximation".to_string())),
        };
        Ok(FloatBlock {
            bits,
            lower,
            upper,
            approximation,
        })
    }

    fn max_index(&self) -> f64 {
        if self.bits == 64 {
            u64::MAX as f64
        } else {
            ((1u64 << self.bits) - 1) as f64
        }
    }

    pub(crate) fn encode(&self, key: &str, value: &Value) -> Result<String, CodecError> {
        let v = match value {
            Value::Float(f) => *f,
            Value::Int(n) => *n as f64,
            _ => return Err(CodecError::InvalidValue(key.to_string())),
        };
        if v.is_nan() {
            return Err(CodecError::InvalidValue(key.to_string()));
        }
        let max = self.max_index();
        let normalized = max * (v - self.lower) / (self.upper - self.lower);
        let clamped = normalized.clamp(0.0, max);
        let index = match self.approximation {
            Approximation::Round => clamped.round_ties_even(),
            Approximation::Floor => clamped.floor(),
            Approximation::Ceil => clamped.ceil(),
        };
        Ok(bits::format_bits(index as u64, self.bits))
    }

    pub(crate) fn decode(&self, message: &str) -> Result<Value, CodecError> {
        let parsed = bits::parse_bits(message)? as f64;
        Ok(Value::Float(
            self.lower + parsed * (self.upper - self.lower) / self.max_index(),
        ))
    }

    pub(crate) fn bits(&self) -> usize {
        self.bits
    }
}

/// Fixed run of one-bits used as filler; takes no input and decodes to Null.
#[derive(Debug, Clone)]
pub struct PadBlock {
    bits: usize,
}

impl PadBlock {
    pub(crate) fn build(node: &Map<String, Json>) -> Result<Self, SchemaError> {
        check_node(node, &[rule("bits", &[Kind::Int])], &[])?;
        Ok(PadBlock {
            bits: size_field(node, "bits", MAX_SIZE)?,
        })
    }

    pub(crate) fn encode(&self) -> String {
        "1".repeat(self.bits)
    }

    pub(crate) fn decode(&self) -> Value {
        Value::Null
    }

    pub(crate) fn bits(&self) -> usize {
        self.bits
    }
}
