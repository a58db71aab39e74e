//! Block: one schema node's codec, and the factory that builds a tree of
//! them from raw schema nodes.

use serde_json::Value as Json;

use crate::{
    bits,
    composite::{ArrayBlock, ObjectBlock},
    enumeration::{CategoriesBlock, StepsBlock},
    errors::{CodecError, SchemaError},
    scalar::{BinaryBlock, BooleanBlock, FloatBlock, IntegerBlock, PadBlock},
    text::TextBlock,
    value::Value,
};

/// One node of a codec tree: a key, an optional literal override, and the
/// typed codec variant. Built once by [Block::build] and immutable after.
#[derive(Debug, Clone)]
pub struct Block {
    key: String,
    literal: Option<Value>,
    kind: BlockKind,
}

/// Codec variant per registered schema type tag.
#[derive(Debug, Clone)]
pub enum BlockKind {
    Boolean(BooleanBlock),
    Binary(BinaryBlock),
    Integer(IntegerBlock),
    Float(FloatBlock),
    Pad(PadBlock),
    Steps(StepsBlock),
    Categories(CategoriesBlock),
    Text(TextBlock),
    Array(ArrayBlock),
    Object(ObjectBlock),
}

impl Block {
    /// Builds a codec tree from a raw schema node, validating this node and
    /// recursively every child node. All schema errors surface here; a built
    /// tree never fails validation during encode or decode.
    pub fn build(node: &Json) -> Result<Block, SchemaError> {
        let map = node
            .as_object()
            .ok_or_else(|| SchemaError::InvalidType("node".to_string()))?;

        let key = match map.get("key") {
            None => return Err(SchemaError::MissingKey("key".to_string())),
            Some(Json::String(s)) => s.clone(),
            Some(_) => return Err(SchemaError::InvalidType("key".to_string())),
        };
        let tag = match map.get("type") {
            None => return Err(SchemaError::MissingKey("type".to_string())),
            Some(Json::String(s)) => s.as_str(),
            Some(_) => return Err(SchemaError::InvalidType("type".to_string())),
        };

        let kind = match tag {
            "boolean" => BlockKind::Boolean(BooleanBlock::build(map)?),
            "binary" => BlockKind::Binary(BinaryBlock::build(map)?),
            "integer" => BlockKind::Integer(IntegerBlock::build(map)?),
            "float" => BlockKind::Float(FloatBlock::build(map)?),
            "pad" => BlockKind::Pad(PadBlock::build(map)?),
            "steps" => BlockKind::Steps(StepsBlock::build(map)?),
            "categories" => BlockKind::Categories(CategoriesBlock::build(map)?),
            "string" => BlockKind::Text(TextBlock::build(map)?),
            "array" => BlockKind::Array(ArrayBlock::build(map)?),
            "object" => BlockKind::Object(ObjectBlock::build(map)?),
            _ => return Err(SchemaError::InvalidType("type".to_string())),
        };

        Ok(Block {
            key,
            literal: map.get("value").map(Value::from_json),
            kind,
        })
    }

    /// The key naming this block within its parent.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True if this block encodes without consuming an input value: pad
    /// blocks, and blocks with a literal `value` override.
    pub(crate) fn takes_no_input(&self) -> bool {
        self.literal.is_some() || matches!(self.kind, BlockKind::Pad(_))
    }

    /// Encodes `value` into a bit-string. A literal override on the schema
    /// node wins over the provided input.
    pub fn encode(&self, value: &Value) -> Result<String, CodecError> {
        let value = self.literal.as_ref().unwrap_or(value);
        match &self.kind {
            BlockKind::Boolean(block) => block.encode(&self.key, value),
            BlockKind::Binary(block) => block.encode(&self.key, value),
            BlockKind::Integer(block) => block.encode(&self.key, value),
            BlockKind::Float(block) => block.encode(&self.key, value),
            BlockKind::Pad(block) => Ok(block.encode()),
            BlockKind::Steps(block) => block.encode(&self.key, value),
            BlockKind::Categories(block) => block.encode(value),
            BlockKind::Text(block) => block.encode(&self.key, value),
            BlockKind::Array(block) => block.encode(&self.key, value),
            BlockKind::Object(block) => block.encode(&self.key, value),
        }
    }

    /// Decodes this block's bits at the front of `message`; trailing bits
    /// beyond [Block::bit_length] are ignored.
    pub fn decode(&self, message: &str) -> Result<Value, CodecError> {
        let (value, _) = self.consume(message)?;
        Ok(value)
    }

    /// Decodes this block's leading bits and returns the value together with
    /// the unconsumed remainder.
    pub fn consume<'a>(&self, message: &'a str) -> Result<(Value, &'a str), CodecError> {
        if !bits::is_bitstring(message) {
            return Err(CodecError::MalformedBitstring);
        }
        let taken = self.bit_length(message)?;
        if message.len() < taken {
            return Err(CodecError::OutOfBounds);
        }
        let own = &message[..taken];
        let value = match &self.kind {
            BlockKind::Boolean(block) => block.decode(own),
            BlockKind::Binary(block) => block.decode(own),
            BlockKind::Integer(block) => block.decode(own)?,
            BlockKind::Float(block) => block.decode(own)?,
            BlockKind::Pad(block) => block.decode(),
            BlockKind::Steps(block) => block.decode(own)?,
            BlockKind::Categories(block) => block.decode(own)?,
            BlockKind::Text(block) => block.decode(own)?,
            BlockKind::Array(block) => block.decode(own)?,
            BlockKind::Object(block) => block.decode(own)?,
        };
        Ok((value, &message[taken..]))
    }

    /// Number of bits this block occupies at the front of `message`.
    /// Constant for fixed-width kinds; computed by walking the prefix for
    /// arrays and objects, whose width is data-dependent.
    pub fn bit_length(&self, message: &str) -> Result<usize, CodecError> {
        if !bits::is_bitstring(message) {
            return Err(CodecError::MalformedBitstring);
        }
        match &self.kind {
            BlockKind::Boolean(_) => Ok(1),
            BlockKind::Binary(block) => Ok(block.bits()),
            BlockKind::Integer(block) => Ok(block.bits()),
            BlockKind::Float(block) => Ok(block.bits()),
            BlockKind::Pad(block) => Ok(block.bits()),
            BlockKind::Steps(block) => Ok(block.bits()),
            BlockKind::Categories(block) => Ok(block.bits()),
            BlockKind::Text(block) => Ok(block.bits()),
            BlockKind::Array(block) => block.bit_length(message),
            BlockKind::Object(block) => block.bit_length(message),
        }
    }
}
