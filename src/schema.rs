//! Schema: a compiled codec tree with top-level encode and decode.

use serde_json::Value as Json;

use crate::{
    block::Block,
    errors::{CodecError, SchemaError},
    value::Value,
};

/// A compiled codec tree. Use [Schema::compile] to build from a raw schema
/// node, then [Schema::encode] / [Schema::decode] for any number of
/// payloads. The tree is immutable after compilation and safe to share
/// read-only across threads.
#[derive(Debug, Clone)]
pub struct Schema {
    root: Block,
}

impl Schema {
    /// Compiles a raw schema node, and recursively all child nodes, into a
    /// codec tree. Every validation error surfaces here, never at
    /// encode/decode time.
    pub fn compile(node: &Json) -> Result<Self, SchemaError> {
        Ok(Schema {
            root: Block::build(node)?,
        })
    }

    /// The root block of the compiled tree.
    pub fn root(&self) -> &Block {
        &self.root
    }

    /// Encodes a structured value into a bit-string.
    pub fn encode(&self, value: &Value) -> Result<String, CodecError> {
        self.root.encode(value)
    }

    /// Decodes the schema's leading bits of `message`; trailing bits beyond
    /// the schema's reach are ignored.
    pub fn decode(&self, message: &str) -> Result<Value, CodecError> {
        self.root.decode(message)
    }

    /// Decodes the schema's leading bits and returns the value together
    /// with the unconsumed remainder.
    pub fn consume<'a>(&self, message: &'a str) -> Result<(Value, &'a str), CodecError> {
        self.root.consume(message)
    }

    /// Number of bits the schema occupies at the front of `message`.
    pub fn bit_length(&self, message: &str) -> Result<usize, CodecError> {
        self.root.bit_length(message)
    }
}
