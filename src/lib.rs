//! # bitweave
//!
//! A schema-driven bit-level codec: a declarative schema (a tree of typed
//! block descriptors) packs structured values into a dense '0'/'1'
//! bit-string with no byte alignment, and reverses the process exactly.
//!
//! Compile a schema once, then encode and decode any number of payloads.
//! Variable-length structures (arrays, nested objects) carry their lengths
//! inline, so a flat bit-string needs no out-of-band framing beyond the
//! schema itself.
//!
//! ## Example
//!
//! ```
//! use bitweave::{Schema, Value};
//! use serde_json::json;
//!
//! let schema = Schema::compile(&json!({
//!     "key": "reading",
//!     "type": "object",
//!     "blocklist": [
//!         { "key": "active", "type": "boolean" },
//!         { "key": "count", "type": "integer", "bits": 6 },
//!     ],
//! })).unwrap();
//!
//! let mut record = std::collections::BTreeMap::new();
//! record.insert("active".to_string(), Value::Bool(true));
//! record.insert("count".to_string(), Value::Int(5));
//!
//! let message = schema.encode(&Value::Record(record)).unwrap();
//! assert_eq!(message, "1000101");
//!
//! let decoded = schema.decode(&message).unwrap();
//! assert_eq!(decoded.lookup("count"), Some(&Value::Int(5)));
//! ```

pub mod bits;
pub mod block;
pub mod composite;
pub mod enumeration;
pub mod errors;
pub mod scalar;
pub mod schema;
pub mod text;
mod validate;
pub mod value;

pub use errors::{CodecError, SchemaError};
pub use schema::Schema;
pub use value::Value;

/// Failure of either stage, for the one-shot helpers below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Schema(SchemaError),
    Codec(CodecError),
}

impl From<SchemaError> for Error {
    fn from(e: SchemaError) -> Self {
        Error::Schema(e)
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Error::Codec(e)
    }
}

/// Compiles `schema` and encodes `value` in one call.
pub fn encode(value: &Value, schema: &serde_json::Value) -> Result<String, Error> {
    Ok(Schema::compile(schema)?.encode(value)?)
}

/// Compiles `schema` and decodes `message` in one call.
pub fn decode(message: &str, schema: &serde_json::Value) -> Result<Value, Error> {
    Ok(Schema::compile(schema)?.decode(message)?)
}
