//! Error types for schema validation and encode/decode.

/// Errors produced when building a [crate::block::Block] tree from a raw
/// schema node. All of these surface at build time; a built tree never fails
/// validation during encode or decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required schema field is absent.
    MissingKey(String),
    /// A field's value does not match its accepted types, or `type` itself
    /// is not a registered tag.
    InvalidType(String),
    /// The node carries a field that is not declared for its type.
    UnexpectedKey(String),
    /// Steps thresholds are not strictly ascending.
    UnsortedSteps,
    /// `steps_names` does not hold exactly one more entry than `steps`.
    BadNamesLength,
}

/// Errors produced while encoding values or decoding bit-strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The message contains characters other than '0'/'1', or a raw
    /// binary/hex input is neither a bit-string nor hex.
    MalformedBitstring,
    /// The message is shorter than the bits a field needs.
    OutOfBounds,
    /// An input value has the wrong shape for its block (carries the block key).
    InvalidValue(String),
    /// An object field's dot-path cannot be resolved against the input record.
    MissingField(String),
}
