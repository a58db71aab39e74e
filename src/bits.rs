//! Bit-string utilities: fixed-width formatting, parsing, and hex expansion.
//!
//! A bit-string is a sequence of '0'/'1' characters with no byte alignment.
//! Composition is concatenation only; the schema decides where one field
//! ends and the next begins.

use crate::errors::CodecError;

/// Returns true if every character of `s` is '0' or '1'.
pub fn is_bitstring(s: &str) -> bool {
    s.bytes().all(|b| b == b'0' || b == b'1')
}

/// Formats the low `width` bits of `value` as a bit-string, MSB first.
pub fn format_bits(value: u64, width: usize) -> String {
    (0..width)
        .rev()
        .map(|i| if (value >> i) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Parses a bit-string into an unsigned value (max 64 bits). MSB first.
pub fn parse_bits(s: &str) -> Result<u64, CodecError> {
    if s.len() > 64 {
        return Err(CodecError::OutOfBounds);
    }

    let mut value = 0u64;
    for b in s.bytes() {
        value = (value << 1)
            | match b {
                b'0' => 0,
                b'1' => 1,
                _ => return Err(CodecError::MalformedBitstring),
            };
    }
    Ok(value)
}

/// Expands a hex string into a bit-string, four bits per digit.
pub fn hex_to_bits(s: &str) -> Result<String, CodecError> {
    let mut out = String::with_capacity(s.len() * 4);
    for c in s.chars() {
        let nibble = c.to_digit(16).ok_or(CodecError::MalformedBitstring)? as u64;
        out.push_str(&format_bits(nibble, 4));
    }
    Ok(out)
}

/// Left-pads `s` with '0' to `width`, then keeps only the first `width` characters.
pub fn fit_left(s: &str, width: usize) -> String {
    if s.len() >= width {
        s[..width].to_string()
    } else {
        let mut out = String::with_capacity(width);
        for _ in 0..width - s.len() {
            out.push('0');
        }
        out.push_str(s);
        out
    }
}

/// Ceiling of log2(n); 0 for n <= 1.
pub fn bit_width(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}
