// src/encoding/mod.rs

//! Text to bit-string codec.
//!
//! A message is its UTF-8 bytes written out as '0'/'1' characters, eight
//! bits per byte, most-significant bit first, zero-padded to full width.
//! The mapping is exactly invertible: `bits_to_text(text_to_bits(s)) == s`
//! for every valid string, and the empty string maps to the empty bit
//! string.

use crate::core::DecodeError;

/// Encodes text into its bit-string form.
///
/// ```
/// assert_eq!(qrelay::encoding::text_to_bits("hi"), "0110100001101001");
/// ```
pub fn text_to_bits(text: &str) -> String {
    let mut bits = String::with_capacity(text.len() * 8);
    for byte in text.bytes() {
        for shift in (0..8).rev() {
            bits.push(if (byte >> shift) & 1 == 1 { '1' } else { '0' });
        }
    }
    bits
}

/// Decodes a bit string back into text.
///
/// ```
/// assert_eq!(qrelay::encoding::bits_to_text("0110100001101001").unwrap(), "hi");
/// ```
///
/// # Errors
/// * [`DecodeError::InvalidSymbol`] if any character is not '0' or '1'.
/// * [`DecodeError::RaggedLength`] if the length is not a multiple of 8.
/// * [`DecodeError::InvalidUtf8`] if the packed bytes are not valid UTF-8.
pub fn bits_to_text(bits: &str) -> Result<String, DecodeError> {
    let mut bytes = Vec::with_capacity(bits.len() / 8);
    let mut current = 0u8;
    let mut filled = 0usize;

    for (position, symbol) in bits.char_indices() {
        let bit = match symbol {
            '0' => 0u8,
            '1' => 1u8,
            _ => return Err(DecodeError::InvalidSymbol { position, symbol }),
        };
        current = (current << 1) | bit;
        filled += 1;
        if filled == 8 {
            bytes.push(current);
            current = 0;
            filled = 0;
        }
    }

    if filled != 0 {
        return Err(DecodeError::RaggedLength { length: bits.len() });
    }

    String::from_utf8(bytes).map_err(|e| DecodeError::InvalidUtf8 { message: e.to_string() })
}
