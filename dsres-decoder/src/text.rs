//! Fixed-width text payloads
//!
//! Text matrices store one character code per element. Codes are single
//! bytes, read as Latin-1 so that any byte maps to a char.

use crate::types::{DecoderError, Result};

/// Decode a padded text column into a trimmed string
///
/// NUL padding is dropped and surrounding whitespace trimmed.
pub(crate) fn decode_text(matrix: &str, index: usize, values: &[f64]) -> Result<String> {
    let mut text = String::with_capacity(values.len());

    for &code in values {
        if !(0.0..=255.0).contains(&code) || code.fract() != 0.0 {
            return Err(DecoderError::decode(
                matrix,
                index,
                format!("{} is not a single-byte character code", code),
            ));
        }
        let byte = code as u8;
        if byte != 0 {
            text.push(byte as char);
        }
    }

    Ok(text.trim().to_string())
}
