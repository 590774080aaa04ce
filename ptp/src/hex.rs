use std::fmt;

const DIGITS_PER_BYTE: usize = 2;

pub fn hex_string_to_bytes(hex_string: &[u8]) -> Result<Vec<u8>> {
    assert!(hex_string.len() % DIGITS_PER_BYTE == 0, "hex string must consist of pairs of hex digits");
    let mut bytes = Vec::with_capacity(hex_string.len() / DIGITS_PER_BYTE);
    for hex_digit_pair in hex_string.chunks(DIGITS_PER_BYTE) {
        let high_nibble = decode_hex_digit(hex_digit_pair[0])?;
        let low_nibble = decode_hex_digit(hex_digit_pair[1])?;
        bytes.push(high_nibble << 4 | low_nibble);
    }
    Ok(bytes)
}

fn decode_hex_digit(digit: u8) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(10 + (digit - b'a')),
        b'A'..=b'F' => Ok(10 + (digit - b'A')),
        d => Err(InvalidHexDigit(d)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidHexDigit(pub u8);

impl fmt::Display for InvalidHexDigit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_ascii() {
            write!(f, "invalid hex digit {:?}", self.0 as char)
        } else {
            write!(f, "invalid hex digit 0x{:02X}", self.0)
        }
    }
}

impl std::error::Error for InvalidHexDigit {}

type Result<T> = std::result::Result<T, InvalidHexDigit>;
