// Text decoding for ID3v2 text-information frames

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::{Id3Error, Result};

/// Text encoding types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// ISO-8859-1
    Latin1 = 0,
    /// UTF-16 with a byte order mark
    Utf16 = 1,
    /// UTF-16 big endian without a byte order mark (ID3v2.4)
    Utf16BE = 2,
    /// UTF-8 (ID3v2.4)
    Utf8 = 3,
}

impl TextEncoding {
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(TextEncoding::Latin1),
            1 => Ok(TextEncoding::Utf16),
            2 => Ok(TextEncoding::Utf16BE),
            3 => Ok(TextEncoding::Utf8),
            other => Err(Id3Error::UnsupportedEncoding(other)),
        }
    }

    fn is_wide(self) -> bool {
        matches!(self, TextEncoding::Utf16 | TextEncoding::Utf16BE)
    }
}

/// Decode a full text frame payload: encoding byte followed by text
///
/// An empty payload decodes to an empty string. Only the first value of a
/// multi-value frame is returned.
pub fn decode_text_frame(payload: &[u8]) -> Result<String> {
    let Some((&encoding, text)) = payload.split_first() else {
        return Ok(String::new());
    };

    Ok(decode_text(text, TextEncoding::from_byte(encoding)?))
}

/// Decode text with specified encoding, stopping at the first terminator
pub fn decode_text(data: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Latin1 => latin1_decode(first_segment(data, encoding)),
        TextEncoding::Utf16 => {
            let (codec, text) = match data {
                [0xFF, 0xFE, rest @ ..] => (UTF_16LE, rest),
                [0xFE, 0xFF, rest @ ..] => (UTF_16BE, rest),
                // Missing BOM, little endian is what writers emit in practice
                _ => (UTF_16LE, data),
            };
            decode_with(codec, first_segment(text, encoding))
        }
        TextEncoding::Utf16BE => decode_with(UTF_16BE, first_segment(data, encoding)),
        TextEncoding::Utf8 => decode_with(UTF_8, first_segment(data, encoding)),
    }
}

/// ISO-8859-1 maps every byte to the code point of the same value
pub fn latin1_decode(data: &[u8]) -> String {
    data.iter().copied().map(char::from).collect()
}

fn decode_with(codec: &'static Encoding, data: &[u8]) -> String {
    codec.decode_without_bom_handling(data).0.into_owned()
}

/// The bytes before the first null terminator (one byte, or an aligned pair for UTF-16)
fn first_segment(data: &[u8], encoding: TextEncoding) -> &[u8] {
    if encoding.is_wide() {
        let data = &data[..data.len() & !1];
        return match data.chunks_exact(2).position(|unit| unit == [0, 0]) {
            Some(end) => &data[..end * 2],
            None => data,
        };
    }

    match data.iter().position(|&b| b == 0) {
        Some(end) => &data[..end],
        None => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn latin1_strips_terminator() {
        assert_eq!(decode_text_frame(b"\x00Test Song\x00").unwrap(), "Test Song");
        assert_eq!(decode_text_frame(b"\x00Caf\xE9").unwrap(), "Café");
    }

    #[test_log::test]
    fn whitespace_is_preserved() {
        assert_eq!(decode_text_frame(b"\x00  padded  \x00").unwrap(), "  padded  ");
    }

    #[test_log::test]
    fn utf16_with_bom() {
        let le = [0x01, 0xFF, 0xFE, b'H', 0, b'i', 0, 0, 0];
        assert_eq!(decode_text_frame(&le).unwrap(), "Hi");

        let be = [0x01, 0xFE, 0xFF, 0, b'H', 0, b'i', 0, 0];
        assert_eq!(decode_text_frame(&be).unwrap(), "Hi");
    }

    #[test_log::test]
    fn utf16_terminator_must_be_aligned() {
        // "Ā" is 0x0100, its low byte followed by the next unit's high byte looks like 00 00
        let payload = [0x02, 0x01, 0x00, 0x00, b'A', 0x00, 0x00];
        assert_eq!(decode_text_frame(&payload).unwrap(), "ĀA");
    }

    #[test_log::test]
    fn utf8_keeps_first_value_only() {
        let payload = b"\x03Rock\x00Pop\x00";
        assert_eq!(decode_text_frame(payload).unwrap(), "Rock");

        let payload = "\x03Björk".as_bytes();
        assert_eq!(decode_text_frame(payload).unwrap(), "Björk");
    }

    #[test_log::test]
    fn empty_payloads() {
        assert_eq!(decode_text_frame(&[]).unwrap(), "");
        assert_eq!(decode_text_frame(&[0x00]).unwrap(), "");
        assert_eq!(decode_text_frame(&[0x01]).unwrap(), "");
    }

    #[test_log::test]
    fn unknown_encoding_is_an_error() {
        assert!(matches!(
            decode_text_frame(b"\x04abc"),
            Err(Id3Error::UnsupportedEncoding(4))
        ));
    }
}
