// Byte-level helpers shared by the tag readers

use std::io::{self, Read};

/// Decode a synchsafe 32-bit integer (7 bits per byte)
///
/// The high bit of every byte is masked off, so a corrupted value still
/// decodes deterministically.
pub fn synchsafe_u32(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0, |acc, &b| (acc << 7) | u32::from(b & 0x7F))
}

/// Encode a value below 2^28 as a synchsafe 32-bit integer
pub fn to_synchsafe_u32(value: u32) -> [u8; 4] {
    [
        ((value >> 21) & 0x7F) as u8,
        ((value >> 14) & 0x7F) as u8,
        ((value >> 7) & 0x7F) as u8,
        (value & 0x7F) as u8,
    ]
}

/// Decode a plain big-endian 24-bit integer
pub fn be_u24(bytes: [u8; 3]) -> u32 {
    u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]])
}

/// Read until `buf` is full or the reader is exhausted, returning the number of bytes read
///
/// Unlike `read_exact`, hitting EOF early is not an error.
pub fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Undo unsynchronisation by dropping every `0x00` that directly follows `0xFF`
pub fn resynchronize(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut after_ff = false;
    for &b in data {
        if !(after_ff && b == 0) {
            out.push(b);
        }
        after_ff = b == 0xFF;
    }
    out
}
