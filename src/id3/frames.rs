// ID3v2 frame headers and the lazy frame iterator

use std::borrow::Cow;
use std::iter::FusedIterator;

use crate::utils::io::{be_u24, resynchronize, synchsafe_u32};

/// The ID3v2 version, which decides the frame header layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Id3v2Version {
    /// ID3v2.2: 3 byte ids, 24-bit plain sizes, no flags
    V2,
    /// ID3v2.3: 4 byte ids, 32-bit plain sizes, 2 flag bytes
    V3,
    /// ID3v2.4: 4 byte ids, 32-bit synchsafe sizes, 2 flag bytes
    V4,
}

impl Id3v2Version {
    pub fn from_major(major: u8) -> Option<Self> {
        match major {
            2 => Some(Id3v2Version::V2),
            3 => Some(Id3v2Version::V3),
            4 => Some(Id3v2Version::V4),
            _ => None,
        }
    }

    /// Size of a frame header in bytes
    pub fn frame_header_len(self) -> usize {
        match self {
            Id3v2Version::V2 => 6,
            Id3v2Version::V3 | Id3v2Version::V4 => 10,
        }
    }

    /// Length of a frame id in bytes
    pub fn frame_id_len(self) -> usize {
        match self {
            Id3v2Version::V2 => 3,
            Id3v2Version::V3 | Id3v2Version::V4 => 4,
        }
    }

    /// Decode the size field that directly follows the frame id
    fn frame_size(self, bytes: &[u8]) -> u32 {
        match self {
            Id3v2Version::V2 => be_u24([bytes[0], bytes[1], bytes[2]]),
            Id3v2Version::V3 => u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            Id3v2Version::V4 => synchsafe_u32([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }
}

/// The frame format flags that matter for reading
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct FrameFlags {
    pub compressed: bool,
    pub encrypted: bool,
    /// A group identifier byte precedes the content
    pub grouped: bool,
    /// ID3v2.4 only, the content is unsynchronised
    pub unsynchronised: bool,
    /// ID3v2.4 only, a synchsafe 4 byte length precedes the content
    pub data_length_indicator: bool,
}

impl FrameFlags {
    fn parse(version: Id3v2Version, flags: u16) -> Self {
        match version {
            Id3v2Version::V2 => FrameFlags::default(),
            Id3v2Version::V3 => FrameFlags {
                compressed: flags & 0x0080 != 0,
                encrypted: flags & 0x0040 != 0,
                grouped: flags & 0x0020 != 0,
                ..FrameFlags::default()
            },
            Id3v2Version::V4 => FrameFlags {
                grouped: flags & 0x0040 != 0,
                compressed: flags & 0x0008 != 0,
                encrypted: flags & 0x0004 != 0,
                unsynchronised: flags & 0x0002 != 0,
                data_length_indicator: flags & 0x0001 != 0,
            },
        }
    }
}

/// A single frame header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub id: String,
    /// Payload size as declared in the header
    pub size: u32,
    pub flags: FrameFlags,
}

impl FrameHeader {
    /// Parse a frame header from the start of `data`
    ///
    /// Returns `None` when `data` is too short to hold a header, or when the id
    /// is not made of uppercase ASCII letters and digits (usually padding).
    pub fn parse(data: &[u8], version: Id3v2Version) -> Option<Self> {
        let header = data.get(..version.frame_header_len())?;
        let (id, rest) = header.split_at(version.frame_id_len());

        if !id.iter().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
            return None;
        }

        let flags = match version {
            Id3v2Version::V2 => 0,
            Id3v2Version::V3 | Id3v2Version::V4 => u16::from_be_bytes([rest[4], rest[5]]),
        };

        Some(FrameHeader {
            // Checked above, every byte is ASCII
            id: id.iter().copied().map(char::from).collect(),
            size: version.frame_size(rest),
            flags: FrameFlags::parse(version, flags),
        })
    }
}

/// A frame header paired with its raw payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    pub header: FrameHeader,
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// The payload with format-flag prefixes removed
    ///
    /// Returns `None` for compressed or encrypted frames, which are not decoded.
    pub fn content(&self) -> Option<Cow<'a, [u8]>> {
        let flags = self.header.flags;
        if flags.compressed || flags.encrypted {
            return None;
        }

        let mut content = self.payload;
        if flags.grouped {
            content = content.get(1..)?;
        }
        if flags.data_length_indicator {
            content = content.get(4..)?;
        }

        if flags.unsynchronised {
            Some(Cow::Owned(resynchronize(content)))
        } else {
            Some(Cow::Borrowed(content))
        }
    }
}

/// Walks the frames of a tag body one at a time
///
/// Iteration ends at the first padding byte, the first invalid frame id, or the
/// first frame whose declared size runs past the end of the body.
#[derive(Debug, Clone)]
pub struct FrameIter<'a> {
    data: &'a [u8],
    version: Id3v2Version,
}

impl<'a> FrameIter<'a> {
    pub fn new(data: &'a [u8], version: Id3v2Version) -> Self {
        Self { data, version }
    }

    fn finish(&mut self) -> Option<Frame<'a>> {
        self.data = &[];
        None
    }
}

impl<'a> Iterator for FrameIter<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(header) = FrameHeader::parse(self.data, self.version) else {
            return self.finish();
        };

        let rest = &self.data[self.version.frame_header_len()..];
        let size = header.size as usize;
        if size > rest.len() {
            log::warn!(
                "Frame {} declares {} bytes but only {} remain, stopping",
                header.id,
                size,
                rest.len()
            );
            return self.finish();
        }

        let (payload, rest) = rest.split_at(size);
        self.data = rest;

        Some(Frame { header, payload })
    }
}

impl FusedIterator for FrameIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn v2_header() {
        let data = b"TT2\x00\x00\x05\x00Song";
        let header = FrameHeader::parse(data, Id3v2Version::V2).unwrap();
        assert_eq!(header.id, "TT2");
        assert_eq!(header.size, 5);
        assert_eq!(header.flags, FrameFlags::default());
    }

    #[test_log::test]
    fn v3_size_is_plain() {
        let data = b"TIT2\x00\x00\x01\x00\x00\x00";
        let header = FrameHeader::parse(data, Id3v2Version::V3).unwrap();
        assert_eq!(header.size, 256);
    }

    #[test_log::test]
    fn v4_size_is_synchsafe() {
        let data = b"TIT2\x00\x00\x01\x00\x00\x00";
        let header = FrameHeader::parse(data, Id3v2Version::V4).unwrap();
        assert_eq!(header.size, 128);
    }

    #[test_log::test]
    fn padding_is_not_a_frame() {
        assert_eq!(FrameHeader::parse(&[0; 10], Id3v2Version::V3), None);
        assert_eq!(FrameHeader::parse(b"tit2\x00\x00\x00\x01\x00\x00", Id3v2Version::V3), None);
        assert_eq!(FrameHeader::parse(b"TIT2\x00", Id3v2Version::V3), None);
    }

    #[test_log::test]
    fn flags_per_version() {
        let v3 = FrameHeader::parse(b"TIT2\x00\x00\x00\x00\x00\xC0", Id3v2Version::V3).unwrap();
        assert!(v3.flags.compressed && v3.flags.encrypted);

        let v4 = FrameHeader::parse(b"TIT2\x00\x00\x00\x00\x00\x43", Id3v2Version::V4).unwrap();
        assert!(v4.flags.grouped && v4.flags.unsynchronised && v4.flags.data_length_indicator);
        assert!(!v4.flags.compressed && !v4.flags.encrypted);
    }

    #[test_log::test]
    fn iterates_until_padding() {
        let mut body = Vec::new();
        body.extend_from_slice(b"TIT2\x00\x00\x00\x03\x00\x00\x00Hi");
        body.extend_from_slice(b"TLEN\x00\x00\x00\x00\x00\x00");
        body.extend_from_slice(&[0; 16]);

        let frames: Vec<_> = FrameIter::new(&body, Id3v2Version::V3).collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].header.id, "TIT2");
        assert_eq!(frames[0].payload, b"\x00Hi");
        // Zero sized frames are still yielded
        assert_eq!(frames[1].header.id, "TLEN");
        assert!(frames[1].payload.is_empty());
    }

    #[test_log::test]
    fn oversized_frame_ends_iteration() {
        let mut body = Vec::new();
        body.extend_from_slice(b"TIT2\x00\x00\x00\x03\x00\x00\x00Hi");
        body.extend_from_slice(b"TPE1\x00\x00\x01\x00\x00\x00\x00Artist");

        let mut frames = FrameIter::new(&body, Id3v2Version::V3);
        assert!(frames.next().is_some());
        assert!(frames.next().is_none());
        assert!(frames.next().is_none());
    }

    #[test_log::test]
    fn corrupted_synchsafe_size_is_deterministic() {
        // 0x85 is not synchsafe, the high bit is ignored and the size reads as 5
        let body = b"TIT2\x00\x00\x00\x85\x00\x00\x00Song";
        let frame = FrameIter::new(body, Id3v2Version::V4).next().unwrap();
        assert_eq!(frame.header.size, 5);
        assert_eq!(frame.payload, b"\x00Song");

        // The same bytes with a larger size now run past the body
        let body = b"TIT2\x00\x00\x01\x85\x00\x00\x00Song";
        assert!(FrameIter::new(body, Id3v2Version::V4).next().is_none());
    }

    #[test_log::test]
    fn content_strips_prefixes() {
        let header = FrameHeader {
            id: String::from("TIT2"),
            size: 0,
            flags: FrameFlags {
                grouped: true,
                data_length_indicator: true,
                unsynchronised: true,
                ..FrameFlags::default()
            },
        };
        let payload = [0x01, 0x00, 0x00, 0x00, 0x03, 0x00, 0xFF, 0x00, b'x'];
        let frame = Frame {
            header,
            payload: &payload,
        };
        assert_eq!(frame.content().unwrap().as_ref(), [0x00, 0xFF, b'x']);
    }

    #[test_log::test]
    fn compressed_frames_have_no_content() {
        let header = FrameHeader {
            id: String::from("TIT2"),
            size: 3,
            flags: FrameFlags {
                compressed: true,
                ..FrameFlags::default()
            },
        };
        let frame = Frame {
            header,
            payload: b"\x00Hi",
        };
        assert!(frame.content().is_none());
    }
}
