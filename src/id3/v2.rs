// ID3v2 tag implementation

use std::collections::HashSet;
use std::io::{self, Read};

use serde::Serialize;

use super::frames::{Frame, FrameIter, Id3v2Version};
use crate::error::{Id3Error, Result};
use crate::field_mapping::Field;
use crate::utils::encoding::decode_text_frame;
use crate::utils::io::{read_up_to, resynchronize, synchsafe_u32};
use crate::File;

/// Flags that apply to the entire tag
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct TagFlags {
    pub unsynchronized: bool,
    pub has_extended_header: bool,
    pub experimental: bool,
    /// ID3v2.4 only
    pub has_footer: bool,
    /// ID3v2.2 only, the tag body uses an undefined compression scheme
    pub compressed: bool,
}

impl TagFlags {
    fn parse(version: Id3v2Version, flags: u8) -> Self {
        let unsynchronized = flags & 0x80 != 0;
        match version {
            Id3v2Version::V2 => TagFlags {
                unsynchronized,
                compressed: flags & 0x40 != 0,
                ..TagFlags::default()
            },
            Id3v2Version::V3 | Id3v2Version::V4 => TagFlags {
                unsynchronized,
                has_extended_header: flags & 0x40 != 0,
                experimental: flags & 0x20 != 0,
                has_footer: version == Id3v2Version::V4 && flags & 0x10 != 0,
                compressed: false,
            },
        }
    }
}

/// ID3v2 header structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub flags: TagFlags,
    /// Size of the tag body, excluding this header and any footer
    pub size: u32,
    #[serde(skip)]
    version: Id3v2Version,
}

impl TagHeader {
    pub const HEADER_SIZE: usize = 10;
    const ID: [u8; 3] = *b"ID3";

    /// Read ID3v2 header from reader
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buffer = [0u8; Self::HEADER_SIZE];
        let len = read_up_to(reader, &mut buffer)?;

        if len < Self::ID.len() || buffer[..3] != Self::ID {
            return Err(Id3Error::MalformedHeader("not an ID3v2 tag"));
        }
        if len == Self::ID.len() {
            return Err(Id3Error::MalformedHeader("truncated header"));
        }
        if len < Self::HEADER_SIZE {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }

        Self::parse(&buffer)
    }

    /// Parse the fixed 10 byte header
    pub fn parse(buffer: &[u8; 10]) -> Result<Self> {
        if buffer[..3] != Self::ID {
            return Err(Id3Error::MalformedHeader("not an ID3v2 tag"));
        }

        let (version_major, version_minor) = (buffer[3], buffer[4]);
        if version_major == 0xFF || version_minor == 0xFF {
            return Err(Id3Error::MalformedHeader("invalid version"));
        }

        let version = Id3v2Version::from_major(version_major)
            .ok_or(Id3Error::MalformedHeader("unsupported version"))?;

        Ok(TagHeader {
            version_major,
            version_minor,
            flags: TagFlags::parse(version, buffer[5]),
            size: synchsafe_u32([buffer[6], buffer[7], buffer[8], buffer[9]]),
            version,
        })
    }

    pub fn version(&self) -> Id3v2Version {
        self.version
    }

    /// Length of the extended header at the start of `body`, or 0 if there is none
    fn extended_header_len(&self, body: &[u8]) -> Result<usize> {
        if !self.flags.has_extended_header {
            return Ok(0);
        }

        let size_bytes: [u8; 4] = body
            .get(..4)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(Id3Error::MalformedHeader("bad extended header size"))?;

        // ID3v2.3 excludes the size field itself, ID3v2.4 counts it and makes it synchsafe
        let len = match self.version {
            Id3v2Version::V4 => synchsafe_u32(size_bytes) as usize,
            _ => u32::from_be_bytes(size_bytes) as usize + 4,
        };

        if len < 6 || len > body.len() {
            return Err(Id3Error::MalformedHeader("bad extended header size"));
        }

        Ok(len)
    }
}

/// ID3v2 tag structure
#[derive(Debug)]
pub struct Id3v2Tag {
    pub header: TagHeader,
    body: Vec<u8>,
    frames_start: usize,
}

impl Id3v2Tag {
    /// Read ID3v2 tag from reader
    ///
    /// The reader must be positioned at the "ID3" marker. Exactly the header and
    /// the declared body are consumed.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let header = TagHeader::read(reader)?;
        log::debug!(
            "Parsing ID3v2.{}.{} tag, {} bytes",
            header.version_major,
            header.version_minor,
            header.size
        );

        let mut body = Vec::new();
        reader
            .by_ref()
            .take(u64::from(header.size))
            .read_to_end(&mut body)?;

        if body.len() < header.size as usize {
            log::warn!(
                "Tag body truncated, expected {} bytes but got {}",
                header.size,
                body.len()
            );
        }

        // ID3v2.4 frame sizes are synchsafe, so the body is left alone and each
        // frame is resynchronised on its own (see `frames`)
        if header.flags.unsynchronized && header.version != Id3v2Version::V4 {
            body = resynchronize(&body);
        }

        let frames_start = header.extended_header_len(&body)?;

        Ok(Id3v2Tag {
            header,
            body,
            frames_start,
        })
    }

    /// Iterate over the frames in the tag
    ///
    /// In an ID3v2.4 tag, the tag-level unsynchronisation flag marks every frame
    /// as unsynchronised.
    pub fn frames(&self) -> impl Iterator<Item = Frame<'_>> + '_ {
        let unsynchronised =
            self.header.version == Id3v2Version::V4 && self.header.flags.unsynchronized;

        FrameIter::new(&self.body[self.frames_start..], self.header.version).map(
            move |mut frame| {
                frame.header.flags.unsynchronised |= unsynchronised;
                frame
            },
        )
    }

    /// Fold the recognized frames into a [`File`]
    ///
    /// The first frame for each field wins. Frames that fail to decode are skipped.
    pub fn into_file(self) -> File {
        let mut file = File {
            header: Some(self.header),
            ..File::default()
        };

        if self.header.flags.compressed {
            log::debug!("ID3v2.2 tag is compressed, not decoding frames");
            return file;
        }

        let mut seen = HashSet::new();
        for (field, value) in self.frames().filter_map(|frame| decode_field(&frame)) {
            if seen.insert(field) {
                file.set(field, value);
            }

            if seen.len() == Field::ALL.len() {
                break;
            }
        }

        file
    }
}

fn decode_field(frame: &Frame<'_>) -> Option<(Field, String)> {
    let field = Field::from_frame_id(&frame.header.id)?;

    let Some(content) = frame.content() else {
        log::debug!("Skipping compressed or encrypted frame {}", frame.header.id);
        return None;
    };

    match decode_text_frame(&content) {
        Ok(value) => Some((field, value)),
        Err(e) => {
            log::debug!("Skipping frame {}: {}", frame.header.id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tag(major: u8, flags: u8, body: &[u8]) -> Vec<u8> {
        let mut data = vec![b'I', b'D', b'3', major, 0, flags];
        data.extend_from_slice(&crate::utils::io::to_synchsafe_u32(body.len() as u32));
        data.extend_from_slice(body);
        data
    }

    fn v3_frame(id: &str, payload: &[u8]) -> Vec<u8> {
        let mut frame = id.as_bytes().to_vec();
        frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        frame.extend_from_slice(&[0, 0]);
        frame.extend_from_slice(payload);
        frame
    }

    #[test_log::test]
    fn header_fields() {
        let header = TagHeader::parse(b"ID3\x04\x00\xD0\x00\x00\x02\x01").unwrap();
        assert_eq!(header.version_major, 4);
        assert_eq!(header.version_minor, 0);
        assert_eq!(header.size, 257);
        assert_eq!(header.version(), Id3v2Version::V4);
        assert_eq!(
            header.flags,
            TagFlags {
                unsynchronized: true,
                has_extended_header: true,
                experimental: false,
                has_footer: true,
                compressed: false,
            }
        );
    }

    #[test_log::test]
    fn header_serializes_raw_version_bytes() {
        let header = TagHeader::parse(b"ID3\x03\x01\x00\x00\x00\x00\x0A").unwrap();
        let value = serde_json::to_value(header).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["flags", "size", "version_major", "version_minor"]);
        assert_eq!(value["version_minor"], 1);
    }

    #[test_log::test]
    fn v3_has_no_footer() {
        let header = TagHeader::parse(b"ID3\x03\x00\x10\x00\x00\x00\x00").unwrap();
        assert!(!header.flags.has_footer);
    }

    #[test_log::test]
    fn invalid_headers() {
        assert!(matches!(
            TagHeader::parse(b"TAG\x03\x00\x00\x00\x00\x00\x00"),
            Err(Id3Error::MalformedHeader("not an ID3v2 tag"))
        ));
        assert!(matches!(
            TagHeader::parse(b"ID3\xFF\x00\x00\x00\x00\x00\x00"),
            Err(Id3Error::MalformedHeader("invalid version"))
        ));
        assert!(matches!(
            TagHeader::parse(b"ID3\x03\xFF\x00\x00\x00\x00\x00"),
            Err(Id3Error::MalformedHeader("invalid version"))
        ));
        assert!(matches!(
            TagHeader::parse(b"ID3\x05\x00\x00\x00\x00\x00\x00"),
            Err(Id3Error::MalformedHeader("unsupported version"))
        ));
    }

    #[test_log::test]
    fn marker_then_eof() {
        let result = TagHeader::read(&mut Cursor::new(b"ID3"));
        assert!(matches!(
            result,
            Err(Id3Error::MalformedHeader("truncated header"))
        ));
    }

    #[test_log::test]
    fn header_cut_short_is_a_read_failure() {
        for data in [&b"ID3\x04"[..], &b"ID3\x03\x00\x00\x00\x00\x00"[..]] {
            match TagHeader::read(&mut Cursor::new(data)) {
                Err(Id3Error::StreamRead(e)) => {
                    assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof)
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[test_log::test]
    fn first_frame_wins() {
        let mut body = v3_frame("TIT2", b"\x00First\x00");
        body.extend(v3_frame("TIT2", b"\x00Second\x00"));
        body.extend(v3_frame("TYER", b"\x001999"));
        body.extend(v3_frame("TDRC", b"\x002001"));

        let file = Id3v2Tag::read(&mut Cursor::new(tag(3, 0, &body)))
            .unwrap()
            .into_file();
        assert_eq!(file.name, "First");
        assert_eq!(file.year, "1999");
    }

    #[test_log::test]
    fn bad_encoding_degrades_one_field() {
        let mut body = v3_frame("TIT2", b"\x09Broken");
        body.extend(v3_frame("TIT2", b"\x00Fixed"));
        body.extend(v3_frame("TPE1", b"\x00Artist"));

        let file = Id3v2Tag::read(&mut Cursor::new(tag(3, 0, &body)))
            .unwrap()
            .into_file();
        assert_eq!(file.name, "Fixed");
        assert_eq!(file.artist, "Artist");
    }

    #[test_log::test]
    fn extended_header_is_skipped() {
        // ID3v2.3 extended header: size 6 (excluding itself), flags, padding size
        let mut body = vec![0, 0, 0, 6, 0, 0, 0, 0, 0, 0];
        body.extend(v3_frame("TALB", b"\x00Album"));

        let file = Id3v2Tag::read(&mut Cursor::new(tag(3, 0x40, &body)))
            .unwrap()
            .into_file();
        assert_eq!(file.album, "Album");
    }

    #[test_log::test]
    fn v4_extended_header_counts_itself() {
        let mut body = vec![0, 0, 0, 6, 1, 0];
        body.extend(v3_frame("TCON", b"\x03Jazz"));

        let file = Id3v2Tag::read(&mut Cursor::new(tag(4, 0x40, &body)))
            .unwrap()
            .into_file();
        assert_eq!(file.genre, "Jazz");
    }

    #[test_log::test]
    fn bad_extended_header() {
        let body = vec![0, 0, 0, 0x40, 0, 0];
        let result = Id3v2Tag::read(&mut Cursor::new(tag(3, 0x40, &body)));
        assert!(matches!(
            result,
            Err(Id3Error::MalformedHeader("bad extended header size"))
        ));
    }

    #[test_log::test]
    fn unsynchronised_v3_body() {
        // The 0xFF in the payload was stuffed with a 0x00 when written
        let mut payload = b"\x00A\xFF\x00".to_vec();
        let frame_size = payload.len() as u32 - 1;
        let mut body = b"TIT2".to_vec();
        body.extend_from_slice(&frame_size.to_be_bytes());
        body.extend_from_slice(&[0, 0]);
        body.append(&mut payload);

        let file = Id3v2Tag::read(&mut Cursor::new(tag(3, 0x80, &body)))
            .unwrap()
            .into_file();
        assert_eq!(file.name, "A\u{FF}");
    }

    #[test_log::test]
    fn unsynchronised_v4_tag_applies_to_every_frame() {
        // UTF-16 "Hi" with its FF FE byte order mark stuffed as FF 00 FE
        let body = v3_frame("TIT2", b"\x01\xFF\x00\xFEH\x00i\x00");

        let tag = Id3v2Tag::read(&mut Cursor::new(tag(4, 0x80, &body))).unwrap();
        assert!(tag.frames().all(|frame| frame.header.flags.unsynchronised));
        assert_eq!(tag.into_file().name, "Hi");
    }

    #[test_log::test]
    fn compressed_v2_tag_is_not_decoded() {
        let body = b"TT2\x00\x00\x03\x00Hi".to_vec();
        let file = Id3v2Tag::read(&mut Cursor::new(tag(2, 0x40, &body)))
            .unwrap()
            .into_file();
        assert!(file.header.unwrap().flags.compressed);
        assert_eq!(file.name, "");
    }

    #[test_log::test]
    fn truncated_body_keeps_complete_frames() {
        let mut data = tag(3, 0, &v3_frame("TIT2", b"\x00Song"));
        // Claim a larger body than what follows
        data[9] = 0x7F;

        let file = Id3v2Tag::read(&mut Cursor::new(data)).unwrap().into_file();
        assert_eq!(file.name, "Song");
    }

    #[test_log::test]
    fn reads_only_the_tag() {
        let mut data = tag(3, 0, &v3_frame("TIT2", b"\x00Song"));
        data.extend_from_slice(b"\xFF\xFBaudio");

        let mut cursor = Cursor::new(data);
        Id3v2Tag::read(&mut cursor).unwrap();

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"\xFF\xFBaudio");
    }
}
