// Stream classification: which tags does a stream carry?

use std::fmt;
use std::io::{self, Chain, Cursor, Read, Seek, SeekFrom};

use serde::Serialize;

use crate::id3::{Id3v1Tag, TagHeader};
use crate::utils::io::read_up_to;

const ID3V2_MARKER: &[u8; 3] = b"ID3";

/// The tags found in a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagLayout {
    Id3v2,
    Id3v1,
    Both,
    Neither,
}

impl TagLayout {
    fn from_presence(id3v1: bool, id3v2: bool) -> Self {
        match (id3v1, id3v2) {
            (true, true) => TagLayout::Both,
            (true, false) => TagLayout::Id3v1,
            (false, true) => TagLayout::Id3v2,
            (false, false) => TagLayout::Neither,
        }
    }

    pub fn has_id3v1(self) -> bool {
        matches!(self, TagLayout::Id3v1 | TagLayout::Both)
    }

    pub fn has_id3v2(self) -> bool {
        matches!(self, TagLayout::Id3v2 | TagLayout::Both)
    }
}

impl fmt::Display for TagLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagLayout::Id3v2 => write!(f, "ID3v2"),
            TagLayout::Id3v1 => write!(f, "ID3v1"),
            TagLayout::Both => write!(f, "ID3v1 + ID3v2"),
            TagLayout::Neither => write!(f, "no tags"),
        }
    }
}

/// Classify a seekable stream by its leading and trailing markers
///
/// The stream is left positioned at its start.
pub fn detect<R: Read + Seek>(reader: &mut R) -> io::Result<TagLayout> {
    reader.seek(SeekFrom::Start(0))?;
    let mut marker = [0u8; 3];
    let id3v2 = read_up_to(reader, &mut marker)? == marker.len() && marker == *ID3V2_MARKER;

    let stream_len = reader.seek(SeekFrom::End(0))?;
    let id3v1 = if stream_len >= Id3v1Tag::TAG_SIZE as u64 {
        reader.seek(SeekFrom::End(-(Id3v1Tag::TAG_SIZE as i64)))?;
        read_up_to(reader, &mut marker)? == marker.len() && marker == Id3v1Tag::TAG_ID
    } else {
        false
    };

    reader.seek(SeekFrom::Start(0))?;
    Ok(TagLayout::from_presence(id3v1, id3v2))
}

/// Classify a forward-only stream by peeking at its first bytes
///
/// Only an ID3v2 tag can be detected this way. The returned reader yields the
/// peeked bytes again, followed by the rest of the stream.
pub fn peek<R: Read>(mut reader: R) -> io::Result<(TagLayout, Chain<Cursor<Vec<u8>>, R>)> {
    let mut marker = [0u8; 3];
    let len = read_up_to(&mut reader, &mut marker)?;
    let peeked = marker[..len].to_vec();

    let layout = if peeked == ID3V2_MARKER {
        TagLayout::Id3v2
    } else {
        TagLayout::Neither
    };

    Ok((layout, Cursor::new(peeked).chain(reader)))
}

/// The size of the leading ID3v2 tag including its header, if there is one
///
/// Useful to find where the audio data starts. The stream is left positioned at its start.
pub fn id3v2_len<R: Read + Seek>(reader: &mut R) -> io::Result<Option<u64>> {
    reader.seek(SeekFrom::Start(0))?;
    let mut buffer = [0u8; TagHeader::HEADER_SIZE];
    let len = read_up_to(reader, &mut buffer)?;
    reader.seek(SeekFrom::Start(0))?;

    if len < TagHeader::HEADER_SIZE {
        return Ok(None);
    }

    Ok(TagHeader::parse(&buffer).ok().map(|header| {
        let footer = if header.flags.has_footer { 10 } else { 0 };
        TagHeader::HEADER_SIZE as u64 + u64::from(header.size) + footer
    }))
}
