// ID3v1 tag implementation

use std::io::{Read, Seek, SeekFrom};

use super::genres::genre_name;
use crate::error::{Id3Error, Result};
use crate::utils::encoding::latin1_decode;
use crate::File;

/// ID3v1 tag structure
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Id3v1Tag {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    pub track: Option<u8>,
    pub genre: u8,
}

impl Id3v1Tag {
    pub const TAG_SIZE: usize = 128;
    pub const TAG_ID: [u8; 3] = *b"TAG";

    /// Read ID3v1 tag from the last 128 bytes of a stream
    ///
    /// Returns `None` when the stream is too short or has no "TAG" marker there.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Option<Self>> {
        let stream_len = reader.seek(SeekFrom::End(0))?;
        if stream_len < Self::TAG_SIZE as u64 {
            return Ok(None);
        }

        reader.seek(SeekFrom::End(-(Self::TAG_SIZE as i64)))?;
        let mut buffer = [0u8; Self::TAG_SIZE];
        reader.read_exact(&mut buffer)?;

        if buffer[..3] != Self::TAG_ID {
            return Ok(None);
        }

        Self::parse(&buffer).map(Some)
    }

    /// Parse ID3v1 tag from buffer
    ///
    /// A non-zero byte at offset 125 is taken as the track number, which moves
    /// the genre byte from offset 127 to offset 126.
    pub fn parse(buffer: &[u8; 128]) -> Result<Self> {
        if buffer[..3] != Self::TAG_ID {
            return Err(Id3Error::NoTagFound);
        }

        let (comment, track, genre) = if buffer[125] != 0 {
            (&buffer[97..125], Some(buffer[125]), buffer[126])
        } else {
            (&buffer[97..127], None, buffer[127])
        };

        Ok(Id3v1Tag {
            title: Self::parse_string(&buffer[3..33]),
            artist: Self::parse_string(&buffer[33..63]),
            album: Self::parse_string(&buffer[63..93]),
            year: Self::parse_string(&buffer[93..97]),
            comment: Self::parse_string(comment),
            track,
            genre,
        })
    }

    /// The genre name, or an empty string for an unknown genre byte
    pub fn genre_name(&self) -> &'static str {
        genre_name(self.genre).unwrap_or_default()
    }

    /// Parse a null padded Latin-1 string, trimming trailing spaces
    fn parse_string(bytes: &[u8]) -> String {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        latin1_decode(&bytes[..end]).trim_end_matches(' ').to_string()
    }
}

impl From<Id3v1Tag> for File {
    fn from(tag: Id3v1Tag) -> Self {
        File {
            header: None,
            genre: tag.genre_name().to_string(),
            name: tag.title,
            artist: tag.artist,
            album: tag.album,
            year: tag.year,
            track: tag.track.map(|t| t.to_string()).unwrap_or_default(),
            ..File::default()
        }
    }
}
