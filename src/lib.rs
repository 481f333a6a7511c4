//! id3meta - read the common metadata fields of MP3 files
//!
//! Instead of exposing every ID3 frame, this crate reads the ID3v2 header and a
//! handful of fields: name, artist, album, year, track, disc, genre and length.
//!
//! ```no_run
//! let file = id3meta::read_from_path("song.mp3")?;
//! println!("{} - {}", file.artist, file.name);
//! # Ok::<(), id3meta::Id3Error>(())
//! ```

use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use serde::Serialize;

pub mod detect;
pub mod error;
pub mod field_mapping;
pub mod id3;
pub mod utils;

pub use detect::TagLayout;
pub use error::{Id3Error, Result};
pub use field_mapping::Field;
pub use id3::{Id3v1Tag, Id3v2Tag, TagFlags, TagHeader};

/// A parsed ID3 file with common fields exposed
///
/// Fields that were not found are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct File {
    /// The ID3v2 header, absent when the fields came from an ID3v1 tag
    pub header: Option<TagHeader>,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub track: String,
    pub disc: String,
    pub genre: String,
    pub length: String,
}

impl File {
    /// Get a field by name
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Artist => &self.artist,
            Field::Album => &self.album,
            Field::Year => &self.year,
            Field::Track => &self.track,
            Field::Disc => &self.disc,
            Field::Genre => &self.genre,
            Field::Length => &self.length,
        }
    }

    pub(crate) fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Artist => &mut self.artist,
            Field::Album => &mut self.album,
            Field::Year => &mut self.year,
            Field::Track => &mut self.track,
            Field::Disc => &mut self.disc,
            Field::Genre => &mut self.genre,
            Field::Length => &mut self.length,
        };
        *slot = value;
    }
}

/// Parse a forward-only stream for ID3 information
///
/// Only a leading ID3v2 tag can be found without seeking, ID3v1 and appended
/// ID3v2 tags are not supported here. Fails with [`Id3Error::NoTagFound`] when
/// the stream does not start with "ID3".
pub fn read<R: Read>(reader: R) -> Result<File> {
    let (layout, mut stream) = detect::peek(reader)?;
    if !layout.has_id3v2() {
        return Err(Id3Error::NoTagFound);
    }

    Ok(Id3v2Tag::read(&mut stream)?.into_file())
}

/// Parse a seekable stream for ID3 information
///
/// A trailing ID3v1 tag is preferred, a leading ID3v2 tag is the fallback.
pub fn read_seekable<R: Read + Seek>(mut reader: R) -> Result<File> {
    let layout = detect::detect(&mut reader)?;
    log::debug!("Stream carries {}", layout);

    if layout.has_id3v1() {
        if let Some(tag) = Id3v1Tag::read(&mut reader)? {
            return Ok(tag.into());
        }
    }

    if layout.has_id3v2() {
        reader.seek(SeekFrom::Start(0))?;
        return Ok(Id3v2Tag::read(&mut reader)?.into_file());
    }

    Err(Id3Error::NoTagFound)
}

/// Open a file and parse it with [`read_seekable`]
pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<File> {
    let file = std::fs::File::open(path)?;
    read_seekable(BufReader::new(file))
}
