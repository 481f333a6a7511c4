// Error types for tag parsing

use std::io;

/// Alias for `Result<T, Id3Error>`
pub type Result<T> = std::result::Result<T, Id3Error>;

/// Errors that can arise while reading ID3 tags
#[derive(Debug, thiserror::Error)]
pub enum Id3Error {
    /// Neither an ID3v1 nor an ID3v2 tag was found
    #[error("no id3 tags")]
    NoTagFound,
    /// An ID3v2 marker was found, but the header around it is unusable
    #[error("malformed ID3v2 header: {0}")]
    MalformedHeader(&'static str),
    /// The underlying stream failed
    #[error("failed to read stream: {0}")]
    StreamRead(#[from] io::Error),
    /// A text frame declared an encoding byte outside 0..=3
    ///
    /// This never reaches callers of the top-level entry points, it only
    /// causes the affected field to stay empty.
    #[error("unsupported text encoding {0:#04x}")]
    UnsupportedEncoding(u8),
}
