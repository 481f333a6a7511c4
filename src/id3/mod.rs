// ID3 metadata handling module
pub mod frames;
pub mod genres;
pub mod v1;
pub mod v2;

pub use frames::{Frame, FrameHeader, FrameIter, Id3v2Version};
pub use v1::Id3v1Tag;
pub use v2::{Id3v2Tag, TagFlags, TagHeader};
