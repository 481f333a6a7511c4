// Mapping between ID3v2 frame identifiers and the common fields
//
// Each ID3v2 generation names its text frames differently:
// - ID3v2.2: three character ids (TT2, TP1, TAL, etc.)
// - ID3v2.3/2.4: four character ids (TIT2, TPE1, TALB, etc.)
//
// Both sets resolve to the same `Field`, so the tag parser never has to
// care which version it is folding.

/// The fields exposed on a parsed [`File`](crate::File)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Artist,
    Album,
    Year,
    Track,
    Disc,
    Genre,
    Length,
}

impl Field {
    /// Every field, in output order
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::Artist,
        Field::Album,
        Field::Year,
        Field::Track,
        Field::Disc,
        Field::Genre,
        Field::Length,
    ];

    /// Resolve a frame id of any ID3v2 version
    pub fn from_frame_id(frame_id: &str) -> Option<Self> {
        match frame_id {
            FieldMappings::V3_NAME | FieldMappings::V2_NAME => Some(Field::Name),
            FieldMappings::V3_ARTIST | FieldMappings::V2_ARTIST => Some(Field::Artist),
            FieldMappings::V3_ALBUM | FieldMappings::V2_ALBUM => Some(Field::Album),
            FieldMappings::V3_YEAR | FieldMappings::V4_RECORDING_TIME | FieldMappings::V2_YEAR => {
                Some(Field::Year)
            }
            FieldMappings::V3_TRACK | FieldMappings::V2_TRACK => Some(Field::Track),
            FieldMappings::V3_DISC | FieldMappings::V2_DISC => Some(Field::Disc),
            FieldMappings::V3_GENRE | FieldMappings::V2_GENRE => Some(Field::Genre),
            FieldMappings::V3_LENGTH | FieldMappings::V2_LENGTH => Some(Field::Length),
            _ => None,
        }
    }
}

/// Frame ids of the text frames backing each field
pub struct FieldMappings;

impl FieldMappings {
    // ID3v2.3/2.4 frame IDs
    pub const V3_NAME: &'static str = "TIT2";
    pub const V3_ARTIST: &'static str = "TPE1";
    pub const V3_ALBUM: &'static str = "TALB";
    pub const V3_YEAR: &'static str = "TYER";
    pub const V4_RECORDING_TIME: &'static str = "TDRC";
    pub const V3_TRACK: &'static str = "TRCK";
    pub const V3_DISC: &'static str = "TPOS";
    pub const V3_GENRE: &'static str = "TCON";
    pub const V3_LENGTH: &'static str = "TLEN";

    // ID3v2.2 frame IDs
    pub const V2_NAME: &'static str = "TT2";
    pub const V2_ARTIST: &'static str = "TP1";
    pub const V2_ALBUM: &'static str = "TAL";
    pub const V2_YEAR: &'static str = "TYE";
    pub const V2_TRACK: &'static str = "TRK";
    pub const V2_DISC: &'static str = "TPA";
    pub const V2_GENRE: &'static str = "TCO";
    pub const V2_LENGTH: &'static str = "TLE";
}
