//! Song record.
//!
//! # Invariants
//! - `id` is a random UUID generated on the client and never reassigned.
//! - `rating` stays within `1..=5`.

use crate::model::record::{
    normalize_optional_text, require_text, Record, RecordKind, ValidationError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SongId = Uuid;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// One song entry of the remote `songs` collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub singer: String,
    /// Preference score, `1..=5`.
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
}

impl Song {
    /// Creates a song with a freshly generated id.
    pub fn new(
        title: impl Into<String>,
        singer: impl Into<String>,
        rating: u8,
        lyrics: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            singer: singer.into(),
            rating,
            lyrics,
        }
    }
}

impl Record for Song {
    type Id = SongId;

    const KIND: RecordKind = RecordKind::Song;

    fn id(&self) -> &SongId {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::KIND, "title", &self.title)?;
        require_text(Self::KIND, "singer", &self.singer)?;
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::RatingOutOfRange(self.rating));
        }
        Ok(())
    }
}

/// User input for adding a song, as collected by the add form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSong {
    pub title: String,
    pub singer: String,
    pub rating: u8,
    pub lyrics: Option<String>,
}

impl NewSong {
    /// Builds the record to send: trimmed text, blank lyrics dropped, new id.
    pub fn into_song(self) -> Song {
        Song::new(
            self.title.trim(),
            self.singer.trim(),
            self.rating,
            normalize_optional_text(self.lyrics),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{NewSong, Song};
    use crate::model::record::{Record, ValidationError};
    use serde_json::json;

    #[test]
    fn new_song_normalizes_form_input() {
        let song = NewSong {
            title: "  Spring Day ".to_string(),
            singer: "BTS".to_string(),
            rating: 5,
            lyrics: Some("   ".to_string()),
        }
        .into_song();

        assert_eq!(song.title, "Spring Day");
        assert_eq!(song.lyrics, None);
        assert!(song.validate().is_ok());
    }

    #[test]
    fn validate_rejects_rating_outside_picker_range() {
        let song = Song::new("t", "s", 0, None);
        assert_eq!(
            song.validate().unwrap_err(),
            ValidationError::RatingOutOfRange(0)
        );
        assert!(Song::new("t", "s", 6, None).validate().is_err());
    }

    #[test]
    fn decodes_uppercase_uuid_and_missing_lyrics() {
        let value = json!({
            "id": "E621E1F8-C36C-495A-93FC-0C247A3E6E5F",
            "title": "Hype Boy",
            "singer": "NewJeans",
            "rating": 4
        });
        let song: Song = serde_json::from_value(value).unwrap();
        assert_eq!(
            song.id.to_string(),
            "e621e1f8-c36c-495a-93fc-0c247a3e6e5f"
        );
        assert_eq!(song.lyrics, None);
    }

    #[test]
    fn wire_roundtrip_preserves_all_fields() {
        let song = Song::new("Title", "Singer", 3, Some("la la".to_string()));
        let encoded = serde_json::to_string(&song).unwrap();
        let decoded: Song = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, song);
    }
}
