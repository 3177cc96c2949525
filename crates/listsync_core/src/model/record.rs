//! Shared record contract.
//!
//! # Responsibility
//! - Describe what repositories and stores need from a synchronized record.
//! - Carry validation failures with a stable, UI-presentable message.
//!
//! # Invariants
//! - `Record::id()` is stable for the whole lifetime of a record.
//! - `Record::validate()` is pure and cheap; it never touches the network.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Record family handled by one repository/store pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Song,
    Weapon,
}

impl RecordKind {
    /// Stable lowercase label used in logs and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Song => "song",
            Self::Weapon => "weapon",
        }
    }

    /// Remote collection name used when no override is configured.
    pub fn default_collection(self) -> &'static str {
        match self {
            Self::Song => "songs",
            Self::Weapon => "weapons",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record synchronized against one remote REST collection.
pub trait Record:
    Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Identifier used as the unique key in stores and as the delete filter.
    type Id: Debug + Clone + PartialEq + Display + Send + Sync + 'static;

    const KIND: RecordKind;

    fn id(&self) -> &Self::Id;

    /// Checks field-level invariants shared by read and write paths.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace only.
    BlankField {
        kind: RecordKind,
        field: &'static str,
    },
    /// Song rating outside `1..=5`.
    RatingOutOfRange(u8),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { kind, field } => {
                write!(f, "{kind} field `{field}` must not be blank")
            }
            Self::RatingOutOfRange(rating) => {
                write!(f, "song rating must be within 1..=5, got {rating}")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    kind: RecordKind,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { kind, field });
    }
    Ok(())
}

/// Trims user input and maps blank text to `None`.
pub(crate) fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{normalize_optional_text, require_text, RecordKind, ValidationError};

    #[test]
    fn require_text_rejects_whitespace_only() {
        let err = require_text(RecordKind::Weapon, "name", "  \t").unwrap_err();
        assert_eq!(
            err,
            ValidationError::BlankField {
                kind: RecordKind::Weapon,
                field: "name",
            }
        );
        assert_eq!(err.to_string(), "weapon field `name` must not be blank");
    }

    #[test]
    fn normalize_optional_text_drops_blank_values() {
        assert_eq!(normalize_optional_text(Some("   ".to_string())), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(
            normalize_optional_text(Some(" USSR ".to_string())).as_deref(),
            Some("USSR")
        );
    }

    #[test]
    fn default_collections_match_backend_tables() {
        assert_eq!(RecordKind::Song.default_collection(), "songs");
        assert_eq!(RecordKind::Weapon.default_collection(), "weapons");
    }
}
