//! Weapon record.
//!
//! # Responsibility
//! - Define the weapon wire shape, including the server-owned `created_at`.
//! - Generate integer ids that do not collide for adds made close together.
//!
//! # Invariants
//! - `created_at` is only ever populated from backend responses.
//! - Generated ids are positive and fit in 53 bits.

use crate::model::record::{
    normalize_optional_text, require_text, Record, RecordKind, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const GENERATED_ID_MASK: u128 = (1 << 53) - 1;

/// Integer identifier of a weapon row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeaponId(i64);

impl WeaponId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Draws 53 random bits from a v4 UUID.
    pub fn generate() -> Self {
        let bits = Uuid::new_v4().as_u128() & GENERATED_ID_MASK;
        // Zero is the only value the mask can produce that is not positive.
        Self(i64::try_from(bits).unwrap_or(1).max(1))
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Display for WeaponId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for WeaponId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// One weapon entry of the remote `weapons` collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Weapon {
    pub id: WeaponId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caliber: Option<String>,
    /// Assigned by the backend. Omitted from request bodies while unset so
    /// the column default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Weapon {
    /// Creates a weapon with a generated id and no server timestamp.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WeaponId::generate(),
            name: name.into(),
            year: None,
            country: None,
            caliber: None,
            created_at: None,
        }
    }
}

impl Record for Weapon {
    type Id = WeaponId;

    const KIND: RecordKind = RecordKind::Weapon;

    fn id(&self) -> &WeaponId {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::KIND, "name", &self.name)
    }
}

/// User input for adding a weapon, as collected by the add form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewWeapon {
    pub name: String,
    pub year: Option<i32>,
    pub country: Option<String>,
    pub caliber: Option<String>,
}

impl NewWeapon {
    /// Builds a request from raw form fields.
    ///
    /// Blank optional fields become `None`; a year that is not a number is
    /// dropped rather than rejected.
    pub fn from_form(name: &str, year_text: &str, country: &str, caliber: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            year: parse_year_text(year_text),
            country: normalize_optional_text(Some(country.to_string())),
            caliber: normalize_optional_text(Some(caliber.to_string())),
        }
    }

    pub fn into_weapon(self) -> Weapon {
        let mut weapon = Weapon::new(self.name.trim());
        weapon.year = self.year;
        weapon.country = normalize_optional_text(self.country);
        weapon.caliber = normalize_optional_text(self.caliber);
        weapon
    }
}

fn parse_year_text(value: &str) -> Option<i32> {
    value.trim().parse().ok()
}
