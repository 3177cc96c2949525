//! View-model stores consumed by the presentation layer.
//!
//! # Responsibility
//! - Own the in-memory lists rendered by the song and weapon screens.
//! - Orchestrate repository calls into load/add/delete use-cases.
//!
//! # Invariants
//! - Stores are the only writers of their lists.
//! - Store APIs never bypass repository validation.

pub mod diagnostics;
pub mod record_store;
pub mod song_store;
pub mod weapon_store;

use crate::model::song::Song;
use crate::model::weapon::Weapon;

pub type SongStore = record_store::RecordStore<Song>;
pub type WeaponStore = record_store::RecordStore<Weapon>;
