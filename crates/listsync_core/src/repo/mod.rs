//! Repository contracts and remote/in-memory implementations.
//!
//! # Responsibility
//! - Define one data access contract shared by song and weapon records.
//! - Keep HTTP and wire encoding details away from stores.
//!
//! # Invariants
//! - Write paths call `Record::validate()` before any request is sent.
//! - Read paths reject invalid remote rows instead of masking them.
//! - Every failure is returned as a typed `RepoError`; nothing panics.

pub mod http_repo;
pub mod memory_repo;
pub mod record_repo;

use crate::model::song::Song;
use crate::model::weapon::Weapon;

pub type HttpSongRepository = http_repo::HttpRecordRepository<Song>;
pub type HttpWeaponRepository = http_repo::HttpRecordRepository<Weapon>;
pub type InMemorySongRepository = memory_repo::InMemoryRecordRepository<Song>;
pub type InMemoryWeaponRepository = memory_repo::InMemoryRecordRepository<Weapon>;
