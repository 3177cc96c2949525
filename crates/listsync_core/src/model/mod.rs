//! Domain records mirrored from the remote collections.
//!
//! # Responsibility
//! - Define the song and weapon records and their wire shape.
//! - Provide the shared `Record` contract used by repositories and stores.
//!
//! # Invariants
//! - Every record is identified by a client-generated id that never changes.
//! - Server-assigned fields (`created_at`) are never produced by the client.

pub mod record;
pub mod song;
pub mod weapon;
