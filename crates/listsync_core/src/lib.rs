//! Core synchronization logic for the song and weapon lists.
//! UI layers (FFI, CLI) only talk to the stores exported here.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use config::{ApiKeyPlacement, BackendConfig, ConfigError, ConfigResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::record::{Record, RecordKind, ValidationError};
pub use model::song::{NewSong, Song, SongId};
pub use model::weapon::{NewWeapon, Weapon, WeaponId};
pub use repo::http_repo::HttpRecordRepository;
pub use repo::memory_repo::InMemoryRecordRepository;
pub use repo::record_repo::{RecordRepository, RepoError, RepoOperation, RepoResult};
pub use repo::{
    HttpSongRepository, HttpWeaponRepository, InMemorySongRepository, InMemoryWeaponRepository,
};
pub use store::diagnostics::Diagnostic;
pub use store::record_store::{
    LoadState, RecordStore, StoreError, StoreOperation, StoreResult, StoreSnapshot,
};
pub use store::{SongStore, WeaponStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
