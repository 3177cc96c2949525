//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the song and weapon list screens' use-cases to Dart via FRB.
//! - Translate core results into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Backend settings are configured once per process; stores are shared
//!   by every call after that.
//! - Calls that reach the network are not `sync` and run on FRB's worker
//!   pool, never on the UI isolate.

use listsync_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ApiKeyPlacement,
    BackendConfig, NewSong, NewWeapon, Song, SongId, SongStore, StoreError, Weapon, WeaponId,
    WeaponStore,
};
use log::info;
use std::sync::OnceLock;

static BACKEND: OnceLock<Backend> = OnceLock::new();

struct Backend {
    config: BackendConfig,
    songs: SongStore,
    weapons: WeaponStore,
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Configures the backend used by every song and weapon call.
///
/// Input semantics:
/// - `project_url`: absolute http(s) project URL.
/// - `api_key`: non-blank anonymous API key.
/// - `api_key_placement`: `query` (default) or `header`.
///
/// # FFI contract
/// - Sync call, no network traffic.
/// - Repeating the call with identical settings is a no-op.
/// - Different settings after the first success are rejected.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_backend(
    project_url: String,
    api_key: String,
    api_key_placement: Option<String>,
) -> String {
    let config = match build_config(&project_url, &api_key, api_key_placement.as_deref()) {
        Ok(config) => config,
        Err(err) => return format!("configure_backend failed: {err}"),
    };

    let active = BACKEND.get_or_init(|| {
        info!(
            "event=backend_configure module=ffi status=ok project_url={}",
            config.project_url()
        );
        Backend {
            songs: SongStore::connect(&config),
            weapons: WeaponStore::connect(&config),
            config: config.clone(),
        }
    });

    if active.config == config {
        String::new()
    } else {
        format!(
            "configure_backend failed: backend already configured for {}",
            active.config.project_url()
        )
    }
}

/// Song row as shown by the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongItem {
    /// UUID in hyphenated form.
    pub id: String,
    pub title: String,
    pub singer: String,
    /// 1..=5.
    pub rating: u8,
    pub lyrics: Option<String>,
}

/// Weapon row as shown by the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponItem {
    pub id: i64,
    pub name: String,
    pub year: Option<i32>,
    pub country: Option<String>,
    pub caliber: Option<String>,
    /// Server-assigned timestamp; empty until the weapon has been reloaded.
    pub created_at: Option<String>,
}

/// Song list envelope returned by load and list calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongListResponse {
    /// Whether the call itself succeeded.
    pub ok: bool,
    /// Current local list, also filled on failure.
    pub items: Vec<SongItem>,
    /// `idle|loading|ready|failed`.
    pub load_state: String,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// Weapon list envelope returned by load and list calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponListResponse {
    /// Whether the call itself succeeded.
    pub ok: bool,
    /// Current local list, also filled on failure.
    pub items: Vec<WeaponItem>,
    /// `idle|loading|ready|failed`.
    pub load_state: String,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// Generic action response envelope for add and delete flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Id of the affected record in string form.
    pub record_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, record_id: String) -> Self {
        Self {
            ok: true,
            record_id: Some(record_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record_id: None,
            message: message.into(),
        }
    }
}

/// Fetches all songs and replaces the local list.
///
/// # FFI contract
/// - Async on the Dart side; blocks a worker thread for the request.
/// - On failure the previous list is returned with `ok = false`.
pub fn songs_load() -> SongListResponse {
    let backend = match backend() {
        Ok(backend) => backend,
        Err(message) => return song_list(None, false, message),
    };
    match backend.songs.load() {
        Ok(count) => song_list(Some(&backend.songs), true, format!("Loaded {count} song(s).")),
        Err(err) => song_list(Some(&backend.songs), false, failure("songs_load", &err)),
    }
}

/// Returns the local song list without contacting the backend.
#[flutter_rust_bridge::frb(sync)]
pub fn songs_list() -> SongListResponse {
    match backend() {
        Ok(backend) => song_list(Some(&backend.songs), true, String::new()),
        Err(message) => song_list(None, false, message),
    }
}

/// Creates a song from add-form input and appends it once confirmed.
///
/// # FFI contract
/// - Async on the Dart side; blocks a worker thread for the request.
/// - Blank lyrics are stored as absent.
/// - Returns the generated song id on success.
pub fn songs_add(title: String, singer: String, rating: u8, lyrics: Option<String>) -> ActionResponse {
    let backend = match backend() {
        Ok(backend) => backend,
        Err(message) => return ActionResponse::failure(message),
    };
    let request = NewSong {
        title,
        singer,
        rating,
        lyrics,
    };
    match backend.songs.add_new(request) {
        Ok(song) => ActionResponse::success("Song added.", song.id.to_string()),
        Err(err) => ActionResponse::failure(failure("songs_add", &err)),
    }
}

/// Deletes a song by id and removes it from the local list once confirmed.
pub fn songs_delete(id: String) -> ActionResponse {
    let backend = match backend() {
        Ok(backend) => backend,
        Err(message) => return ActionResponse::failure(message),
    };
    let id = match SongId::parse_str(id.trim()) {
        Ok(id) => id,
        Err(err) => {
            return ActionResponse::failure(format!("songs_delete failed: invalid song id: {err}"))
        }
    };
    match backend.songs.delete_by_id(&id) {
        Ok(()) => ActionResponse::success("Song deleted.", id.to_string()),
        Err(err) => ActionResponse::failure(failure("songs_delete", &err)),
    }
}

/// Fetches all weapons and replaces the local list.
///
/// # FFI contract
/// - Async on the Dart side; blocks a worker thread for the request.
/// - On failure the previous list is returned with `ok = false`.
pub fn weapons_load() -> WeaponListResponse {
    let backend = match backend() {
        Ok(backend) => backend,
        Err(message) => return weapon_list(None, false, message),
    };
    match backend.weapons.load() {
        Ok(count) => weapon_list(
            Some(&backend.weapons),
            true,
            format!("Loaded {count} weapon(s)."),
        ),
        Err(err) => weapon_list(Some(&backend.weapons), false, failure("weapons_load", &err)),
    }
}

/// Returns the local weapon list without contacting the backend.
#[flutter_rust_bridge::frb(sync)]
pub fn weapons_list() -> WeaponListResponse {
    match backend() {
        Ok(backend) => weapon_list(Some(&backend.weapons), true, String::new()),
        Err(message) => weapon_list(None, false, message),
    }
}

/// Creates a weapon from add-form text fields and appends it once confirmed.
///
/// Input semantics:
/// - `year_text`: integer text; blank or non-numeric means no year.
/// - Blank `country` / `caliber` are stored as absent.
pub fn weapons_add(
    name: String,
    year_text: String,
    country: String,
    caliber: String,
) -> ActionResponse {
    let backend = match backend() {
        Ok(backend) => backend,
        Err(message) => return ActionResponse::failure(message),
    };
    let request = NewWeapon::from_form(&name, &year_text, &country, &caliber);
    match backend.weapons.add_new(request) {
        Ok(weapon) => ActionResponse::success("Weapon added.", weapon.id.to_string()),
        Err(err) => ActionResponse::failure(failure("weapons_add", &err)),
    }
}

/// Deletes a weapon by id and removes it from the local list once confirmed.
pub fn weapons_delete(id: i64) -> ActionResponse {
    let backend = match backend() {
        Ok(backend) => backend,
        Err(message) => return ActionResponse::failure(message),
    };
    let id = WeaponId::new(id);
    match backend.weapons.delete_by_id(&id) {
        Ok(()) => ActionResponse::success("Weapon deleted.", id.to_string()),
        Err(err) => ActionResponse::failure(failure("weapons_delete", &err)),
    }
}

fn build_config(
    project_url: &str,
    api_key: &str,
    api_key_placement: Option<&str>,
) -> Result<BackendConfig, String> {
    let mut config = BackendConfig::new(project_url, api_key).map_err(|err| err.to_string())?;
    if let Some(raw) = api_key_placement.filter(|raw| !raw.trim().is_empty()) {
        let placement = ApiKeyPlacement::parse(raw).map_err(|err| err.to_string())?;
        config = config.with_api_key_placement(placement);
    }
    Ok(config)
}

fn backend() -> Result<&'static Backend, String> {
    BACKEND
        .get()
        .ok_or_else(|| "backend is not configured; call configure_backend first".to_string())
}

fn failure(operation: &str, err: &StoreError) -> String {
    format!("{operation} failed: {err}")
}

fn song_list(store: Option<&SongStore>, ok: bool, message: String) -> SongListResponse {
    match store {
        Some(store) => {
            let snapshot = store.snapshot();
            SongListResponse {
                ok,
                items: snapshot.records.into_iter().map(to_song_item).collect(),
                load_state: snapshot.load_state.as_str().to_string(),
                message,
            }
        }
        None => SongListResponse {
            ok,
            items: Vec::new(),
            load_state: "idle".to_string(),
            message,
        },
    }
}

fn weapon_list(store: Option<&WeaponStore>, ok: bool, message: String) -> WeaponListResponse {
    match store {
        Some(store) => {
            let snapshot = store.snapshot();
            WeaponListResponse {
                ok,
                items: snapshot.records.into_iter().map(to_weapon_item).collect(),
                load_state: snapshot.load_state.as_str().to_string(),
                message,
            }
        }
        None => WeaponListResponse {
            ok,
            items: Vec::new(),
            load_state: "idle".to_string(),
            message,
        },
    }
}

fn to_song_item(song: Song) -> SongItem {
    SongItem {
        id: song.id.to_string(),
        title: song.title,
        singer: song.singer,
        rating: song.rating,
        lyrics: song.lyrics,
    }
}

fn to_weapon_item(weapon: Weapon) -> WeaponItem {
    WeaponItem {
        id: weapon.id.get(),
        name: weapon.name,
        year: weapon.year,
        country: weapon.country,
        caliber: weapon.caliber,
        created_at: weapon.created_at,
    }
}
