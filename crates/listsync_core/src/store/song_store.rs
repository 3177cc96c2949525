//! Song-specific store entry points.

use crate::config::BackendConfig;
use crate::model::song::{NewSong, Song};
use crate::repo::HttpSongRepository;
use crate::store::record_store::{RecordStore, StoreResult};

impl RecordStore<Song> {
    /// Creates a song store talking to the configured backend.
    pub fn connect(config: &BackendConfig) -> Self {
        Self::from_repository(HttpSongRepository::new(config))
    }

    /// Builds a song from form input, creates it, and returns it.
    pub fn add_new(&self, request: NewSong) -> StoreResult<Song> {
        let song = request.into_song();
        self.add(song.clone())?;
        Ok(song)
    }
}
