//! Weapon-specific store entry points.

use crate::config::BackendConfig;
use crate::model::weapon::{NewWeapon, Weapon};
use crate::repo::HttpWeaponRepository;
use crate::store::record_store::{RecordStore, StoreResult};

impl RecordStore<Weapon> {
    /// Creates a weapon store talking to the configured backend.
    pub fn connect(config: &BackendConfig) -> Self {
        Self::from_repository(HttpWeaponRepository::new(config))
    }

    /// Builds a weapon from form input, creates it, and returns it.
    ///
    /// The returned weapon has no `created_at`; it is filled in by the next
    /// `load`.
    pub fn add_new(&self, request: NewWeapon) -> StoreResult<Weapon> {
        let weapon = request.into_weapon();
        self.add(weapon.clone())?;
        Ok(weapon)
    }
}
