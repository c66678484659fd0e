//! # Ports
//!
//! Any adapter must implement these traits to be used by the binary.

use async_trait::async_trait;

use crate::models::{
    Animal, Harvest, HarvestDetails, ListQuery, PhotoUpload, RecordId, Sighting, SightingDetails,
    StoredPhoto,
};
use crate::taxonomy::AnimalCategory;

/// Persistence contract for the animal registry.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AnimalRepo: Send + Sync {
    /// Exact, case-sensitive lookup by name.
    async fn find_animal_by_name(&self, name: &str) -> anyhow::Result<Option<Animal>>;

    /// Inserts the animal unless a row with that name already exists.
    /// Returns `true` when a row was inserted.
    async fn insert_animal_if_absent(
        &self,
        name: &str,
        category: AnimalCategory,
    ) -> anyhow::Result<bool>;

    async fn list_animals(&self) -> anyhow::Result<Vec<Animal>>;
}

/// Persistence contract for sightings.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SightingRepo: Send + Sync {
    async fn insert_sighting(
        &self,
        animal_id: i64,
        details: &SightingDetails,
    ) -> anyhow::Result<RecordId>;

    async fn get_sighting(&self, id: RecordId) -> anyhow::Result<Option<Sighting>>;

    /// Replaces every mutable column. Returns `false` if the row is gone.
    async fn update_sighting(
        &self,
        id: RecordId,
        animal_id: i64,
        details: &SightingDetails,
    ) -> anyhow::Result<bool>;

    /// Returns `false` if there was nothing to delete.
    async fn delete_sighting(&self, id: RecordId) -> anyhow::Result<bool>;

    /// Deletes whichever of `ids` exist, committing once. Returns the count.
    async fn delete_sightings(&self, ids: &[RecordId]) -> anyhow::Result<u64>;

    async fn list_sightings(&self, query: &ListQuery) -> anyhow::Result<Vec<Sighting>>;

    /// Distinct names of animals referenced by at least one sighting, alphabetical.
    async fn sighting_animal_names(&self) -> anyhow::Result<Vec<String>>;
}

/// Persistence contract for harvests.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait HarvestRepo: Send + Sync {
    async fn insert_harvest(
        &self,
        animal_id: i64,
        details: &HarvestDetails,
    ) -> anyhow::Result<RecordId>;

    async fn get_harvest(&self, id: RecordId) -> anyhow::Result<Option<Harvest>>;

    async fn update_harvest(
        &self,
        id: RecordId,
        animal_id: i64,
        details: &HarvestDetails,
    ) -> anyhow::Result<bool>;

    async fn delete_harvest(&self, id: RecordId) -> anyhow::Result<bool>;

    async fn list_harvests(&self, query: &ListQuery) -> anyhow::Result<Vec<Harvest>>;

    async fn harvest_animal_names(&self) -> anyhow::Result<Vec<String>>;
}

/// Storage contract for uploaded photos.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Saves the upload and returns the stored filename for the record.
    async fn save_photo(&self, upload: PhotoUpload) -> anyhow::Result<StoredPhoto>;

    /// Removes a stored photo. Removing a file that is already gone is not an
    /// error.
    async fn discard_photo(&self, filename: &str) -> anyhow::Result<()>;

    /// Public URL of a stored photo.
    fn photo_url(&self, filename: &str) -> String;
}
