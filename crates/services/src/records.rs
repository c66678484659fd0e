//! # Record operations
//!
//! Create / update / delete / list for sightings and harvests. Each call maps
//! to one store transaction; the service itself holds no state besides the
//! port handles.

use std::sync::Arc;

use domains::{
    Animal, AnimalRepo, AppError, FieldMap, Harvest, HarvestDetails, HarvestRepo, ListQuery,
    Listing, PhotoStore, PhotoUpload, RecordId, RecordKind, Result, Saved, Sighting,
    SightingDetails, SightingRepo, StoredPhoto, DEFAULT_HARVEST_MARKER_COLOR,
};

use crate::internal;

pub struct RecordService {
    animals: Arc<dyn AnimalRepo>,
    sightings: Arc<dyn SightingRepo>,
    harvests: Arc<dyn HarvestRepo>,
    photos: Arc<dyn PhotoStore>,
}

impl RecordService {
    pub fn new(
        animals: Arc<dyn AnimalRepo>,
        sightings: Arc<dyn SightingRepo>,
        harvests: Arc<dyn HarvestRepo>,
        photos: Arc<dyn PhotoStore>,
    ) -> Self {
        Self {
            animals,
            sightings,
            harvests,
            photos,
        }
    }

    pub fn photo_url(&self, filename: &str) -> String {
        self.photos.photo_url(filename)
    }

    // ── Sightings ───────────────────────────────────────────────────────────

    #[tracing::instrument(skip(self))]
    pub async fn list_sightings(&self, query: &ListQuery) -> Result<Listing<Sighting>> {
        let records = self.sightings.list_sightings(query).await.map_err(internal)?;
        let animals = self.sightings.sighting_animal_names().await.map_err(internal)?;
        Ok(listing(records, query, animals))
    }

    pub async fn get_sighting(&self, id: RecordId) -> Result<Sighting> {
        self.sightings
            .get_sighting(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AppError::not_found(RecordKind::Sighting.as_str(), id))
    }

    #[tracing::instrument(skip(self, fields, photo))]
    pub async fn create_sighting(
        &self,
        fields: &FieldMap,
        photo: Option<PhotoUpload>,
    ) -> Result<Saved> {
        let animal = self.resolve_animal(fields).await?;
        let mut details = sighting_details(fields);
        let (stored, upload_failure) = self.store_photo(photo).await;
        details.photo_filename = stored.as_ref().map(|p| p.filename.clone());

        let inserted = self.sightings.insert_sighting(animal.id, &details).await;
        let id = self.settle(inserted, &stored).await?;
        tracing::info!(id, animal = %animal.name, "sighting created");
        Ok(Saved { id, upload_failure })
    }

    #[tracing::instrument(skip(self, fields, photo))]
    pub async fn update_sighting(
        &self,
        id: RecordId,
        fields: &FieldMap,
        photo: Option<PhotoUpload>,
    ) -> Result<Saved> {
        let existing = self.get_sighting(id).await?;
        let animal = self.resolve_animal(fields).await?;
        let mut details = sighting_details(fields);
        let (stored, upload_failure) = self.store_photo(photo).await;
        details.photo_filename = stored
            .as_ref()
            .map(|p| p.filename.clone())
            .or(existing.details.photo_filename);

        let updated = self.sightings.update_sighting(id, animal.id, &details).await;
        if !self.settle(updated, &stored).await? {
            self.discard_unsaved(&stored).await;
            return Err(AppError::not_found(RecordKind::Sighting.as_str(), id));
        }
        tracing::info!(id, "sighting updated");
        Ok(Saved { id, upload_failure })
    }

    pub async fn delete_sighting(&self, id: RecordId) -> Result<()> {
        if self.sightings.delete_sighting(id).await.map_err(internal)? {
            tracing::info!(id, "sighting deleted");
            Ok(())
        } else {
            Err(AppError::not_found(RecordKind::Sighting.as_str(), id))
        }
    }

    /// Deletes every listed sighting that exists; unknown ids are skipped.
    pub async fn delete_sightings(&self, ids: &[RecordId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let deleted = self.sightings.delete_sightings(ids).await.map_err(internal)?;
        tracing::info!(requested = ids.len(), deleted, "sightings batch-deleted");
        Ok(deleted)
    }

    // ── Harvests ────────────────────────────────────────────────────────────

    #[tracing::instrument(skip(self))]
    pub async fn list_harvests(&self, query: &ListQuery) -> Result<Listing<Harvest>> {
        let records = self.harvests.list_harvests(query).await.map_err(internal)?;
        let animals = self.harvests.harvest_animal_names().await.map_err(internal)?;
        Ok(listing(records, query, animals))
    }

    pub async fn get_harvest(&self, id: RecordId) -> Result<Harvest> {
        self.harvests
            .get_harvest(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| AppError::not_found(RecordKind::Harvest.as_str(), id))
    }

    #[tracing::instrument(skip(self, fields, photo))]
    pub async fn create_harvest(
        &self,
        fields: &FieldMap,
        photo: Option<PhotoUpload>,
    ) -> Result<Saved> {
        let animal = self.resolve_animal(fields).await?;
        let mut details = harvest_details(fields)?;
        let (stored, upload_failure) = self.store_photo(photo).await;
        details.photo_filename = stored.as_ref().map(|p| p.filename.clone());

        let inserted = self.harvests.insert_harvest(animal.id, &details).await;
        let id = self.settle(inserted, &stored).await?;
        tracing::info!(id, animal = %animal.name, "harvest created");
        Ok(Saved { id, upload_failure })
    }

    #[tracing::instrument(skip(self, fields, photo))]
    pub async fn update_harvest(
        &self,
        id: RecordId,
        fields: &FieldMap,
        photo: Option<PhotoUpload>,
    ) -> Result<Saved> {
        let existing = self.get_harvest(id).await?;
        let animal = self.resolve_animal(fields).await?;
        let mut details = harvest_details(fields)?;
        let (stored, upload_failure) = self.store_photo(photo).await;
        details.photo_filename = stored
            .as_ref()
            .map(|p| p.filename.clone())
            .or(existing.details.photo_filename);

        let updated = self.harvests.update_harvest(id, animal.id, &details).await;
        if !self.settle(updated, &stored).await? {
            self.discard_unsaved(&stored).await;
            return Err(AppError::not_found(RecordKind::Harvest.as_str(), id));
        }
        tracing::info!(id, "harvest updated");
        Ok(Saved { id, upload_failure })
    }

    pub async fn delete_harvest(&self, id: RecordId) -> Result<()> {
        if self.harvests.delete_harvest(id).await.map_err(internal)? {
            tracing::info!(id, "harvest deleted");
            Ok(())
        } else {
            Err(AppError::not_found(RecordKind::Harvest.as_str(), id))
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────────────

    /// Looks the submitted animal up in the registry, not the taxonomy.
    async fn resolve_animal(&self, fields: &FieldMap) -> Result<Animal> {
        let name = fields.text("animal").unwrap_or_default();
        let found = self
            .animals
            .find_animal_by_name(&name)
            .await
            .map_err(internal)?;
        found.ok_or(AppError::UnknownAnimal(name))
    }

    /// Saves the photo if one was supplied. A failed save is reported back
    /// instead of failing the whole submission.
    async fn store_photo(&self, photo: Option<PhotoUpload>) -> (Option<StoredPhoto>, Option<String>) {
        let Some(upload) = photo else {
            return (None, None);
        };
        let original = upload.file_name.clone();
        match self.photos.save_photo(upload).await {
            Ok(stored) => (Some(stored), None),
            Err(err) => {
                let failure = AppError::UploadFailure(err.to_string());
                tracing::warn!(file = %original, error = %failure, "photo not stored");
                (None, Some(failure.to_string()))
            }
        }
    }

    /// Passes a store result through, discarding the photo written for this
    /// submission when the record itself was not saved.
    async fn settle<T>(&self, result: anyhow::Result<T>, stored: &Option<StoredPhoto>) -> Result<T> {
        if result.is_err() {
            self.discard_unsaved(stored).await;
        }
        result.map_err(internal)
    }

    /// Files that were already on disk before this submission may belong to
    /// another record and are left alone.
    async fn discard_unsaved(&self, stored: &Option<StoredPhoto>) {
        let Some(photo) = stored.as_ref().filter(|p| p.fresh) else {
            return;
        };
        if let Err(err) = self.photos.discard_photo(&photo.filename).await {
            tracing::warn!(file = %photo.filename, error = %err, "orphaned photo not removed");
        }
    }
}

fn listing<T>(records: Vec<T>, query: &ListQuery, animals: Vec<String>) -> Listing<T> {
    Listing {
        records,
        animal_filter: query.animal.clone(),
        sort: query.sort,
        animals,
    }
}

fn sighting_details(fields: &FieldMap) -> SightingDetails {
    SightingDetails {
        sighting_name: fields.text("sighting_name"),
        date_time: fields.timestamp("date_time"),
        weather: fields.text("weather"),
        wind: fields.text("wind"),
        wind_speed: fields.text("wind_speed"),
        wind_direction: fields.text("wind_direction"),
        humidity: fields.text("humidity"),
        temperature: fields.text("temperature"),
        location: fields.text("location"),
        notes: fields.text("notes"),
        marker_color: fields.text("marker_color"),
        lat: fields.number("lat"),
        lng: fields.number("lng"),
        photo_filename: None,
    }
}

fn harvest_details(fields: &FieldMap) -> Result<HarvestDetails> {
    let harvest_name = fields
        .text("harvest_name")
        .ok_or_else(|| AppError::ValidationError("harvest_name is required".into()))?;
    Ok(HarvestDetails {
        harvest_name,
        date_time: fields.timestamp("date_time"),
        weather: fields.text("weather"),
        wind_speed: fields.text("wind_speed"),
        wind_direction: fields.text("wind_direction"),
        humidity: fields.text("humidity"),
        weapon_type: fields.text("weapon_type"),
        other_weapon_type: fields.text("other_weapon_type"),
        caliber: fields.text("caliber"),
        other_caliber: fields.text("other_caliber"),
        broadhead: fields.text("broadhead"),
        other_broadhead: fields.text("other_broadhead"),
        location: fields.text("location"),
        shot_lat: fields.number("shot_lat"),
        shot_lng: fields.number("shot_lng"),
        recovery_lat: fields.number("recovery_lat"),
        recovery_lng: fields.number("recovery_lng"),
        distance_traveled: fields.number("distance_traveled"),
        notes: fields.text("notes"),
        marker_color: Some(
            fields
                .text("marker_color")
                .unwrap_or_else(|| DEFAULT_HARVEST_MARKER_COLOR.to_string()),
        ),
        photo_filename: None,
    })
}
