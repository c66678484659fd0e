//! Animal registry seeding.

use std::sync::Arc;

use domains::taxonomy;
use domains::{AnimalRepo, Result};

use crate::internal;

pub struct CatalogService {
    animals: Arc<dyn AnimalRepo>,
}

impl CatalogService {
    pub fn new(animals: Arc<dyn AnimalRepo>) -> Self {
        Self { animals }
    }

    /// Makes sure every taxonomy animal has a registry row.
    ///
    /// Idempotent; existing rows are left alone, and rows for animals no
    /// longer in the taxonomy are never removed. Returns how many rows were
    /// inserted.
    #[tracing::instrument(skip(self))]
    pub async fn ensure_seeded(&self) -> Result<usize> {
        let mut inserted = 0;
        for (category, name) in taxonomy::entries() {
            if self
                .animals
                .insert_animal_if_absent(name, category)
                .await
                .map_err(internal)?
            {
                inserted += 1;
            }
        }
        tracing::info!(inserted, "animal registry seeded");
        Ok(inserted)
    }
}
