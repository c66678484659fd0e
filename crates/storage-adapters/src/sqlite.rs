//! # SQLite store
//!
//! Maps the relational schema in `migrations/` onto the `domains` models.
//! Every record read joins its animal so callers never see a bare
//! `animal_id`.

use std::str::FromStr;

use async_trait::async_trait;
use domains::taxonomy::AnimalCategory;
use domains::{
    Animal, AnimalRepo, Harvest, HarvestDetails, HarvestRepo, ListQuery, RecordId, Sighting,
    SightingDetails, SightingRepo, SortOrder,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

const SIGHTING_SELECT: &str = "SELECT s.id, s.sighting_name, s.date_time, s.weather, s.wind, \
     s.wind_speed, s.wind_direction, s.humidity, s.temperature, s.location, s.notes, \
     s.marker_color, s.lat, s.lng, s.photo_filename, \
     a.id AS animal_id, a.name AS animal_name, a.animal_class \
     FROM sighting s JOIN animal a ON a.id = s.animal_id";

const HARVEST_SELECT: &str = "SELECT h.id, h.harvest_name, h.date_time, h.weather, \
     h.wind_speed, h.wind_direction, h.humidity, h.weapon_type, h.other_weapon_type, \
     h.caliber, h.other_caliber, h.broadhead, h.other_broadhead, h.location, \
     h.shot_lat, h.shot_lng, h.recovery_lat, h.recovery_lng, h.distance_traveled, \
     h.notes, h.photo_filename, h.marker_color, \
     a.id AS animal_id, a.name AS animal_name, a.animal_class \
     FROM harvest h JOIN animal a ON a.id = h.animal_id";

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `url` with foreign keys on.
    ///
    /// In-memory databases live as long as their connection, so they get a
    /// single connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await?
        };

        tracing::debug!(url, "sqlite pool ready");
        Ok(Self { pool })
    }

    /// A fresh, migrated in-memory store.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let store = Self::connect("sqlite::memory:", 1).await?;
        store.migrate().await?;
        Ok(store)
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Untimed records go last whichever way the list is sorted; ties fall back
/// to the id in the same direction.
fn order_clause(alias: &str, sort: SortOrder) -> String {
    let direction = match sort {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    format!(
        " ORDER BY {alias}.date_time IS NULL, {alias}.date_time {direction}, {alias}.id {direction}"
    )
}

fn animal_from_row(row: &SqliteRow) -> anyhow::Result<Animal> {
    let class: String = row.try_get("animal_class")?;
    Ok(Animal {
        id: row.try_get("animal_id")?,
        name: row.try_get("animal_name")?,
        category: AnimalCategory::from_str(&class)?,
    })
}

fn sighting_from_row(row: &SqliteRow) -> anyhow::Result<Sighting> {
    Ok(Sighting {
        id: row.try_get("id")?,
        animal: animal_from_row(row)?,
        details: SightingDetails {
            sighting_name: row.try_get("sighting_name")?,
            date_time: row.try_get("date_time")?,
            weather: row.try_get("weather")?,
            wind: row.try_get("wind")?,
            wind_speed: row.try_get("wind_speed")?,
            wind_direction: row.try_get("wind_direction")?,
            humidity: row.try_get("humidity")?,
            temperature: row.try_get("temperature")?,
            location: row.try_get("location")?,
            notes: row.try_get("notes")?,
            marker_color: row.try_get("marker_color")?,
            lat: row.try_get("lat")?,
            lng: row.try_get("lng")?,
            photo_filename: row.try_get("photo_filename")?,
        },
    })
}

fn harvest_from_row(row: &SqliteRow) -> anyhow::Result<Harvest> {
    Ok(Harvest {
        id: row.try_get("id")?,
        animal: animal_from_row(row)?,
        details: HarvestDetails {
            harvest_name: row.try_get("harvest_name")?,
            date_time: row.try_get("date_time")?,
            weather: row.try_get("weather")?,
            wind_speed: row.try_get("wind_speed")?,
            wind_direction: row.try_get("wind_direction")?,
            humidity: row.try_get("humidity")?,
            weapon_type: row.try_get("weapon_type")?,
            other_weapon_type: row.try_get("other_weapon_type")?,
            caliber: row.try_get("caliber")?,
            other_caliber: row.try_get("other_caliber")?,
            broadhead: row.try_get("broadhead")?,
            other_broadhead: row.try_get("other_broadhead")?,
            location: row.try_get("location")?,
            shot_lat: row.try_get("shot_lat")?,
            shot_lng: row.try_get("shot_lng")?,
            recovery_lat: row.try_get("recovery_lat")?,
            recovery_lng: row.try_get("recovery_lng")?,
            distance_traveled: row.try_get("distance_traveled")?,
            notes: row.try_get("notes")?,
            marker_color: row.try_get("marker_color")?,
            photo_filename: row.try_get("photo_filename")?,
        },
    })
}

#[async_trait]
impl AnimalRepo for SqliteStore {
    async fn find_animal_by_name(&self, name: &str) -> anyhow::Result<Option<Animal>> {
        let row = sqlx::query(
            "SELECT id AS animal_id, name AS animal_name, animal_class FROM animal WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(animal_from_row).transpose()
    }

    async fn insert_animal_if_absent(
        &self,
        name: &str,
        category: AnimalCategory,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "INSERT INTO animal (name, animal_class) VALUES (?, ?) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(category.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_animals(&self) -> anyhow::Result<Vec<Animal>> {
        let rows = sqlx::query(
            "SELECT id AS animal_id, name AS animal_name, animal_class FROM animal ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(animal_from_row).collect()
    }
}

#[async_trait]
impl SightingRepo for SqliteStore {
    async fn insert_sighting(
        &self,
        animal_id: i64,
        details: &SightingDetails,
    ) -> anyhow::Result<RecordId> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO sighting (animal_id, sighting_name, date_time, weather, wind, wind_speed, \
             wind_direction, humidity, temperature, location, notes, marker_color, lat, lng, \
             photo_filename) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(animal_id)
        .bind(&details.sighting_name)
        .bind(details.date_time)
        .bind(&details.weather)
        .bind(&details.wind)
        .bind(&details.wind_speed)
        .bind(&details.wind_direction)
        .bind(&details.humidity)
        .bind(&details.temperature)
        .bind(&details.location)
        .bind(&details.notes)
        .bind(&details.marker_color)
        .bind(details.lat)
        .bind(details.lng)
        .bind(&details.photo_filename)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.last_insert_rowid())
    }

    async fn get_sighting(&self, id: RecordId) -> anyhow::Result<Option<Sighting>> {
        let row = sqlx::query(&format!("{SIGHTING_SELECT} WHERE s.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(sighting_from_row).transpose()
    }

    async fn update_sighting(
        &self,
        id: RecordId,
        animal_id: i64,
        details: &SightingDetails,
    ) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE sighting SET animal_id = ?, sighting_name = ?, date_time = ?, weather = ?, \
             wind = ?, wind_speed = ?, wind_direction = ?, humidity = ?, temperature = ?, \
             location = ?, notes = ?, marker_color = ?, lat = ?, lng = ?, photo_filename = ? \
             WHERE id = ?",
        )
        .bind(animal_id)
        .bind(&details.sighting_name)
        .bind(details.date_time)
        .bind(&details.weather)
        .bind(&details.wind)
        .bind(&details.wind_speed)
        .bind(&details.wind_direction)
        .bind(&details.humidity)
        .bind(&details.temperature)
        .bind(&details.location)
        .bind(&details.notes)
        .bind(&details.marker_color)
        .bind(details.lat)
        .bind(details.lng)
        .bind(&details.photo_filename)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_sighting(&self, id: RecordId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM sighting WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_sightings(&self, ids: &[RecordId]) -> anyhow::Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut deleted = 0;
        for id in ids {
            deleted += sqlx::query("DELETE FROM sighting WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;
        Ok(deleted)
    }

    async fn list_sightings(&self, query: &ListQuery) -> anyhow::Result<Vec<Sighting>> {
        let sql = format!(
            "{SIGHTING_SELECT} WHERE (?1 IS NULL OR a.name = ?1){}",
            order_clause("s", query.sort)
        );
        let rows = sqlx::query(&sql)
            .bind(&query.animal)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(sighting_from_row).collect()
    }

    async fn sighting_animal_names(&self) -> anyhow::Result<Vec<String>> {
        let names = sqlx::query_scalar(
            "SELECT DISTINCT a.name FROM sighting s JOIN animal a ON a.id = s.animal_id \
             ORDER BY a.name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}

#[async_trait]
impl HarvestRepo for SqliteStore {
    async fn insert_harvest(
        &self,
        animal_id: i64,
        details: &HarvestDetails,
    ) -> anyhow::Result<RecordId> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO harvest (animal_id, harvest_name, date_time, weather, wind_speed, \
             wind_direction, humidity, weapon_type, other_weapon_type, caliber, other_caliber, \
             broadhead, other_broadhead, location, shot_lat, shot_lng, recovery_lat, \
             recovery_lng, distance_traveled, notes, photo_filename, marker_color) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, \
             COALESCE(?, '#3388ff'))",
        )
        .bind(animal_id)
        .bind(&details.harvest_name)
        .bind(details.date_time)
        .bind(&details.weather)
        .bind(&details.wind_speed)
        .bind(&details.wind_direction)
        .bind(&details.humidity)
        .bind(&details.weapon_type)
        .bind(&details.other_weapon_type)
        .bind(&details.caliber)
        .bind(&details.other_caliber)
        .bind(&details.broadhead)
        .bind(&details.other_broadhead)
        .bind(&details.location)
        .bind(details.shot_lat)
        .bind(details.shot_lng)
        .bind(details.recovery_lat)
        .bind(details.recovery_lng)
        .bind(details.distance_traveled)
        .bind(&details.notes)
        .bind(&details.photo_filename)
        .bind(&details.marker_color)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.last_insert_rowid())
    }

    async fn get_harvest(&self, id: RecordId) -> anyhow::Result<Option<Harvest>> {
        let row = sqlx::query(&format!("{HARVEST_SELECT} WHERE h.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(harvest_from_row).transpose()
    }

    async fn update_harvest(
        &self,
        id: RecordId,
        animal_id: i64,
        details: &HarvestDetails,
    ) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE harvest SET animal_id = ?, harvest_name = ?, date_time = ?, weather = ?, \
             wind_speed = ?, wind_direction = ?, humidity = ?, weapon_type = ?, \
             other_weapon_type = ?, caliber = ?, other_caliber = ?, broadhead = ?, \
             other_broadhead = ?, location = ?, shot_lat = ?, shot_lng = ?, recovery_lat = ?, \
             recovery_lng = ?, distance_traveled = ?, notes = ?, photo_filename = ?, \
             marker_color = COALESCE(?, '#3388ff') WHERE id = ?",
        )
        .bind(animal_id)
        .bind(&details.harvest_name)
        .bind(details.date_time)
        .bind(&details.weather)
        .bind(&details.wind_speed)
        .bind(&details.wind_direction)
        .bind(&details.humidity)
        .bind(&details.weapon_type)
        .bind(&details.other_weapon_type)
        .bind(&details.caliber)
        .bind(&details.other_caliber)
        .bind(&details.broadhead)
        .bind(&details.other_broadhead)
        .bind(&details.location)
        .bind(details.shot_lat)
        .bind(details.shot_lng)
        .bind(details.recovery_lat)
        .bind(details.recovery_lng)
        .bind(details.distance_traveled)
        .bind(&details.notes)
        .bind(&details.photo_filename)
        .bind(&details.marker_color)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_harvest(&self, id: RecordId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM harvest WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_harvests(&self, query: &ListQuery) -> anyhow::Result<Vec<Harvest>> {
        let sql = format!(
            "{HARVEST_SELECT} WHERE (?1 IS NULL OR a.name = ?1){}",
            order_clause("h", query.sort)
        );
        let rows = sqlx::query(&sql)
            .bind(&query.animal)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(harvest_from_row).collect()
    }

    async fn harvest_animal_names(&self) -> anyhow::Result<Vec<String>> {
        let names = sqlx::query_scalar(
            "SELECT DISTINCT a.name FROM harvest h JOIN animal a ON a.id = h.animal_id \
             ORDER BY a.name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    async fn store_with(animals: &[(&str, AnimalCategory)]) -> SqliteStore {
        let store = SqliteStore::in_memory().await.unwrap();
        for (name, category) in animals {
            store.insert_animal_if_absent(name, *category).await.unwrap();
        }
        store
    }

    fn at(y: i32, m: u32, d: u32) -> Option<chrono::NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(6, 30, 0))
    }

    #[tokio::test]
    async fn duplicate_animal_insert_is_ignored() {
        let store = store_with(&[("Elk", AnimalCategory::BigGame)]).await;
        assert!(!store
            .insert_animal_if_absent("Elk", AnimalCategory::BigGame)
            .await
            .unwrap());
        assert_eq!(store.list_animals().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sighting_round_trips_with_its_animal() {
        let store = store_with(&[("Elk", AnimalCategory::BigGame)]).await;
        let elk = store.find_animal_by_name("Elk").await.unwrap().unwrap();
        let details = SightingDetails {
            date_time: at(2024, 9, 14),
            lat: Some(44.42),
            lng: Some(-110.58),
            wind_speed: Some("10 mph".into()),
            ..Default::default()
        };

        let id = store.insert_sighting(elk.id, &details).await.unwrap();
        let loaded = store.get_sighting(id).await.unwrap().unwrap();
        assert_eq!(loaded.animal, elk);
        assert_eq!(loaded.details, details);
    }

    #[tokio::test]
    async fn record_must_reference_a_registered_animal() {
        let store = SqliteStore::in_memory().await.unwrap();
        let result = store.insert_sighting(999, &SightingDetails::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn lookup_is_case_sensitive() {
        let store = store_with(&[("Elk", AnimalCategory::BigGame)]).await;
        assert!(store.find_animal_by_name("elk").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn untimed_records_sort_last_both_ways() {
        let store = store_with(&[("Elk", AnimalCategory::BigGame)]).await;
        for date_time in [at(2024, 1, 1), None, at(2024, 3, 1), at(2024, 2, 1)] {
            let details = SightingDetails {
                date_time,
                ..Default::default()
            };
            store.insert_sighting(1, &details).await.unwrap();
        }

        let months = |records: Vec<Sighting>| -> Vec<Option<u32>> {
            records
                .iter()
                .map(|s| s.details.date_time.map(|dt| chrono::Datelike::month(&dt)))
                .collect()
        };

        let asc = store
            .list_sightings(&ListQuery::from_params(None, Some("asc")))
            .await
            .unwrap();
        assert_eq!(months(asc), vec![Some(1), Some(2), Some(3), None]);

        let desc = store
            .list_sightings(&ListQuery::from_params(None, None))
            .await
            .unwrap();
        assert_eq!(months(desc), vec![Some(3), Some(2), Some(1), None]);
    }

    #[tokio::test]
    async fn harvest_marker_color_defaults_in_the_store() {
        let store = store_with(&[("Moose", AnimalCategory::BigGame)]).await;
        let details = HarvestDetails {
            harvest_name: "Bull moose".into(),
            ..Default::default()
        };
        let id = store.insert_harvest(1, &details).await.unwrap();
        let loaded = store.get_harvest(id).await.unwrap().unwrap();
        assert_eq!(loaded.details.marker_color.as_deref(), Some("#3388ff"));
    }

    #[tokio::test]
    async fn batch_delete_skips_missing_ids() {
        let store = store_with(&[("Elk", AnimalCategory::BigGame)]).await;
        let a = store.insert_sighting(1, &SightingDetails::default()).await.unwrap();
        let b = store.insert_sighting(1, &SightingDetails::default()).await.unwrap();

        assert_eq!(store.delete_sightings(&[a, 4242]).await.unwrap(), 1);
        assert!(store.get_sighting(a).await.unwrap().is_none());
        assert!(store.get_sighting(b).await.unwrap().is_some());
        assert!(!store.delete_sighting(a).await.unwrap());
    }
}
