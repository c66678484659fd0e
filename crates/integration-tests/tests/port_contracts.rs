//! The SQLite adapter seen only through the domain ports.

use std::sync::Arc;

use domains::taxonomy::AnimalCategory;
use domains::{AnimalRepo, HarvestDetails, HarvestRepo, ListQuery, SightingDetails, SightingRepo};
use storage_adapters::SqliteStore;

async fn ports() -> (Arc<dyn AnimalRepo>, Arc<dyn SightingRepo>, Arc<dyn HarvestRepo>) {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    (store.clone(), store.clone(), store)
}

#[tokio::test]
async fn animal_names_are_unique_and_case_sensitive() {
    let (animals, _, _) = ports().await;
    assert!(animals.insert_animal_if_absent("Elk", AnimalCategory::BigGame).await.unwrap());
    assert!(!animals.insert_animal_if_absent("Elk", AnimalCategory::SmallGame).await.unwrap());

    let elk = animals.find_animal_by_name("Elk").await.unwrap().unwrap();
    assert_eq!(elk.category, AnimalCategory::BigGame);
    assert!(animals.find_animal_by_name("ELK").await.unwrap().is_none());
}

#[tokio::test]
async fn missing_ids_report_false_or_none() {
    let (animals, sightings, harvests) = ports().await;
    animals.insert_animal_if_absent("Moose", AnimalCategory::BigGame).await.unwrap();
    let moose = animals.find_animal_by_name("Moose").await.unwrap().unwrap();

    assert!(sightings.get_sighting(1).await.unwrap().is_none());
    assert!(!sightings
        .update_sighting(1, moose.id, &SightingDetails::default())
        .await
        .unwrap());
    assert!(!sightings.delete_sighting(1).await.unwrap());
    assert_eq!(sightings.delete_sightings(&[1, 2, 3]).await.unwrap(), 0);

    assert!(harvests.get_harvest(1).await.unwrap().is_none());
    assert!(!harvests.delete_harvest(1).await.unwrap());
}

#[tokio::test]
async fn records_referencing_an_animal_block_nothing_else() {
    let (animals, sightings, harvests) = ports().await;
    animals.insert_animal_if_absent("Teal", AnimalCategory::Waterfowl).await.unwrap();
    let teal = animals.find_animal_by_name("Teal").await.unwrap().unwrap();

    let sighting = sightings
        .insert_sighting(teal.id, &SightingDetails::default())
        .await
        .unwrap();
    let harvest = harvests
        .insert_harvest(
            teal.id,
            &HarvestDetails {
                harvest_name: "Limit of teal".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(sightings.sighting_animal_names().await.unwrap(), vec!["Teal".to_string()]);
    assert_eq!(harvests.harvest_animal_names().await.unwrap(), vec!["Teal".to_string()]);

    assert!(sightings.delete_sighting(sighting).await.unwrap());
    assert!(harvests.get_harvest(harvest).await.unwrap().is_some());
    assert!(sightings.list_sightings(&ListQuery::default()).await.unwrap().is_empty());
    assert!(sightings.sighting_animal_names().await.unwrap().is_empty());
}
