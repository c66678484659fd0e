//! Record operations against the real SQLite store.

use domains::{taxonomy, AnimalRepo, AppError, ListQuery, SortOrder};
use integration_tests::{fields, photo, TestApp};
use services::CatalogService;

#[tokio::test]
async fn registry_seeding_is_idempotent() {
    let app = TestApp::new().await;
    let again = CatalogService::new(app.store.clone())
        .ensure_seeded()
        .await
        .unwrap();
    assert_eq!(again, 0);

    let animals = app.store.list_animals().await.unwrap();
    assert_eq!(animals.len(), taxonomy::entries().count());
    let elk = animals.iter().find(|a| a.name == "Elk").unwrap();
    assert_eq!(elk.category, taxonomy::AnimalCategory::BigGame);
}

#[tokio::test]
async fn listing_filters_by_exact_animal_name() {
    let app = TestApp::new().await;
    for animal in ["Elk", "Elk", "Moose"] {
        app.records
            .create_sighting(&fields(&[("animal_category", "Big Game"), ("animal", animal)]), None)
            .await
            .unwrap();
    }

    let elk = app
        .records
        .list_sightings(&ListQuery::from_params(Some("Elk"), None))
        .await
        .unwrap();
    assert_eq!(elk.records.len(), 2);
    assert!(elk.records.iter().all(|s| s.animal.name == "Elk"));
    assert_eq!(elk.animal_filter.as_deref(), Some("Elk"));
    assert_eq!(elk.animals, vec!["Elk".to_string(), "Moose".to_string()]);

    let lowercase = app
        .records
        .list_sightings(&ListQuery::from_params(Some("elk"), None))
        .await
        .unwrap();
    assert!(lowercase.records.is_empty());
}

#[tokio::test]
async fn listing_sorts_by_time_with_untimed_records_last() {
    let app = TestApp::new().await;
    let mut ids = Vec::new();
    for when in ["2024-05-01T06:30", "", "2023-11-12T17:05"] {
        let saved = app
            .records
            .create_sighting(
                &fields(&[("animal_category", "Big Game"), ("animal", "Elk"), ("date_time", when)]),
                None,
            )
            .await
            .unwrap();
        ids.push(saved.id);
    }
    let (may, untimed, november) = (ids[0], ids[1], ids[2]);

    let desc = app.records.list_sightings(&ListQuery::default()).await.unwrap();
    assert_eq!(desc.sort, SortOrder::Desc);
    let order: Vec<_> = desc.records.iter().map(|s| s.id).collect();
    assert_eq!(order, vec![may, november, untimed]);

    let asc = app
        .records
        .list_sightings(&ListQuery::from_params(None, Some("ASC")))
        .await
        .unwrap();
    let order: Vec<_> = asc.records.iter().map(|s| s.id).collect();
    assert_eq!(order, vec![november, may, untimed]);
}

#[tokio::test]
async fn malformed_numbers_are_stored_as_absent() {
    let app = TestApp::new().await;
    let saved = app
        .records
        .create_sighting(
            &fields(&[
                ("animal_category", "Waterfowl"),
                ("animal", "Mallard"),
                ("lat", "north-ish"),
                ("lng", "-93.2"),
            ]),
            None,
        )
        .await
        .unwrap();

    let sighting = app.records.get_sighting(saved.id).await.unwrap();
    assert_eq!(sighting.details.lat, None);
    assert_eq!(sighting.details.lng, Some(-93.2));
    assert!(sighting.map_point().is_none());
}

#[tokio::test]
async fn unknown_animal_creates_nothing() {
    let app = TestApp::new().await;
    let err = app
        .records
        .create_sighting(&fields(&[("animal", "Jackalope")]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnknownAnimal(name) if name == "Jackalope"));

    let listing = app.records.list_sightings(&ListQuery::default()).await.unwrap();
    assert!(listing.records.is_empty());
}

#[tokio::test]
async fn harvest_other_selections_round_trip() {
    let app = TestApp::new().await;
    let saved = app
        .records
        .create_harvest(
            &fields(&[
                ("harvest_name", "Opening morning bull"),
                ("animal", "Elk"),
                ("weapon_type", "Other"),
                ("other_weapon_type", "Slingbow"),
                ("caliber", ".30-06"),
                ("shot_lat", "44.1"),
                ("shot_lng", "-110.5"),
                ("distance_traveled", "85"),
            ]),
            None,
        )
        .await
        .unwrap();

    let harvest = app.records.get_harvest(saved.id).await.unwrap();
    assert_eq!(harvest.details.weapon_type.as_deref(), Some("Other"));
    assert_eq!(harvest.effective_weapon_type(), Some("Slingbow"));
    assert_eq!(harvest.effective_caliber(), Some(".30-06"));
    assert_eq!(harvest.marker_color(), domains::DEFAULT_HARVEST_MARKER_COLOR);
    assert!(harvest.shot_point().is_some());
    assert!(harvest.recovery_point().is_none());
    assert_eq!(harvest.details.distance_traveled, Some(85.0));
}

#[tokio::test]
async fn harvest_requires_a_name() {
    let app = TestApp::new().await;
    let err = app
        .records
        .create_harvest(&fields(&[("harvest_name", "  "), ("animal", "Elk")]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn single_delete_of_missing_record_is_not_found_but_batch_skips_it() {
    let app = TestApp::new().await;
    let kept = app
        .records
        .create_sighting(&fields(&[("animal_category", "Big Game"), ("animal", "Moose")]), None)
        .await
        .unwrap();
    let doomed = app
        .records
        .create_sighting(&fields(&[("animal_category", "Big Game"), ("animal", "Elk")]), None)
        .await
        .unwrap();

    assert!(matches!(
        app.records.delete_sighting(4242).await,
        Err(AppError::NotFound(..))
    ));

    let deleted = app.records.delete_sightings(&[doomed.id, 4242]).await.unwrap();
    assert_eq!(deleted, 1);
    assert!(app.records.get_sighting(kept.id).await.is_ok());
    assert!(matches!(
        app.records.get_sighting(doomed.id).await,
        Err(AppError::NotFound(..))
    ));
}

#[tokio::test]
async fn update_keeps_photo_unless_a_new_one_is_supplied() {
    let app = TestApp::new().await;
    let form = fields(&[("harvest_name", "Spring gobbler"), ("animal", "Turkey")]);
    let saved = app
        .records
        .create_harvest(&form, Some(photo("tom.jpg", b"first")))
        .await
        .unwrap();
    let original = app.records.get_harvest(saved.id).await.unwrap();
    let first_photo = original.details.photo_filename.clone().unwrap();
    assert!(first_photo.ends_with("_tom.jpg"));

    let renamed = form.clone().with("harvest_name", "Spring gobbler, 22 lb");
    app.records.update_harvest(saved.id, &renamed, None).await.unwrap();
    let updated = app.records.get_harvest(saved.id).await.unwrap();
    assert_eq!(updated.details.harvest_name, "Spring gobbler, 22 lb");
    assert_eq!(updated.details.photo_filename.as_deref(), Some(first_photo.as_str()));

    app.records
        .update_harvest(saved.id, &renamed, Some(photo("fan.jpg", b"second")))
        .await
        .unwrap();
    let replaced = app.records.get_harvest(saved.id).await.unwrap();
    assert!(replaced.details.photo_filename.unwrap().ends_with("_fan.jpg"));
}

#[tokio::test]
async fn updating_a_missing_record_is_not_found() {
    let app = TestApp::new().await;
    let err = app
        .records
        .update_sighting(77, &fields(&[("animal", "Elk")]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));
}

#[tokio::test]
async fn failed_upload_still_saves_the_record() {
    let app = TestApp::with_unwritable_uploads().await;
    let saved = app
        .records
        .create_sighting(
            &fields(&[("animal_category", "Predators & Other"), ("animal", "Coyote")]),
            Some(photo("howl.jpg", b"jpeg")),
        )
        .await
        .unwrap();
    assert!(saved.upload_failure.is_some());
    assert_eq!(saved.notice(domains::Notice::Created), domains::Notice::UploadFailed);

    let sighting = app.records.get_sighting(saved.id).await.unwrap();
    assert_eq!(sighting.details.photo_filename, None);
}
