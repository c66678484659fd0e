//! The HTTP surface, driven through the router.

use axum::http::StatusCode;
use integration_tests::{body_text, fields, form_post, location, multipart_post, TestApp};

#[tokio::test]
async fn home_page_links_both_logs() {
    let app = TestApp::new().await;
    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("href=\"/sightings\""));
    assert!(html.contains("href=\"/harvests\""));
}

#[tokio::test]
async fn missing_records_render_not_found() {
    let app = TestApp::new().await;
    for uri in ["/sighting/999", "/harvest/999", "/edit-sighting/999", "/edit-harvest/999"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
    let html = body_text(app.get("/sighting/999").await).await;
    assert!(html.contains("not found with ID 999"));

    let response = app.send(form_post("/delete-harvest/999", "")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creating_a_sighting_redirects_to_the_list_with_a_notice() {
    let app = TestApp::new().await;
    let response = app
        .send(multipart_post(
            "/add",
            &[
                ("animal_category", "Big Game"),
                ("animal", "Moose"),
                ("sighting_name", "Cow and calf at the beaver pond"),
                ("date_time", "2024-09-14T07:45"),
                ("lat", "46.87"),
                ("lng", "-113.99"),
            ],
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/sightings?notice=created");

    let html = body_text(app.get("/sightings?notice=created").await).await;
    assert!(html.contains("Record successfully logged!"));
    assert!(html.contains("Cow and calf at the beaver pond"));
}

#[tokio::test]
async fn invalid_sighting_form_is_rerendered_with_values() {
    let app = TestApp::new().await;
    let response = app
        .send(multipart_post(
            "/add",
            &[
                ("animal_category", "Waterfowl"),
                ("animal", "Elk"),
                ("notes", "saw it from the truck"),
            ],
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Not a valid choice."));
    assert!(html.contains("saw it from the truck"));
    assert!(html.contains("Please correct the errors below and resubmit."));

    let listing = app.records.list_sightings(&Default::default()).await.unwrap();
    assert!(listing.records.is_empty());
}

#[tokio::test]
async fn list_page_honours_filter_and_sort() {
    let app = TestApp::new().await;
    let elk = app
        .records
        .create_sighting(&fields(&[("animal_category", "Big Game"), ("animal", "Elk")]), None)
        .await
        .unwrap();
    let moose = app
        .records
        .create_sighting(&fields(&[("animal_category", "Big Game"), ("animal", "Moose")]), None)
        .await
        .unwrap();

    let html = body_text(app.get("/sightings?animal=Elk&sort=asc").await).await;
    assert!(html.contains(&format!("href=\"/sighting/{}\"", elk.id)));
    assert!(!html.contains(&format!("href=\"/sighting/{}\"", moose.id)));
    assert!(html.contains("<option value=\"Elk\" selected>"));
    assert!(html.contains("<option value=\"asc\" selected>"));
}

#[tokio::test]
async fn batch_delete_removes_checked_sightings() {
    let app = TestApp::new().await;
    let mut ids = Vec::new();
    for animal in ["Elk", "Moose", "Elk"] {
        let saved = app
            .records
            .create_sighting(&fields(&[("animal_category", "Big Game"), ("animal", animal)]), None)
            .await
            .unwrap();
        ids.push(saved.id);
    }

    let body = format!("delete_ids={}&delete_ids={}&delete_ids=9999", ids[0], ids[2]);
    let response = app.send(form_post("/delete", &body)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/sightings?notice=deleted");

    assert_eq!(app.get(&format!("/sighting/{}", ids[0])).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get(&format!("/sighting/{}", ids[1])).await.status(), StatusCode::OK);

    let response = app.send(form_post("/delete", "")).await;
    assert_eq!(location(&response), "/sightings");
}

#[tokio::test]
async fn harvest_lifecycle_over_http() {
    let app = TestApp::new().await;
    let response = app
        .send(multipart_post(
            "/add-harvest",
            &[
                ("harvest_name", "Late season doe"),
                ("animal", "Whitetail Deer(Doe)"),
                ("weapon_type", "Other"),
                ("other_weapon_type", "Slingbow"),
                ("marker_color", ""),
            ],
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/harvests?notice=created");

    let listing = app.records.list_harvests(&Default::default()).await.unwrap();
    let id = listing.records[0].id;

    let detail = body_text(app.get(&format!("/harvest/{id}")).await).await;
    assert!(detail.contains("Slingbow"));

    let edit = body_text(app.get(&format!("/edit-harvest/{id}")).await).await;
    assert!(edit.contains("value=\"Late season doe\""));
    assert!(edit.contains("<option value=\"Whitetail Deer(Doe)\" selected>"));

    let response = app
        .send(multipart_post(
            &format!("/edit-harvest/{id}"),
            &[("harvest_name", "Late season doe, 2nd"), ("animal", "Whitetail Deer(Doe)")],
            None,
        ))
        .await;
    assert_eq!(location(&response), format!("/harvest/{id}?notice=updated"));

    let response = app.send(form_post(&format!("/delete-harvest/{id}"), "")).await;
    assert_eq!(location(&response), "/harvests?notice=deleted");
    assert_eq!(app.get(&format!("/harvest/{id}")).await.status(), StatusCode::NOT_FOUND);
}

/// Drops a registry row the taxonomy still offers, so the form validates
/// but the animal lookup comes back empty.
async fn remove_from_registry(app: &TestApp, name: &str) {
    sqlx::query("DELETE FROM animal WHERE name = ?")
        .bind(name)
        .execute(app.store.pool())
        .await
        .unwrap();
}

#[tokio::test]
async fn sighting_for_an_unregistered_animal_is_rerendered() {
    let app = TestApp::new().await;
    remove_from_registry(&app, "Elk").await;

    let response = app
        .send(multipart_post(
            "/add",
            &[("animal_category", "Big Game"), ("animal", "Elk"), ("notes", "bugling at dusk")],
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Selected animal not found in database."));
    assert!(html.contains("bugling at dusk"));

    let listing = app.records.list_sightings(&Default::default()).await.unwrap();
    assert!(listing.records.is_empty());
}

#[tokio::test]
async fn harvest_edit_for_an_unregistered_animal_keeps_the_record() {
    let app = TestApp::new().await;
    let saved = app
        .records
        .create_harvest(
            &fields(&[("harvest_name", "Opening day bull"), ("animal", "Moose"), ("notes", "original")]),
            None,
        )
        .await
        .unwrap();
    remove_from_registry(&app, "Elk").await;

    let response = app
        .send(multipart_post(
            &format!("/edit-harvest/{}", saved.id),
            &[("harvest_name", "Opening day bull"), ("animal", "Elk"), ("notes", "changed my mind")],
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Selected animal not found in database."));
    assert!(html.contains("changed my mind"));

    let stored = app.records.get_harvest(saved.id).await.unwrap();
    assert_eq!(stored.animal.name, "Moose");
    assert_eq!(stored.details.notes.as_deref(), Some("original"));
}

#[tokio::test]
async fn non_numeric_ids_are_not_found() {
    let app = TestApp::new().await;
    for uri in ["/sighting/abc", "/harvest/abc", "/edit-sighting/abc", "/edit-harvest/1x"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
    let response = app.send(form_post("/delete-harvest/abc", "")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.send(form_post("/delete-sighting/abc", "")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn animal_api_narrows_by_category() {
    let app = TestApp::new().await;
    let response = app.get("/api/animals?category=Waterfowl").await;
    assert_eq!(response.status(), StatusCode::OK);
    let choices: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    let values: Vec<&str> = choices
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["value"].as_str())
        .collect();
    assert!(values.contains(&"Mallard"));
    assert!(!values.contains(&"Elk"));
}

#[tokio::test]
async fn record_api_returns_filtered_json() {
    let app = TestApp::new().await;
    for animal in ["Elk", "Moose"] {
        app.records
            .create_sighting(&fields(&[("animal_category", "Big Game"), ("animal", animal)]), None)
            .await
            .unwrap();
    }
    let response = app.get("/api/sightings?animal=Moose").await;
    let records: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["animal"]["name"], "Moose");
}
