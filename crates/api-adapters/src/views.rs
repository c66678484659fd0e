//! # Views
//!
//! Askama page templates and the flat view models they render. Everything a
//! template touches is a plain string, bool or list, so the templates stay
//! free of `Option` handling.

use askama::Template;
use domains::{FieldMap, GeoPoint, Harvest, Listing, Notice, Sighting};
use serde::Serialize;

use crate::forms::{self, Choices, FormErrors};

pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

const SIGHTING_MARKER_COLOR: &str = "#e53935";

/// Colors end up in inline styles, so anything but `#rrggbb` is replaced.
fn safe_color(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(color) if forms::is_hex_color(color) => color.to_string(),
        _ => fallback.to_string(),
    }
}

fn harvest_color(h: &Harvest) -> String {
    safe_color(Some(h.marker_color()), domains::DEFAULT_HARVEST_MARKER_COLOR)
}

/// One `<option>`.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

fn options(choices: Choices, selected: &str) -> Vec<OptionView> {
    choices
        .into_iter()
        .map(|(value, label)| OptionView {
            selected: value == selected,
            value,
            label,
        })
        .collect()
}

/// One labelled input of a record form.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    /// `text`, `select`, `textarea`, `color`, `hidden`, `datetime-local` or `file`
    pub kind: &'static str,
    pub value: String,
    pub placeholder: &'static str,
    pub options: Vec<OptionView>,
    pub error: String,
}

struct FieldBuilder<'a> {
    values: &'a FieldMap,
    errors: &'a FormErrors,
    fields: Vec<FieldView>,
}

impl<'a> FieldBuilder<'a> {
    fn new(values: &'a FieldMap, errors: &'a FormErrors) -> Self {
        Self {
            values,
            errors,
            fields: Vec::new(),
        }
    }

    fn push(&mut self, name: &'static str, label: &'static str, kind: &'static str) -> &mut FieldView {
        self.fields.push(FieldView {
            name,
            label,
            kind,
            value: self.values.raw(name).to_string(),
            placeholder: "",
            options: Vec::new(),
            error: self.errors.get(name).unwrap_or_default().to_string(),
        });
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }

    fn input(&mut self, name: &'static str, label: &'static str, kind: &'static str) -> &mut Self {
        self.push(name, label, kind);
        self
    }

    fn text_hint(&mut self, name: &'static str, label: &'static str, placeholder: &'static str) -> &mut Self {
        self.push(name, label, "text").placeholder = placeholder;
        self
    }

    fn select(&mut self, name: &'static str, label: &'static str, prompt: &str, choices: Choices) -> &mut Self {
        let selected = self.values.raw(name).to_string();
        let mut all = vec![(String::new(), prompt.to_string())];
        all.extend(choices);
        self.push(name, label, "select").options = options(all, &selected);
        self
    }

    /// The animal select, whose options come from the submitted category.
    fn animal_select(&mut self, allow_flat: bool) -> &mut Self {
        let selected = self.values.raw("animal").to_string();
        let category = self.values.text("animal_category");
        let choices = forms::animal_options(category.as_deref(), allow_flat);
        self.push("animal", "Animal", "select").options = options(choices, &selected);
        self
    }

    fn color(&mut self, default: &str) -> &mut Self {
        let field = self.push("marker_color", "Marker Color", "color");
        if !forms::is_hex_color(field.value.trim()) {
            field.value = default.to_string();
        }
        self
    }

    fn finish(&mut self) -> Vec<FieldView> {
        std::mem::take(&mut self.fields)
    }
}

pub fn sighting_form_fields(values: &FieldMap, errors: &FormErrors) -> Vec<FieldView> {
    FieldBuilder::new(values, errors)
        .select("animal_category", "Animal Category", "Select category", forms::category_choices())
        .animal_select(false)
        .input("sighting_name", "Sighting Name", "text")
        .input("date_time", "Date/Time", "datetime-local")
        .input("weather", "Weather", "text")
        .input("wind", "Wind", "text")
        .select("wind_speed", "Wind Speed (mph)", "Select a wind speed", forms::wind_speed_choices())
        .input("wind_direction", "Wind Direction", "text")
        .select("humidity", "Humidity (%)", "Select humidity", forms::humidity_choices())
        .input("temperature", "Temperature", "text")
        .input("location", "Location", "text")
        .input("notes", "Notes", "textarea")
        .color(SIGHTING_MARKER_COLOR)
        .input("lat", "Latitude", "hidden")
        .input("lng", "Longitude", "hidden")
        .input("photo", "Photo (optional)", "file")
        .finish()
}

pub fn harvest_form_fields(values: &FieldMap, errors: &FormErrors) -> Vec<FieldView> {
    FieldBuilder::new(values, errors)
        .input("harvest_name", "Harvest Name", "text")
        .select("animal_category", "Animal Category", "Any category", forms::category_choices())
        .animal_select(true)
        .input("date_time", "Date/Time", "datetime-local")
        .input("weather", "Weather", "text")
        .select("wind_speed", "Wind Speed (mph)", "Select a wind speed", forms::wind_speed_choices())
        .input("wind_direction", "Wind Direction", "text")
        .select("humidity", "Humidity (%)", "Select humidity", forms::humidity_choices())
        .select("weapon_type", "Weapon Type", "Select weapon type", forms::weapon_type_choices())
        .text_hint("other_weapon_type", "If \"Other\", specify weapon type", "e.g. Slingbow")
        .select("caliber", "Caliber / Gauge", "Select caliber or gauge", forms::caliber_choices())
        .text_hint("other_caliber", "If \"Other\", specify caliber", "e.g. .450 Bushmaster")
        .select("broadhead", "Broadhead Type", "Select broadhead type", forms::broadhead_choices())
        .text_hint("other_broadhead", "If \"Other\", specify broadhead", "e.g. Rage Hypodermic")
        .input("location", "Location", "text")
        .input("shot_lat", "Shot Latitude", "hidden")
        .input("shot_lng", "Shot Longitude", "hidden")
        .input("recovery_lat", "Recovery Latitude", "hidden")
        .input("recovery_lng", "Recovery Longitude", "hidden")
        .input("distance_traveled", "Distance Traveled (yards)", "text")
        .input("notes", "Notes", "textarea")
        .color(domains::DEFAULT_HARVEST_MARKER_COLOR)
        .input("photo", "Upload Photo", "file")
        .finish()
}

/// A map pin, serialized into the page for the map script.
#[derive(Debug, Clone, Serialize)]
pub struct MapMarker {
    pub id: i64,
    pub lat: f64,
    pub lng: f64,
    pub color: String,
    pub label: String,
    pub url: String,
    /// `sighting`, `shot` or `recovery`
    pub kind: &'static str,
}

impl MapMarker {
    fn at(point: GeoPoint, id: i64, color: &str, label: &str, url: &str, kind: &'static str) -> Self {
        Self {
            id,
            lat: point.lat,
            lng: point.lng,
            color: color.to_string(),
            label: label.to_string(),
            url: url.to_string(),
            kind,
        }
    }
}

pub fn sighting_markers(sightings: &[Sighting]) -> Vec<MapMarker> {
    sightings
        .iter()
        .filter_map(|s| {
            let point = s.map_point()?;
            let color = safe_color(s.details.marker_color.as_deref(), SIGHTING_MARKER_COLOR);
            let url = format!("/sighting/{}", s.id);
            Some(MapMarker::at(point, s.id, &color, &s.animal.name, &url, "sighting"))
        })
        .collect()
}

pub fn harvest_markers(harvests: &[Harvest]) -> Vec<MapMarker> {
    let mut markers = Vec::new();
    for h in harvests {
        let url = format!("/harvest/{}", h.id);
        let label = &h.details.harvest_name;
        let color = harvest_color(h);
        if let Some(point) = h.shot_point() {
            markers.push(MapMarker::at(point, h.id, &color, label, &url, "shot"));
        }
        if let Some(point) = h.recovery_point() {
            markers.push(MapMarker::at(point, h.id, &color, label, &url, "recovery"));
        }
    }
    markers
}

/// JSON for inline `<script>` use: `<` is escaped so user text cannot close
/// the script element.
pub fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "[]".to_string())
        .replace('<', "\\u003c")
}

pub fn notice_text(param: Option<&str>) -> String {
    param
        .and_then(Notice::from_param)
        .map(|notice| notice.message().to_string())
        .unwrap_or_default()
}

fn display_time(value: &Option<chrono::NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format(DISPLAY_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Animal filter + sort controls of a list page.
#[derive(Debug, Clone)]
pub struct FilterView {
    pub action: &'static str,
    pub animals: Vec<OptionView>,
    pub sort_asc: bool,
}

impl FilterView {
    fn new<T>(action: &'static str, listing: &Listing<T>) -> Self {
        let selected = listing.animal_filter.as_deref().unwrap_or("");
        let mut choices = vec![(String::new(), "All animals".to_string())];
        choices.extend(listing.animals.iter().map(|name| (name.clone(), name.clone())));
        Self {
            action,
            animals: options(choices, selected),
            sort_asc: listing.sort == domains::SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SightingRow {
    pub id: i64,
    pub animal: String,
    pub name: String,
    pub when: String,
    pub location: String,
    pub weather: String,
    pub marker_color: String,
    pub photo_url: String,
}

#[derive(Debug, Clone)]
pub struct HarvestRow {
    pub id: i64,
    pub name: String,
    pub animal: String,
    pub when: String,
    pub weapon: String,
    pub location: String,
    pub marker_color: String,
    pub photo_url: String,
    pub latest: bool,
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub title: &'static str,
}

#[derive(Template)]
#[template(path = "sightings.html")]
pub struct SightingListPage {
    pub title: &'static str,
    pub notice: String,
    pub filter: FilterView,
    pub rows: Vec<SightingRow>,
    pub markers_json: String,
}

impl SightingListPage {
    pub fn new(listing: &Listing<Sighting>, notice: String, photo_url: impl Fn(&str) -> String) -> Self {
        let rows = listing
            .records
            .iter()
            .map(|s| SightingRow {
                id: s.id,
                animal: s.animal.name.clone(),
                name: text(&s.details.sighting_name),
                when: display_time(&s.details.date_time),
                location: text(&s.details.location),
                weather: text(&s.details.weather),
                marker_color: safe_color(s.details.marker_color.as_deref(), ""),
                photo_url: s.details.photo_filename.as_deref().map(&photo_url).unwrap_or_default(),
            })
            .collect();
        Self {
            title: "Wildlife Sightings",
            notice,
            filter: FilterView::new("/sightings", listing),
            rows,
            markers_json: script_json(&sighting_markers(&listing.records)),
        }
    }
}

#[derive(Template)]
#[template(path = "harvests.html")]
pub struct HarvestListPage {
    pub title: &'static str,
    pub notice: String,
    pub filter: FilterView,
    pub rows: Vec<HarvestRow>,
    pub markers_json: String,
}

impl HarvestListPage {
    pub fn new(listing: &Listing<Harvest>, notice: String, photo_url: impl Fn(&str) -> String) -> Self {
        let latest_id = latest_harvest(&listing.records);
        let rows = listing
            .records
            .iter()
            .map(|h| HarvestRow {
                id: h.id,
                name: h.details.harvest_name.clone(),
                animal: h.animal.name.clone(),
                when: display_time(&h.details.date_time),
                weapon: h.effective_weapon_type().unwrap_or_default().to_string(),
                location: text(&h.details.location),
                marker_color: harvest_color(h),
                photo_url: h.details.photo_filename.as_deref().map(&photo_url).unwrap_or_default(),
                latest: Some(h.id) == latest_id,
            })
            .collect();
        Self {
            title: "Harvest Log",
            notice,
            filter: FilterView::new("/harvests", listing),
            rows,
            markers_json: script_json(&harvest_markers(&listing.records)),
        }
    }
}

/// The harvest with the most recent event time, whatever order the page is
/// in. Untimed harvests only win when nothing is timed; ties go to the
/// higher id.
fn latest_harvest(harvests: &[Harvest]) -> Option<i64> {
    harvests
        .iter()
        .max_by_key(|h| (h.details.date_time, h.id))
        .map(|h| h.id)
}

/// A labelled value on a detail page.
#[derive(Debug, Clone)]
pub struct Fact {
    pub label: &'static str,
    pub value: String,
}

fn facts(pairs: Vec<(&'static str, Option<String>)>) -> Vec<Fact> {
    pairs
        .into_iter()
        .filter_map(|(label, value)| value.map(|value| Fact { label, value }))
        .collect()
}

fn coords(point: Option<GeoPoint>) -> Option<String> {
    point.map(|p| format!("{:.5}, {:.5}", p.lat, p.lng))
}

#[derive(Template)]
#[template(path = "record.html")]
pub struct RecordPage {
    pub title: String,
    pub notice: String,
    pub heading: String,
    pub edit_url: String,
    pub delete_url: String,
    pub back_url: &'static str,
    pub photo_url: String,
    pub facts: Vec<Fact>,
    pub markers_json: String,
}

impl RecordPage {
    pub fn sighting(s: &Sighting, notice: String, photo_url: String) -> Self {
        let d = &s.details;
        let heading = d.sighting_name.clone().unwrap_or_else(|| s.animal.name.clone());
        Self {
            title: format!("Sighting: {heading}"),
            notice,
            heading,
            edit_url: format!("/edit-sighting/{}", s.id),
            delete_url: format!("/delete-sighting/{}", s.id),
            back_url: "/sightings",
            photo_url,
            facts: facts(vec![
                ("Animal", Some(s.animal.name.clone())),
                ("Category", Some(s.animal.category.as_str().to_string())),
                ("Date/Time", d.date_time.as_ref().map(|dt| dt.format(DISPLAY_TIME_FORMAT).to_string())),
                ("Weather", d.weather.clone()),
                ("Wind", d.wind.clone()),
                ("Wind Speed", d.wind_speed.clone()),
                ("Wind Direction", d.wind_direction.clone()),
                ("Humidity", d.humidity.clone()),
                ("Temperature", d.temperature.clone()),
                ("Location", d.location.clone()),
                ("Coordinates", coords(s.map_point())),
                ("Notes", d.notes.clone()),
            ]),
            markers_json: script_json(&sighting_markers(std::slice::from_ref(s))),
        }
    }

    pub fn harvest(h: &Harvest, notice: String, photo_url: String) -> Self {
        let d = &h.details;
        Self {
            title: format!("Harvest: {}", d.harvest_name),
            notice,
            heading: d.harvest_name.clone(),
            edit_url: format!("/edit-harvest/{}", h.id),
            delete_url: format!("/delete-harvest/{}", h.id),
            back_url: "/harvests",
            photo_url,
            facts: facts(vec![
                ("Animal", Some(h.animal.name.clone())),
                ("Category", Some(h.animal.category.as_str().to_string())),
                ("Date/Time", d.date_time.as_ref().map(|dt| dt.format(DISPLAY_TIME_FORMAT).to_string())),
                ("Weather", d.weather.clone()),
                ("Wind Speed", d.wind_speed.clone()),
                ("Wind Direction", d.wind_direction.clone()),
                ("Humidity", d.humidity.clone()),
                ("Weapon", h.effective_weapon_type().map(str::to_string)),
                ("Caliber", h.effective_caliber().map(|c| forms::caliber_label(c).to_string())),
                ("Broadhead", h.effective_broadhead().map(str::to_string)),
                ("Location", d.location.clone()),
                ("Shot Location", coords(h.shot_point())),
                ("Recovery Location", coords(h.recovery_point())),
                ("Distance Traveled", d.distance_traveled.map(|yd| format!("{yd} yards"))),
                ("Notes", d.notes.clone()),
            ]),
            markers_json: script_json(&harvest_markers(std::slice::from_ref(h))),
        }
    }
}

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormPage {
    pub title: String,
    pub action: String,
    /// Non-field message shown above the form.
    pub banner: String,
    pub fields: Vec<FieldView>,
    pub current_photo_url: String,
    pub submit_label: &'static str,
    /// Category-less animal lists allowed (harvest form).
    pub flat_animals: bool,
}

impl FormPage {
    pub fn sighting(title: &str, action: String, values: &FieldMap, errors: &FormErrors) -> Self {
        Self {
            title: title.to_string(),
            action,
            banner: banner(errors),
            fields: sighting_form_fields(values, errors),
            current_photo_url: String::new(),
            submit_label: "Save Sighting",
            flat_animals: false,
        }
    }

    pub fn harvest(title: &str, action: String, values: &FieldMap, errors: &FormErrors) -> Self {
        Self {
            title: title.to_string(),
            action,
            banner: banner(errors),
            fields: harvest_form_fields(values, errors),
            current_photo_url: String::new(),
            submit_label: "Save Harvest",
            flat_animals: true,
        }
    }

    pub fn with_photo(mut self, url: Option<String>) -> Self {
        self.current_photo_url = url.unwrap_or_default();
        self
    }
}

fn banner(errors: &FormErrors) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        "Please correct the errors below and resubmit.".to_string()
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundPage {
    pub title: &'static str,
    pub message: String,
}
