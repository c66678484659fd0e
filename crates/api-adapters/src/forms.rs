//! # Forms
//!
//! Field-level validation for the sighting and harvest forms, and the choice
//! lists their selects offer. Validation runs before any service call; a
//! failed form is re-rendered from the same `FieldMap` so nothing the user
//! typed is lost.

use std::collections::BTreeMap;

use domains::fields::{format_timestamp, parse_timestamp};
use domains::taxonomy;
use domains::{FieldMap, Harvest, PhotoUpload, Sighting};

pub const ALLOWED_PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

pub const HARVEST_NAME_MAX_LEN: usize = 100;

pub const WEAPON_TYPES: &[(&str, &str)] = &[
    ("Recurve Bow", "Recurve Bow"),
    ("Longbow", "Longbow"),
    ("Compound Bow", "Compound Bow"),
    ("Crossbow", "Crossbow"),
    ("Shotgun", "Shotgun"),
    ("Rifle", "Rifle"),
    ("Muzzleloader", "Muzzleloader"),
    ("Other", "Other"),
];

pub const CALIBERS: &[(&str, &str)] = &[
    ("12ga", "12 Gauge"),
    ("20ga", "20 Gauge"),
    ("28ga", "28 Gauge"),
    (".223", ".223 Remington"),
    (".243", ".243 Winchester"),
    (".270", ".270 Winchester"),
    (".30-06", ".30-06 Springfield"),
    (".308", ".308 Winchester"),
    ("Other", "Other"),
];

pub const BROADHEADS: &[(&str, &str)] = &[
    ("Fixed Blade", "Fixed Blade"),
    ("Mechanical", "Mechanical"),
    ("Hybrid", "Hybrid"),
    ("Other", "Other"),
];

/// A select's options as (value, label).
pub type Choices = Vec<(String, String)>;

fn owned(choices: &[(&str, &str)]) -> Choices {
    choices
        .iter()
        .map(|(value, label)| (value.to_string(), label.to_string()))
        .collect()
}

/// `0 mph` through `50 mph` in steps of 5, then `55+ mph`.
pub fn wind_speed_choices() -> Choices {
    (0..=50)
        .step_by(5)
        .map(|mph| format!("{mph} mph"))
        .chain(std::iter::once("55+ mph".to_string()))
        .map(|value| (value.clone(), value))
        .collect()
}

/// `0%` through `100%` in steps of 5.
pub fn humidity_choices() -> Choices {
    (0..=100)
        .step_by(5)
        .map(|pct| format!("{pct}%"))
        .map(|value| (value.clone(), value))
        .collect()
}

pub fn weapon_type_choices() -> Choices {
    owned(WEAPON_TYPES)
}

pub fn caliber_choices() -> Choices {
    owned(CALIBERS)
}

pub fn broadhead_choices() -> Choices {
    owned(BROADHEADS)
}

pub fn category_choices() -> Choices {
    taxonomy::categories()
        .map(|c| (c.as_str().to_string(), c.as_str().to_string()))
        .collect()
}

/// Display label of a stored caliber value.
pub fn caliber_label(value: &str) -> &str {
    CALIBERS
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
        .unwrap_or(value)
}

/// Options for the animal select.
///
/// With a category selected this is [`taxonomy::animal_choices_for`]. Without
/// one, `allow_flat` decides between the flat list (harvest form) and the
/// placeholder alone (sighting form, where the category is required).
pub fn animal_options(category: Option<&str>, allow_flat: bool) -> Choices {
    match category {
        None if allow_flat => std::iter::once(("", "Select animal"))
            .chain(taxonomy::all_choices())
            .map(|(value, label)| (value.to_string(), label.to_string()))
            .collect(),
        category => owned(&taxonomy::animal_choices_for(category)),
    }
}

fn in_choices(choices: &Choices, value: &str) -> bool {
    choices.iter().any(|(v, _)| v == value)
}

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

const REQUIRED: &str = "This field is required.";
const NOT_A_CHOICE: &str = "Not a valid choice.";

fn check_required(errors: &mut FormErrors, fields: &FieldMap, name: &'static str) {
    if fields.text(name).is_none() {
        errors.add(name, REQUIRED);
    }
}

fn check_optional_choice(errors: &mut FormErrors, fields: &FieldMap, name: &'static str, choices: &Choices) {
    if let Some(value) = fields.text(name) {
        if !in_choices(choices, &value) {
            errors.add(name, NOT_A_CHOICE);
        }
    }
}

/// `#rrggbb`, the only form a color input submits.
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn check_color(errors: &mut FormErrors, fields: &FieldMap) {
    if let Some(color) = fields.text("marker_color") {
        if !is_hex_color(&color) {
            errors.add("marker_color", "Not a valid color.");
        }
    }
}

fn check_date_time(errors: &mut FormErrors, fields: &FieldMap) {
    let raw = fields.raw("date_time").trim();
    if !raw.is_empty() && parse_timestamp(raw).is_none() {
        errors.add("date_time", "Not a valid datetime value.");
    }
}

fn check_photo(errors: &mut FormErrors, photo: Option<&PhotoUpload>) {
    let Some(photo) = photo else {
        return;
    };
    let extension = photo
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    let allowed = extension
        .as_deref()
        .is_some_and(|ext| ALLOWED_PHOTO_EXTENSIONS.contains(&ext));
    let is_image = mime_guess::from_path(&photo.file_name)
        .first()
        .is_some_and(|guess| guess.type_() == mime::IMAGE);
    if !(allowed && is_image) {
        errors.add("photo", "Images only!");
    }
}

/// Checks the submitted animal against the list implied by the submitted
/// category, never a list from an earlier request.
fn check_animal(errors: &mut FormErrors, fields: &FieldMap, allow_flat: bool) {
    let Some(animal) = fields.text("animal") else {
        errors.add("animal", REQUIRED);
        return;
    };
    let category = fields.text("animal_category");
    if category.is_none() && !allow_flat {
        return;
    }
    if !in_choices(&animal_options(category.as_deref(), allow_flat), &animal) {
        errors.add("animal", NOT_A_CHOICE);
    }
}

pub fn validate_sighting(fields: &FieldMap, photo: Option<&PhotoUpload>) -> FormErrors {
    let mut errors = FormErrors::default();

    match fields.text("animal_category") {
        None => errors.add("animal_category", REQUIRED),
        Some(category) if !in_choices(&category_choices(), &category) => {
            errors.add("animal_category", NOT_A_CHOICE)
        }
        Some(_) => {}
    }
    check_animal(&mut errors, fields, false);
    check_date_time(&mut errors, fields);
    check_optional_choice(&mut errors, fields, "wind_speed", &wind_speed_choices());
    check_optional_choice(&mut errors, fields, "humidity", &humidity_choices());
    check_color(&mut errors, fields);
    check_photo(&mut errors, photo);

    errors
}

pub fn validate_harvest(fields: &FieldMap, photo: Option<&PhotoUpload>) -> FormErrors {
    let mut errors = FormErrors::default();

    check_required(&mut errors, fields, "harvest_name");
    if fields.raw("harvest_name").trim().chars().count() > HARVEST_NAME_MAX_LEN {
        errors.add(
            "harvest_name",
            format!("Field cannot be longer than {HARVEST_NAME_MAX_LEN} characters."),
        );
    }
    check_optional_choice(&mut errors, fields, "animal_category", &category_choices());
    check_animal(&mut errors, fields, true);
    check_date_time(&mut errors, fields);
    check_optional_choice(&mut errors, fields, "wind_speed", &wind_speed_choices());
    check_optional_choice(&mut errors, fields, "humidity", &humidity_choices());
    check_optional_choice(&mut errors, fields, "weapon_type", &weapon_type_choices());
    check_optional_choice(&mut errors, fields, "caliber", &caliber_choices());
    check_optional_choice(&mut errors, fields, "broadhead", &broadhead_choices());
    check_color(&mut errors, fields);
    check_photo(&mut errors, photo);

    errors
}

/// Seeds an edit form from a stored sighting. The category comes from the
/// record's animal so the animal select starts out with the right list.
pub fn sighting_fields(sighting: &Sighting) -> FieldMap {
    let d = &sighting.details;
    let mut fields = FieldMap::new()
        .with("animal_category", sighting.animal.category.as_str())
        .with("animal", sighting.animal.name.as_str());
    fields.insert_opt("sighting_name", d.sighting_name.as_ref());
    fields.insert_opt("date_time", d.date_time.as_ref().map(format_timestamp));
    fields.insert_opt("weather", d.weather.as_ref());
    fields.insert_opt("wind", d.wind.as_ref());
    fields.insert_opt("wind_speed", d.wind_speed.as_ref());
    fields.insert_opt("wind_direction", d.wind_direction.as_ref());
    fields.insert_opt("humidity", d.humidity.as_ref());
    fields.insert_opt("temperature", d.temperature.as_ref());
    fields.insert_opt("location", d.location.as_ref());
    fields.insert_opt("notes", d.notes.as_ref());
    fields.insert_opt("marker_color", d.marker_color.as_ref());
    fields.insert_opt("lat", d.lat);
    fields.insert_opt("lng", d.lng);
    fields
}

pub fn harvest_fields(harvest: &Harvest) -> FieldMap {
    let d = &harvest.details;
    let mut fields = FieldMap::new()
        .with("harvest_name", d.harvest_name.as_str())
        .with("animal_category", harvest.animal.category.as_str())
        .with("animal", harvest.animal.name.as_str());
    fields.insert_opt("date_time", d.date_time.as_ref().map(format_timestamp));
    fields.insert_opt("weather", d.weather.as_ref());
    fields.insert_opt("wind_speed", d.wind_speed.as_ref());
    fields.insert_opt("wind_direction", d.wind_direction.as_ref());
    fields.insert_opt("humidity", d.humidity.as_ref());
    fields.insert_opt("weapon_type", d.weapon_type.as_ref());
    fields.insert_opt("other_weapon_type", d.other_weapon_type.as_ref());
    fields.insert_opt("caliber", d.caliber.as_ref());
    fields.insert_opt("other_caliber", d.other_caliber.as_ref());
    fields.insert_opt("broadhead", d.broadhead.as_ref());
    fields.insert_opt("other_broadhead", d.other_broadhead.as_ref());
    fields.insert_opt("location", d.location.as_ref());
    fields.insert_opt("shot_lat", d.shot_lat);
    fields.insert_opt("shot_lng", d.shot_lng);
    fields.insert_opt("recovery_lat", d.recovery_lat);
    fields.insert_opt("recovery_lng", d.recovery_lng);
    fields.insert_opt("distance_traveled", d.distance_traveled);
    fields.insert_opt("notes", d.notes.as_ref());
    fields.insert_opt("marker_color", d.marker_color.as_ref());
    fields
}
