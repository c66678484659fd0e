//! # Domain Models
//!
//! These structs represent the core entities of Wildlog.
//! Records use the integer row id assigned by the store.

use bytes::Bytes;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::taxonomy::AnimalCategory;

pub type RecordId = i64;

/// Marker color used for harvests that were saved without one.
pub const DEFAULT_HARVEST_MARKER_COLOR: &str = "#3388ff";

/// Select value meaning "see the free-text override field".
pub const OTHER_SENTINEL: &str = "Other";

/// The two record kinds the query service lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Sighting,
    Harvest,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sighting => "sighting",
            Self::Harvest => "harvest",
        }
    }
}

/// A registry row. Created once from the taxonomy, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: i64,
    pub name: String,
    pub category: AnimalCategory,
}

/// A complete latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Both halves or nothing: a lone latitude or longitude is no point.
    pub fn pair(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self { lat, lng }),
            _ => None,
        }
    }
}

/// Mutable attributes of a sighting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SightingDetails {
    pub sighting_name: Option<String>,
    pub date_time: Option<NaiveDateTime>,
    pub weather: Option<String>,
    pub wind: Option<String>,
    pub wind_speed: Option<String>,
    pub wind_direction: Option<String>,
    pub humidity: Option<String>,
    pub temperature: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub marker_color: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub photo_filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sighting {
    pub id: RecordId,
    pub animal: Animal,
    #[serde(flatten)]
    pub details: SightingDetails,
}

impl Sighting {
    /// Where to put the map marker, if anywhere.
    pub fn map_point(&self) -> Option<GeoPoint> {
        GeoPoint::pair(self.details.lat, self.details.lng)
    }
}

/// Mutable attributes of a harvest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarvestDetails {
    pub harvest_name: String,
    pub date_time: Option<NaiveDateTime>,
    pub weather: Option<String>,
    pub wind_speed: Option<String>,
    pub wind_direction: Option<String>,
    pub humidity: Option<String>,
    pub weapon_type: Option<String>,
    pub other_weapon_type: Option<String>,
    pub caliber: Option<String>,
    pub other_caliber: Option<String>,
    pub broadhead: Option<String>,
    pub other_broadhead: Option<String>,
    pub location: Option<String>,
    pub shot_lat: Option<f64>,
    pub shot_lng: Option<f64>,
    pub recovery_lat: Option<f64>,
    pub recovery_lng: Option<f64>,
    pub distance_traveled: Option<f64>,
    pub notes: Option<String>,
    pub marker_color: Option<String>,
    pub photo_filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harvest {
    pub id: RecordId,
    pub animal: Animal,
    #[serde(flatten)]
    pub details: HarvestDetails,
}

impl Harvest {
    pub fn shot_point(&self) -> Option<GeoPoint> {
        GeoPoint::pair(self.details.shot_lat, self.details.shot_lng)
    }

    pub fn recovery_point(&self) -> Option<GeoPoint> {
        GeoPoint::pair(self.details.recovery_lat, self.details.recovery_lng)
    }

    pub fn marker_color(&self) -> &str {
        self.details
            .marker_color
            .as_deref()
            .unwrap_or(DEFAULT_HARVEST_MARKER_COLOR)
    }

    pub fn effective_weapon_type(&self) -> Option<&str> {
        resolve_other(
            self.details.weapon_type.as_deref(),
            self.details.other_weapon_type.as_deref(),
        )
    }

    pub fn effective_caliber(&self) -> Option<&str> {
        resolve_other(
            self.details.caliber.as_deref(),
            self.details.other_caliber.as_deref(),
        )
    }

    pub fn effective_broadhead(&self) -> Option<&str> {
        resolve_other(
            self.details.broadhead.as_deref(),
            self.details.other_broadhead.as_deref(),
        )
    }
}

/// The override wins only when "Other" was selected and it is non-empty.
pub fn resolve_other<'a>(selected: Option<&'a str>, other: Option<&'a str>) -> Option<&'a str> {
    match (selected, other) {
        (Some(OTHER_SENTINEL), Some(other)) if !other.trim().is_empty() => Some(other),
        (selected, _) => selected,
    }
}

/// Sort direction by event time. Anything but "asc" means newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(value) if value.trim().eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Filter and ordering for a record listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Exact animal name; `None` lists everything.
    pub animal: Option<String>,
    pub sort: SortOrder,
}

impl ListQuery {
    /// Builds a query from raw request parameters. A blank filter is no filter.
    pub fn from_params(animal: Option<&str>, sort: Option<&str>) -> Self {
        Self {
            animal: animal
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            sort: SortOrder::from_param(sort),
        }
    }
}

/// The result of a list query.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub records: Vec<T>,
    pub animal_filter: Option<String>,
    pub sort: SortOrder,
    /// Names referenced by at least one record of this kind, alphabetical.
    pub animals: Vec<String>,
}

/// A photo as received from the form layer.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: Option<mime::Mime>,
    pub data: Bytes,
}

/// A photo the store has accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    pub filename: String,
    /// `false` when the same bytes under the same name were already stored,
    /// in which case another record may share the file.
    pub fresh: bool,
}

/// Non-fatal conditions reported back to the submitting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Notice {
    Created,
    Updated,
    Deleted,
    UploadFailed,
}

impl Notice {
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::UploadFailed => "upload-failed",
        }
    }

    pub fn from_param(param: &str) -> Option<Self> {
        match param {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "deleted" => Some(Self::Deleted),
            "upload-failed" => Some(Self::UploadFailed),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Created => "Record successfully logged!",
            Self::Updated => "Record updated!",
            Self::Deleted => "Record deleted!",
            Self::UploadFailed => "Saved, but the photo could not be uploaded.",
        }
    }
}

/// What a create or update produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    pub id: RecordId,
    /// Set when the record was saved but its photo was not.
    pub upload_failure: Option<String>,
}

impl Saved {
    /// The notice to show after redirecting.
    pub fn notice(&self, success: Notice) -> Notice {
        if self.upload_failure.is_some() {
            Notice::UploadFailed
        } else {
            success
        }
    }
}
