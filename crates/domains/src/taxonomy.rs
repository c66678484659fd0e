//! # Taxonomy
//!
//! The fixed reference table of animal categories and the animals in each.
//! This is the only place valid animal names are defined; the persisted
//! animal registry is seeded from it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of animal categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimalCategory {
    #[serde(rename = "Big Game")]
    BigGame,
    #[serde(rename = "Small Game")]
    SmallGame,
    #[serde(rename = "Upland Birds")]
    UplandBirds,
    #[serde(rename = "Waterfowl")]
    Waterfowl,
    #[serde(rename = "Predators & Other")]
    PredatorsOther,
}

impl AnimalCategory {
    /// Label as shown in the UI and stored in `animal.animal_class`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BigGame => "Big Game",
            Self::SmallGame => "Small Game",
            Self::UplandBirds => "Upland Birds",
            Self::Waterfowl => "Waterfowl",
            Self::PredatorsOther => "Predators & Other",
        }
    }

    /// Animal names in this category, in display order.
    pub fn animals(&self) -> &'static [&'static str] {
        TAXONOMY
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, names)| *names)
            .unwrap_or(&[])
    }
}

impl fmt::Display for AnimalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown animal category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for AnimalCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TAXONOMY
            .iter()
            .map(|(category, _)| *category)
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

pub const TAXONOMY: &[(AnimalCategory, &[&str])] = &[
    (
        AnimalCategory::BigGame,
        &[
            "American Bison",
            "Black Bear",
            "Brown Bear",
            "Caribou",
            "Cougar",
            "Elk",
            "Moose",
            "Mule Deer",
            "Pronghorn",
            "Whitetail Deer(Buck)",
            "Whitetail Deer(Doe)",
            "Whitetail Deer(Button Buck)",
            "Wild Boar",
        ],
    ),
    (
        AnimalCategory::SmallGame,
        &[
            "Beaver",
            "Cottontail",
            "Crow",
            "Groundhog",
            "Opossum",
            "Porcupine",
            "Rabbit",
            "Raccoon",
            "Squirrel",
        ],
    ),
    (
        AnimalCategory::UplandBirds,
        &[
            "Bobwhite Quail",
            "Chukar Partridge",
            "Grouse (Ruffed, Sage, Spruce, Sharp-Tailed)",
            "Hungarian Partridge",
            "Pheasant",
            "Ptarmigan",
            "Turkey",
            "Woodcock",
        ],
    ),
    (
        AnimalCategory::Waterfowl,
        &[
            "Duck",
            "Mallard",
            "Teal",
            "Wood Duck",
            "Canada Goose",
            "Goose",
            "Brant",
            "Mergansers",
        ],
    ),
    (
        AnimalCategory::PredatorsOther,
        &["Coyote", "Fox", "Bobcat", "Nutria", "Other"],
    ),
];

/// Placeholder shown in the animal selector before a category is chosen.
pub const ANIMAL_PLACEHOLDER: (&str, &str) = ("", "Select an animal first");

/// Every category, in display order.
pub fn categories() -> impl Iterator<Item = AnimalCategory> {
    TAXONOMY.iter().map(|(category, _)| *category)
}

/// Every (category, name) pair, in display order.
pub fn entries() -> impl Iterator<Item = (AnimalCategory, &'static str)> {
    TAXONOMY
        .iter()
        .flat_map(|(category, names)| names.iter().map(move |name| (*category, *name)))
}

/// Flat (value, label) pairs across all categories.
pub fn all_choices() -> Vec<(&'static str, &'static str)> {
    entries().map(|(_, name)| (name, name)).collect()
}

/// Category of a known animal name.
pub fn category_of(name: &str) -> Option<AnimalCategory> {
    entries()
        .find(|(_, candidate)| *candidate == name)
        .map(|(category, _)| category)
}

/// Resolves the animal selector's options from the selected category.
///
/// A known category yields its animals; an unknown or absent one yields only
/// the placeholder. Form rendering and form validation both go through here so
/// the offered list and the accepted list are always the same list.
pub fn animal_choices_for(category: Option<&str>) -> Vec<(&'static str, &'static str)> {
    match category.and_then(|c| c.parse::<AnimalCategory>().ok()) {
        Some(category) => category.animals().iter().map(|name| (*name, *name)).collect(),
        None => vec![ANIMAL_PLACEHOLDER],
    }
}

/// Whether `name` is an acceptable animal for the given category selection.
///
/// With `category = None` the flat list applies.
pub fn is_valid_animal(category: Option<&str>, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    match category {
        Some(category) => animal_choices_for(Some(category))
            .iter()
            .any(|(value, _)| *value == name),
        None => category_of(name).is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn category_labels_round_trip() {
        for category in categories() {
            assert_eq!(category.as_str().parse::<AnimalCategory>(), Ok(category));
        }
        assert!("Fish".parse::<AnimalCategory>().is_err());
    }

    #[test]
    fn animal_names_are_unique_across_categories() {
        let names: Vec<_> = entries().map(|(_, name)| name).collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn flat_view_covers_every_category() {
        let flat = all_choices();
        let total: usize = TAXONOMY.iter().map(|(_, names)| names.len()).sum();
        assert_eq!(flat.len(), total);
        assert!(flat.contains(&("Elk", "Elk")));
        assert!(flat.contains(&("Mallard", "Mallard")));
    }

    #[test]
    fn choices_narrow_to_selected_category() {
        let choices = animal_choices_for(Some("Waterfowl"));
        assert_eq!(choices.first(), Some(&("Duck", "Duck")));
        assert!(!choices.iter().any(|(value, _)| *value == "Elk"));
    }

    #[test]
    fn unknown_or_missing_category_gives_placeholder() {
        assert_eq!(animal_choices_for(None), vec![ANIMAL_PLACEHOLDER]);
        assert_eq!(animal_choices_for(Some("Dinosaurs")), vec![ANIMAL_PLACEHOLDER]);
    }

    #[test]
    fn validation_uses_the_submitted_category() {
        assert!(is_valid_animal(Some("Big Game"), "Elk"));
        assert!(!is_valid_animal(Some("Small Game"), "Elk"));
        assert!(!is_valid_animal(Some("Dinosaurs"), ""));
        assert!(is_valid_animal(None, "Coyote"));
        assert!(!is_valid_animal(None, "Unicorn"));
    }

    #[test]
    fn category_of_known_animal() {
        assert_eq!(category_of("Turkey"), Some(AnimalCategory::UplandBirds));
        assert_eq!(category_of("Unicorn"), None);
    }
}
