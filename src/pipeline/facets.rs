// src/pipeline/facets.rs

//! Facet extraction.
//!
//! Facets are always derived from the collection currently in memory, so a
//! reload replaces them wholesale.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{Announcement, Material};

/// Distinct filterable values of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    /// Upper-cased material types, ascending
    pub types: Vec<String>,
    /// Material years, descending
    pub years: Vec<String>,
    /// Announcement tags, ascending
    pub tags: Vec<String>,
}

impl Facets {
    /// The first `limit` types, offered as quick filters.
    pub fn type_chips(&self, limit: usize) -> &[String] {
        &self.types[..limit.min(self.types.len())]
    }
}

/// Types and years of a material collection.
pub fn material_facets<'a>(items: impl IntoIterator<Item = &'a Material>) -> Facets {
    let mut types = BTreeSet::new();
    let mut years = BTreeSet::new();

    for material in items {
        if let Some(label) = material.type_label() {
            types.insert(label);
        }
        if let Some(year) = material.year.as_ref().filter(|y| !y.is_empty()) {
            years.insert(year.clone());
        }
    }

    Facets {
        types: types.into_iter().collect(),
        years: years.into_iter().rev().collect(),
        tags: Vec::new(),
    }
}

/// Tags of an announcement collection.
pub fn announcement_facets<'a>(items: impl IntoIterator<Item = &'a Announcement>) -> Facets {
    let tags: BTreeSet<String> = items
        .into_iter()
        .flat_map(|a| a.tags.iter())
        .filter(|t| !t.is_empty())
        .cloned()
        .collect();

    Facets {
        tags: tags.into_iter().collect(),
        ..Facets::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(kind: &str, year: &str) -> Material {
        Material {
            title: Some("L".into()),
            kind: Some(kind.into()),
            year: Some(year.into()).filter(|y: &String| !y.is_empty()),
            ..Material::default()
        }
    }

    fn is_sorted_unique<T: Ord>(values: &[T], descending: bool) -> bool {
        values.windows(2).all(|w| {
            if descending {
                w[0] > w[1]
            } else {
                w[0] < w[1]
            }
        })
    }

    #[test]
    fn test_material_types_uppercased_and_deduplicated() {
        let items = vec![
            material("wyklad", "2023"),
            material("LAB", "2024"),
            material(" Wyklad ", "2024"),
            material("", "2022"),
            material("   ", ""),
        ];

        let facets = material_facets(&items);

        assert_eq!(facets.types, vec!["LAB", "WYKLAD"]);
        assert_eq!(facets.years, vec!["2024", "2023", "2022"]);
        assert!(facets.tags.is_empty());
    }

    #[test]
    fn test_facets_are_sorted_without_duplicates() {
        let items: Vec<Material> = ["pdf", "zip", "PDF", "docx", "mp4", "Zip"]
            .iter()
            .zip(["2021", "2024", "2021", "2019", "2024", "2020"])
            .map(|(k, y)| material(k, y))
            .collect();

        let facets = material_facets(&items);

        assert!(is_sorted_unique(&facets.types, false));
        assert!(is_sorted_unique(&facets.years, true));
        assert_eq!(facets.types.len(), 4);
        assert_eq!(facets.years.len(), 4);
    }

    #[test]
    fn test_announcement_tags_flattened() {
        let items = vec![
            Announcement {
                tags: vec!["exam".into(), "2024".into()],
                ..Announcement::default()
            },
            Announcement {
                tags: vec!["exam".into(), "lab".into()],
                ..Announcement::default()
            },
            Announcement::default(),
        ];

        let facets = announcement_facets(&items);

        assert_eq!(facets.tags, vec!["2024", "exam", "lab"]);
        assert!(facets.types.is_empty());
        assert!(facets.years.is_empty());
    }

    #[test]
    fn test_empty_collection_has_no_facets() {
        assert_eq!(material_facets(&Vec::<Material>::new()), Facets::default());
        assert_eq!(announcement_facets(&Vec::<Announcement>::new()), Facets::default());
    }

    #[test]
    fn test_type_chips_limit() {
        let facets = Facets {
            types: vec!["A".into(), "B".into(), "C".into()],
            ..Facets::default()
        };
        assert_eq!(facets.type_chips(2), ["A", "B"]);
        assert_eq!(facets.type_chips(12).len(), 3);
    }
}
