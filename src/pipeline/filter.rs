// src/pipeline/filter.rs

//! Filter & sort engine.
//!
//! A pure transform from `(items, filter state)` to the visible subset in
//! display order. Predicates run in a fixed order: type, year, tag, expiry,
//! free-text query. Announcements are then stably sorted (important first,
//! newest date first); materials keep their publish order.

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde_json::Value;
use url::Url;

use crate::models::{Announcement, DisplayRecord, FilterState, ListKind, Material};
use crate::pipeline::expiry::is_expired_at;
use crate::pipeline::facets::{Facets, announcement_facets, material_facets};
use crate::pipeline::render::{announcement_record, material_record};

/// An item kind the listing engine can show.
pub trait Listable: Clone + Send + Sync + 'static {
    const KIND: ListKind;

    /// Decode one normalized payload entry.
    fn from_value(value: &Value) -> Option<Self>;

    /// Discrete filter predicates (type, year, tag).
    fn passes_filters(&self, filter: &FilterState) -> bool;

    /// Searchable fields joined by spaces.
    fn search_blob(&self) -> String;

    fn expires(&self) -> Option<&str> {
        None
    }

    /// Display order; `Equal` keeps input order.
    fn display_order(_a: &Self, _b: &Self) -> Ordering {
        Ordering::Equal
    }

    fn facets<'a>(items: impl IntoIterator<Item = &'a Self>) -> Facets
    where
        Self: 'a;

    fn to_record(&self, page_dir: &Url) -> DisplayRecord;
}

impl Listable for Material {
    const KIND: ListKind = ListKind::Materials;

    fn from_value(value: &Value) -> Option<Self> {
        Material::from_value(value)
    }

    fn passes_filters(&self, filter: &FilterState) -> bool {
        let wanted_type = filter.type_filter.trim();
        if !wanted_type.is_empty() && self.type_label() != Some(wanted_type.to_uppercase()) {
            return false;
        }
        let wanted_year = filter.year_filter.trim();
        if !wanted_year.is_empty() && self.year.as_deref() != Some(wanted_year) {
            return false;
        }
        true
    }

    fn search_blob(&self) -> String {
        let fields = [
            self.title.as_deref(),
            self.description.as_deref(),
            self.kind.as_deref(),
            self.year.as_deref(),
            self.date.as_deref(),
        ];
        join_blob(fields.into_iter().flatten(), &self.tags)
    }

    fn facets<'a>(items: impl IntoIterator<Item = &'a Self>) -> Facets {
        material_facets(items)
    }

    fn to_record(&self, page_dir: &Url) -> DisplayRecord {
        DisplayRecord::Material(material_record(self, page_dir))
    }
}

impl Listable for Announcement {
    const KIND: ListKind = ListKind::Announcements;

    fn from_value(value: &Value) -> Option<Self> {
        Announcement::from_value(value)
    }

    fn passes_filters(&self, filter: &FilterState) -> bool {
        let wanted_tag = filter.tag_filter.trim();
        wanted_tag.is_empty() || self.tags.iter().any(|t| t == wanted_tag)
    }

    fn search_blob(&self) -> String {
        let fields = [
            self.title.as_deref(),
            self.body.as_deref(),
            self.date.as_deref(),
            self.expires.as_deref(),
        ];
        join_blob(fields.into_iter().flatten(), &self.tags)
    }

    fn expires(&self) -> Option<&str> {
        self.expires.as_deref()
    }

    fn display_order(a: &Self, b: &Self) -> Ordering {
        b.important.cmp(&a.important).then_with(|| {
            let a_date = a.date.as_deref().unwrap_or("");
            let b_date = b.date.as_deref().unwrap_or("");
            b_date.cmp(a_date)
        })
    }

    fn facets<'a>(items: impl IntoIterator<Item = &'a Self>) -> Facets {
        announcement_facets(items)
    }

    fn to_record(&self, _page_dir: &Url) -> DisplayRecord {
        DisplayRecord::Announcement(announcement_record(self))
    }
}

fn join_blob<'a>(fields: impl Iterator<Item = &'a str>, tags: &'a [String]) -> String {
    fields
        .chain(tags.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether an item survives the expiry gate.
fn within_expiry<T: Listable>(item: &T, filter: &FilterState, now: NaiveDateTime) -> bool {
    filter.show_expired || !is_expired_at(item.expires(), now)
}

/// Indices of the items passing every predicate, in display order.
pub fn visible_indices<T: Listable>(
    items: &[T],
    filter: &FilterState,
    now: NaiveDateTime,
) -> Vec<usize> {
    let query = filter.normalized_query();

    let mut visible: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            item.passes_filters(filter)
                && within_expiry(*item, filter, now)
                && (query.is_empty() || item.search_blob().to_lowercase().contains(&query))
        })
        .map(|(idx, _)| idx)
        .collect();

    // `sort_by` is stable: ties keep input order
    visible.sort_by(|&a, &b| T::display_order(&items[a], &items[b]));
    visible
}

/// The visible subset of `items` under `filter`, in display order.
pub fn apply<'a, T: Listable>(
    items: &'a [T],
    filter: &FilterState,
    now: NaiveDateTime,
) -> Vec<&'a T> {
    visible_indices(items, filter, now)
        .into_iter()
        .map(|idx| &items[idx])
        .collect()
}

/// The collection a list is viewed over: everything the expiry gate lets through.
pub fn base_collection<'a, T: Listable>(
    items: &'a [T],
    filter: &FilterState,
    now: NaiveDateTime,
) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| within_expiry(*item, filter, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn material(title: &str, kind: &str, year: &str) -> Material {
        Material {
            title: Some(title.into()),
            kind: Some(kind.into()),
            year: Some(year.into()),
            ..Material::default()
        }
    }

    fn announcement(title: &str, important: bool, date: Option<&str>) -> Announcement {
        Announcement {
            title: Some(title.into()),
            important,
            date: date.map(String::from),
            ..Announcement::default()
        }
    }

    fn material_titles(items: &[&Material]) -> Vec<String> {
        items
            .iter()
            .map(|m| m.title.clone().unwrap_or_default())
            .collect()
    }

    fn announcement_titles(items: &[&Announcement]) -> Vec<String> {
        items
            .iter()
            .map(|a| a.title.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_default_filter_returns_everything_in_order() {
        let items = vec![
            material("L3", "pdf", "2022"),
            material("L1", "lab", "2024"),
            material("L2", "pdf", "2023"),
        ];

        let visible = apply(&items, &FilterState::default(), now());

        assert_eq!(material_titles(&visible), vec!["L3", "L1", "L2"]);
    }

    #[test]
    fn test_type_filter_is_case_insensitive() {
        let items = vec![
            material("L1", "wyklad", "2023"),
            material("L2", "LAB", "2024"),
        ];
        let filter = FilterState {
            type_filter: "WYKLAD".into(),
            ..FilterState::default()
        };

        let visible = apply(&items, &filter, now());

        assert_eq!(material_titles(&visible), vec!["L1"]);
    }

    #[test]
    fn test_year_filter_is_string_equality() {
        let items = vec![
            material("L1", "pdf", "2023"),
            material("L2", "pdf", "2024"),
            Material {
                title: Some("L3".into()),
                ..Material::default()
            },
        ];
        let filter = FilterState {
            year_filter: "2024".into(),
            ..FilterState::default()
        };

        assert_eq!(material_titles(&apply(&items, &filter, now())), vec!["L2"]);
    }

    #[test]
    fn test_query_matches_any_searchable_field() {
        let mut tagged = material("Intro", "pdf", "2024");
        tagged.tags = vec!["Algebra".into()];
        let mut described = material("Second", "zip", "2023");
        described.description = Some("Homework SOLUTIONS".into());
        let items = vec![tagged, described, material("Third", "docx", "2022")];

        let by_tag = FilterState {
            query: "  algebra ".into(),
            ..FilterState::default()
        };
        assert_eq!(material_titles(&apply(&items, &by_tag, now())), vec!["Intro"]);

        let by_description = FilterState {
            query: "solutions".into(),
            ..FilterState::default()
        };
        assert_eq!(
            material_titles(&apply(&items, &by_description, now())),
            vec!["Second"]
        );

        let by_year = FilterState {
            query: "2022".into(),
            ..FilterState::default()
        };
        assert_eq!(material_titles(&apply(&items, &by_year, now())), vec!["Third"]);
    }

    #[test]
    fn test_predicates_compose() {
        let items = vec![
            material("Sets", "pdf", "2024"),
            material("Sets lab", "lab", "2024"),
            material("Sets old", "pdf", "2023"),
        ];
        let filter = FilterState {
            query: "sets".into(),
            type_filter: "pdf".into(),
            year_filter: "2024".into(),
            ..FilterState::default()
        };

        assert_eq!(material_titles(&apply(&items, &filter, now())), vec!["Sets"]);
    }

    #[test]
    fn test_importance_beats_date() {
        let items = vec![
            announcement("A", false, Some("2024-01-01")),
            announcement("B", true, Some("2023-06-01")),
        ];

        let visible = apply(&items, &FilterState::default(), now());

        assert_eq!(announcement_titles(&visible), vec!["B", "A"]);
    }

    #[test]
    fn test_newest_first_within_importance() {
        let items = vec![
            announcement("old", false, Some("2023-01-01")),
            announcement("undated", false, None),
            announcement("new", false, Some("2024-04-01")),
            announcement("urgent-old", true, Some("2022-01-01")),
            announcement("urgent-new", true, Some("2024-02-01")),
        ];

        let visible = apply(&items, &FilterState::default(), now());

        assert_eq!(
            announcement_titles(&visible),
            vec!["urgent-new", "urgent-old", "new", "old", "undated"]
        );
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let items = vec![
            announcement("first", false, Some("2024-01-01")),
            announcement("second", false, Some("2024-01-01")),
            announcement("third", false, Some("2024-01-01")),
            announcement("x", true, None),
            announcement("y", true, None),
        ];

        let visible = apply(&items, &FilterState::default(), now());

        assert_eq!(
            announcement_titles(&visible),
            vec!["x", "y", "first", "second", "third"]
        );
    }

    #[test]
    fn test_tag_filter_is_exact_membership() {
        let mut exam = announcement("exam", false, None);
        exam.tags = vec!["exam".into(), "2024".into()];
        let mut exams = announcement("exams", false, None);
        exams.tags = vec!["exams".into()];
        let items = vec![exam, exams];

        let filter = FilterState {
            tag_filter: "exam".into(),
            ..FilterState::default()
        };

        assert_eq!(announcement_titles(&apply(&items, &filter, now())), vec!["exam"]);
    }

    #[test]
    fn test_expiry_boundary() {
        let mut today = announcement("today", false, None);
        today.expires = Some("2024-05-10".into());
        let mut yesterday = announcement("yesterday", false, None);
        yesterday.expires = Some("2024-05-09".into());
        let mut garbled = announcement("garbled", false, None);
        garbled.expires = Some("soon".into());
        let items = vec![today, yesterday, garbled];

        let hidden = apply(&items, &FilterState::default(), now());
        assert_eq!(announcement_titles(&hidden), vec!["today", "garbled"]);

        let shown = FilterState {
            show_expired: true,
            ..FilterState::default()
        };
        assert_eq!(apply(&items, &shown, now()).len(), 3);
        assert_eq!(base_collection(&items, &FilterState::default(), now()).len(), 2);
    }

    #[test]
    fn test_announcement_query_covers_body_and_expiry() {
        let mut a = announcement("Exam", false, None);
        a.body = Some("Bring a calculator".into());
        a.expires = Some("2030-01-31".into());
        let items = vec![a, announcement("Other", false, None)];

        let by_body = FilterState {
            query: "CALCULATOR".into(),
            ..FilterState::default()
        };
        assert_eq!(apply(&items, &by_body, now()).len(), 1);

        let by_expiry = FilterState {
            query: "2030-01".into(),
            ..FilterState::default()
        };
        assert_eq!(apply(&items, &by_expiry, now()).len(), 1);
    }

    #[test]
    fn test_visible_indices_reference_input_positions() {
        let items = vec![
            announcement("A", false, Some("2024-01-01")),
            announcement("B", true, Some("2023-06-01")),
        ];
        assert_eq!(
            visible_indices(&items, &FilterState::default(), now()),
            vec![1, 0]
        );
    }
}
