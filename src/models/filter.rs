//! Live filter state owned by a listing controller.

use serde::{Deserialize, Serialize};

/// Query and filter values driving the visible subset of a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Free-text query; empty matches everything
    pub query: String,

    /// Material type, compared case-insensitively
    pub type_filter: String,

    /// Material year, compared as a string
    pub year_filter: String,

    /// Announcement tag, exact membership
    pub tag_filter: String,

    /// Keep announcements whose expiry date has passed
    pub show_expired: bool,
}

/// Discrete filter controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    Type,
    Year,
    Tag,
}

impl FilterState {
    /// Set one discrete filter value.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FilterField::Type => self.type_filter = value,
            FilterField::Year => self.year_filter = value,
            FilterField::Tag => self.tag_filter = value,
        }
    }

    /// Lowercased, trimmed query used for substring matching.
    pub fn normalized_query(&self) -> String {
        self.query.trim().to_lowercase()
    }

    /// True when nothing narrows the list.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_updates_only_named_field() {
        let mut state = FilterState::default();
        state.set(FilterField::Year, "2024");

        assert_eq!(state.year_filter, "2024");
        assert!(state.type_filter.is_empty());
        assert!(!state.is_default());
    }

    #[test]
    fn test_normalized_query() {
        let state = FilterState {
            query: "  Algebra Liniowa ".into(),
            ..FilterState::default()
        };
        assert_eq!(state.normalized_query(), "algebra liniowa");
    }
}
