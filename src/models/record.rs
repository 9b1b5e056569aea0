//! Render-ready records and the updates a listing controller emits.

use serde::Serialize;

use crate::models::ListKind;
use crate::pipeline::Facets;

/// What a material card offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialAction {
    /// No resource path was published
    Unavailable,
    /// Download only
    Download { href: String },
    /// PDF: preview in the overlay, or download
    Preview { resource: String, href: String },
}

/// Display data for one material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialRecord {
    pub title: String,
    pub description: String,
    pub type_label: Option<String>,
    pub date: Option<String>,
    /// Only set when there is no date to show
    pub year: Option<String>,
    pub tags: Vec<String>,
    pub action: MaterialAction,
}

/// Display data for one announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnouncementRecord {
    pub title: String,
    pub body_lines: Vec<String>,
    pub important: bool,
    pub date: Option<String>,
    pub expires: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DisplayRecord {
    Material(MaterialRecord),
    Announcement(AnnouncementRecord),
}

/// Why a view has no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The loaded collection itself is empty
    NoItems,
    /// Filters or query excluded everything
    NoMatches,
}

/// A filtered, ordered result set ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingView {
    pub kind: ListKind,
    pub records: Vec<DisplayRecord>,
    pub shown: usize,
    pub total: usize,
    pub facets: Facets,
    pub generated_at: Option<String>,
    pub rendered_at: String,
    pub empty: Option<EmptyReason>,
    /// Text for the empty state, when `empty` is set
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Neutral,
    Ok,
    Bad,
}

/// Output of a listing controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "update", rename_all = "snake_case")]
pub enum ListingUpdate {
    /// Placeholder while a fetch is in flight
    Loading { kind: ListKind },
    Ready(ListingView),
    /// Diagnostic shown instead of the list
    Failed {
        kind: ListKind,
        url: String,
        message: String,
        hints: Vec<String>,
    },
    /// One-line status bar text
    Status {
        kind: ListKind,
        tone: Tone,
        text: String,
    },
}

impl ListingUpdate {
    pub fn kind(&self) -> ListKind {
        match self {
            ListingUpdate::Loading { kind }
            | ListingUpdate::Failed { kind, .. }
            | ListingUpdate::Status { kind, .. } => *kind,
            ListingUpdate::Ready(view) => view.kind,
        }
    }
}
