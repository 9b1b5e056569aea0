//! Service layer for the listing engine.
//!
//! This module contains:
//! - JSON sources over HTTP or the local filesystem (`JsonSource`)
//! - The per-list controller (`ListingController`)
//! - The PDF preview overlay (`PreviewOverlay`)
//! - The page combining both lists and the overlay (`Board`)

pub mod board;
pub mod listing;
pub mod preview;
pub mod source;

pub use board::{Board, PageEvent};
pub use listing::{Binding, InputEvent, ListingController, ListingSettings, LoadState};
pub use preview::{DismissTrigger, OverlaySession, PreviewOverlay};
pub use source::{FileSource, HttpSource, JsonSource, source_for};
