// src/models/mod.rs

//! Domain models for the listing engine.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod filter;
mod item;
mod payload;
mod record;

// Re-export all public types
pub use config::{Config, ListingConfig, LoggingConfig, Messages, PublishConfig, SourceConfig};
pub use filter::{FilterField, FilterState};
pub use item::{Announcement, ListKind, Material};
pub use payload::NormalizedPayload;
pub use record::{
    AnnouncementRecord, DisplayRecord, EmptyReason, ListingUpdate, ListingView, MaterialAction,
    MaterialRecord, Tone,
};
