// src/lib.rs

//! Lecture Board Library
//!
//! Fetches course materials and announcements published as JSON, and turns
//! them into searchable, filterable listings.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
