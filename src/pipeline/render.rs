// src/pipeline/render.rs

//! Turn items into display records.

use url::Url;

use crate::models::{
    Announcement, AnnouncementRecord, Material, MaterialAction, MaterialRecord,
};
use crate::utils::url::resolve_resource;

const MATERIAL_TITLE: &str = "File";
const ANNOUNCEMENT_TITLE: &str = "Announcement";

/// Display record for a material; hrefs resolve against `page_dir`.
pub fn material_record(material: &Material, page_dir: &Url) -> MaterialRecord {
    let raw_url = material.url.as_deref().unwrap_or("").trim();
    let action = match resolve_resource(page_dir, raw_url) {
        None => MaterialAction::Unavailable,
        Some(href) if material.is_pdf() => MaterialAction::Preview {
            resource: raw_url.to_string(),
            href: href.to_string(),
        },
        Some(href) => MaterialAction::Download {
            href: href.to_string(),
        },
    };

    MaterialRecord {
        title: material
            .title
            .clone()
            .unwrap_or_else(|| MATERIAL_TITLE.to_string()),
        description: material.description.clone().unwrap_or_default(),
        type_label: material.type_label(),
        date: material.date.clone(),
        year: material.year.clone().filter(|_| material.date.is_none()),
        tags: material.tags.clone(),
        action,
    }
}

/// Display record for an announcement.
pub fn announcement_record(announcement: &Announcement) -> AnnouncementRecord {
    AnnouncementRecord {
        title: announcement
            .title
            .clone()
            .unwrap_or_else(|| ANNOUNCEMENT_TITLE.to_string()),
        body_lines: announcement
            .body
            .as_deref()
            .map(|b| b.lines().map(String::from).collect())
            .unwrap_or_default(),
        important: announcement.important,
        date: announcement.date.clone(),
        expires: announcement.expires.clone(),
        tags: announcement.tags.clone(),
    }
}
