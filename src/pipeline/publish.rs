// src/pipeline/publish.rs

//! Materials index generation.
//!
//! Scans the lectures directory of a site and writes the `materials.json`
//! consumed by the materials list.
//!
//! Recommended file naming: `YYYY-MM-DD_Topic_of_the_lecture.pdf`. Sub-folder
//! names become tags.

use std::path::{Path, PathBuf};

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use walkdir::WalkDir;

use crate::error::{AppError, Result};
use crate::models::PublishConfig;

/// Envelope written to `materials.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialsIndex {
    pub meta: IndexMeta,
    pub items: Vec<IndexedMaterial>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    /// UTC, `%Y-%m-%dT%H:%M:%SZ`
    pub generated_at: String,
}

/// One published file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedMaterial {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub year: String,
    pub date: String,
    pub tags: Vec<String>,
    pub description: String,
    /// Path relative to the site root
    pub url: String,
    /// Same as `url` for PDFs, empty otherwise
    pub preview: String,
}

/// Outcome of a publish run.
#[derive(Debug, Clone)]
pub struct PublishSummary {
    pub output: PathBuf,
    pub item_count: usize,
}

/// Build the index for `site_root` without writing it.
pub fn build_index(site_root: &Path, config: &PublishConfig) -> Result<MaterialsIndex> {
    let lectures = site_root.join(&config.lectures_dir);
    let generated_at = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    if !lectures.is_dir() {
        log::warn!(
            "No {} directory under {}; generating an empty index",
            config.lectures_dir,
            site_root.display()
        );
        return Ok(MaterialsIndex {
            meta: IndexMeta { generated_at },
            items: Vec::new(),
        });
    }

    let mut items = Vec::new();
    for entry in WalkDir::new(&lectures).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if file_name.starts_with('.') {
            continue;
        }
        let Some(extension) = entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
        else {
            continue;
        };
        if !config.allowed_extensions.iter().any(|a| *a == extension) {
            continue;
        }

        items.push(index_entry(site_root, &lectures, entry.path(), &file_name, &extension));
    }

    items.sort_by(|a, b| (&b.date, &b.title).cmp(&(&a.date, &a.title)));

    Ok(MaterialsIndex {
        meta: IndexMeta { generated_at },
        items,
    })
}

fn index_entry(
    site_root: &Path,
    lectures: &Path,
    path: &Path,
    file_name: &str,
    extension: &str,
) -> IndexedMaterial {
    let url = relative_path(site_root, path);
    let date = guess_date(file_name).unwrap_or_default();
    let year = date.get(..4).unwrap_or("").to_string();
    let kind = extension.to_uppercase();

    let mut tags = rel_tags(lectures, path);
    if !year.is_empty() && !tags.contains(&year) {
        tags.push(year.clone());
    }

    IndexedMaterial {
        id: slugify(&url),
        title: prettify_title(file_name),
        year,
        date,
        tags,
        description: format!("File: {kind}"),
        preview: if extension == "pdf" {
            url.clone()
        } else {
            String::new()
        },
        kind,
        url,
    }
}

/// Build the index and write it atomically to the configured output.
pub async fn publish(site_root: &Path, config: &PublishConfig) -> Result<PublishSummary> {
    let index = build_index(site_root, config)?;
    let output = site_root.join(&config.output);

    let mut bytes = serde_json::to_vec_pretty(&index)?;
    bytes.push(b'\n');
    write_atomic(&output, &bytes).await?;

    // Re-read what landed on disk
    let written = tokio::fs::read(&output).await?;
    serde_json::from_slice::<MaterialsIndex>(&written).map_err(|e| {
        AppError::validation(format!("generated {} is invalid: {e}", output.display()))
    })?;

    log::info!(
        "Generated {} with {} items",
        output.display(),
        index.items.len()
    );

    Ok(PublishSummary {
        output,
        item_count: index.items.len(),
    })
}

/// Write bytes atomically (write to temp, then rename).
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// `/`-joined path of `path` relative to `root`.
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// URL-safe identifier: lowercase ASCII alphanumerics separated by single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug.to_string()
    }
}

/// Date prefix of a file name: `YYYY-MM-DD` or `YYYYMMDD` followed by `_`, ` ` or `-`.
pub fn guess_date(name: &str) -> Option<String> {
    let patterns = [
        Regex::new(r"^(\d{4})-(\d{2})-(\d{2})[_ -]").ok()?,
        Regex::new(r"^(\d{4})(\d{2})(\d{2})[_ -]").ok()?,
    ];

    patterns.iter().find_map(|pattern| {
        let caps = pattern.captures(name)?;
        Some(format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
    })
}

/// Readable title from a file name: no extension, no date prefix, no underscores.
pub fn prettify_title(file_name: &str) -> String {
    let base = match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    };
    let base = strip_date_prefix(base).unwrap_or(base);
    let title = base
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        file_name.to_string()
    } else {
        title
    }
}

fn strip_date_prefix(base: &str) -> Option<&str> {
    let pattern = Regex::new(r"^\d{4}-?\d{2}-?\d{2}[_ -]+").ok()?;
    let found = pattern.find(base)?;
    Some(&base[found.end()..])
}

/// Tags from the sub-folders between the lectures directory and the file.
fn rel_tags(lectures: &Path, path: &Path) -> Vec<String> {
    let Ok(rel) = path.strip_prefix(lectures) else {
        return Vec::new();
    };
    let Some(parent) = rel.parent() else {
        return Vec::new();
    };
    parent
        .components()
        .map(|c| c.as_os_str().to_string_lossy().replace('_', " ").trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("wyklady/Sem_1/2024-03-01_Intro.pdf"), "wyklady-sem-1-2024-03-01-intro-pdf");
        assert_eq!(slugify("--"), "item");
        assert_eq!(slugify("Ćwiczenia 1"), "wiczenia-1");
    }

    #[test]
    fn test_guess_date() {
        assert_eq!(guess_date("2024-03-01_Intro.pdf").as_deref(), Some("2024-03-01"));
        assert_eq!(guess_date("20240301 Intro.pdf").as_deref(), Some("2024-03-01"));
        assert_eq!(guess_date("2024-03-01.pdf"), None);
        assert_eq!(guess_date("Intro.pdf"), None);
    }

    #[test]
    fn test_prettify_title() {
        assert_eq!(prettify_title("2024-03-01_Intro_to__sets.pdf"), "Intro to sets");
        assert_eq!(prettify_title("20240301-Graphs.pptx"), "Graphs");
        assert_eq!(prettify_title("Syllabus.docx"), "Syllabus");
        assert_eq!(prettify_title("2024-03-01_.pdf"), "2024-03-01_.pdf");
    }

    #[test]
    fn test_build_index_scans_allowed_files() {
        let site = TempDir::new().unwrap();
        touch(site.path(), "wyklady/2024-03-01_Intro.pdf");
        touch(site.path(), "wyklady/Sem_1/2024-04-02_Graphs.pptx");
        touch(site.path(), "wyklady/Sem_1/notes.txt");
        touch(site.path(), "wyklady/.hidden.pdf");
        touch(site.path(), "wyklady/Syllabus.docx");

        let index = build_index(site.path(), &PublishConfig::default()).unwrap();

        let titles: Vec<_> = index.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Graphs", "Intro", "Syllabus"]);

        let graphs = &index.items[0];
        assert_eq!(graphs.kind, "PPTX");
        assert_eq!(graphs.url, "wyklady/Sem_1/2024-04-02_Graphs.pptx");
        assert_eq!(graphs.tags, vec!["Sem 1", "2024"]);
        assert_eq!(graphs.year, "2024");
        assert!(graphs.preview.is_empty());

        let intro = &index.items[1];
        assert_eq!(intro.preview, "wyklady/2024-03-01_Intro.pdf");
        assert_eq!(intro.description, "File: PDF");

        let syllabus = &index.items[2];
        assert!(syllabus.date.is_empty());
        assert!(syllabus.tags.is_empty());
    }

    #[test]
    fn test_missing_lectures_dir_yields_empty_index() {
        let site = TempDir::new().unwrap();
        let index = build_index(site.path(), &PublishConfig::default()).unwrap();
        assert!(index.items.is_empty());
        assert!(index.meta.generated_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_publish_writes_readable_envelope() {
        let site = TempDir::new().unwrap();
        touch(site.path(), "wyklady/2024-03-01_Intro.pdf");

        let summary = publish(site.path(), &PublishConfig::default()).await.unwrap();

        assert_eq!(summary.item_count, 1);
        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(&summary.output).unwrap()).unwrap();
        let payload = crate::pipeline::normalize(raw);
        assert_eq!(payload.items.len(), 1);
        assert!(payload.generated_at().is_some());
        assert!(!site.path().join("data/materials.tmp").exists());
    }
}
