// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// The directory of a page URL: filename, query and fragment removed.
///
/// # Examples
/// ```
/// use lecture_board::utils::url::page_dir;
/// use url::Url;
///
/// let page = Url::parse("https://example.edu/course/index.html?tab=2").unwrap();
/// assert_eq!(page_dir(&page).as_str(), "https://example.edu/course/");
/// ```
pub fn page_dir(page: &Url) -> Url {
    let mut dir = page.clone();
    dir.set_query(None);
    dir.set_fragment(None);

    let path = dir.path();
    let trimmed = match path.rfind('/') {
        Some(idx) => path[..=idx].to_string(),
        None => "/".to_string(),
    };
    dir.set_path(&trimmed);
    dir
}

/// Resolve a published resource path against the page directory.
///
/// A leading `./` is dropped and whitespace trimmed; empty paths resolve to
/// nothing.
pub fn resolve_resource(dir: &Url, path: &str) -> Option<Url> {
    let clean = path.trim();
    let clean = clean.strip_prefix("./").unwrap_or(clean).trim();
    if clean.is_empty() {
        return None;
    }
    match dir.join(clean) {
        Ok(url) => Some(url),
        Err(e) => {
            log::debug!("Cannot resolve resource '{clean}' against {dir}: {e}");
            None
        }
    }
}

/// Append a `v=<token>` query pair so caches never serve a stale payload.
pub fn with_cache_bust(url: &Url, token: impl std::fmt::Display) -> Url {
    let mut busted = url.clone();
    busted
        .query_pairs_mut()
        .append_pair("v", &token.to_string());
    busted
}
