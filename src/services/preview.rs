// src/services/preview.rs

//! Single-session preview overlay.
//!
//! At most one session exists. Opening while open replaces the session;
//! every dismiss path converges on [`PreviewOverlay::close`].

use serde::Serialize;
use url::Url;

use crate::utils::url::{page_dir, resolve_resource};

const DEFAULT_TITLE: &str = "Preview";

/// The resource currently shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlaySession {
    pub title: String,
    pub resource_url: Url,
}

/// User actions that dismiss the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    CloseButton,
    /// Escape key / cancel signal
    Escape,
    /// Click on the backdrop around the preview
    Backdrop,
    /// The download link inside the overlay
    DownloadLink,
}

/// Preview overlay state machine: `Closed → Open → Closed`.
#[derive(Debug, Clone)]
pub struct PreviewOverlay {
    dir: Url,
    session: Option<OverlaySession>,
}

impl PreviewOverlay {
    /// Create a closed overlay resolving resources against `page`'s directory.
    pub fn new(page: &Url) -> Self {
        Self {
            dir: page_dir(page),
            session: None,
        }
    }

    /// Open (or replace) the session. Empty or unresolvable URLs are ignored.
    ///
    /// Returns whether the overlay state changed.
    pub fn open(&mut self, title: &str, url: &str) -> bool {
        if url.trim().is_empty() {
            log::warn!("Preview requested without a URL; ignoring");
            return false;
        }
        let Some(resource_url) = resolve_resource(&self.dir, url) else {
            log::warn!("Preview URL '{url}' cannot be resolved; ignoring");
            return false;
        };

        let title = match title.trim() {
            "" => DEFAULT_TITLE.to_string(),
            t => t.to_string(),
        };
        if let Some(previous) = &self.session {
            log::debug!("Replacing preview of {}", previous.resource_url);
        }
        log::debug!("Opening preview of {resource_url}");
        self.session = Some(OverlaySession {
            title,
            resource_url,
        });
        true
    }

    /// Drop the session, releasing the displayed resource. No-op when closed.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("Closed preview of {}", session.resource_url);
        }
    }

    /// Route a dismiss action to [`close`](Self::close).
    pub fn dismiss(&mut self, trigger: DismissTrigger) {
        if self.is_open() {
            log::debug!("Preview dismissed via {trigger:?}");
        }
        self.close();
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&OverlaySession> {
        self.session.as_ref()
    }

    /// URL currently loaded in the preview frame, if any.
    pub fn displayed_resource(&self) -> Option<&Url> {
        self.session.as_ref().map(|s| &s.resource_url)
    }
}
