// src/services/listing.rs

//! Listing controller.
//!
//! One controller per list. It owns the in-memory collection and the filter
//! state, drives `fetch → normalize → facets → filter/sort → records`, and
//! reacts to input events. Event reactions are bound exactly once, after the
//! first successful load, no matter how often the data is reloaded.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    Config, EmptyReason, FilterField, FilterState, ListKind, ListingUpdate, ListingView, Messages,
    Tone,
};
use crate::pipeline::{Facets, Listable, base_collection, normalize, visible_indices};
use crate::services::JsonSource;
use crate::utils::url::{page_dir, resolve_resource, with_cache_bust};
use crate::utils::{Debouncer, cache_token, fill, render_timestamp};

/// Load lifecycle of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Whether input reactions have been registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Uninitialized,
    Bound,
}

/// Input coming from the filter controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Free-text search keystroke
    Query(String),
    /// Discrete control change (select, chip)
    Filter(FilterField, String),
    /// "Show expired" toggle
    ShowExpired(bool),
    Reset,
    /// Manual refresh
    Reload,
}

/// A registered response to one kind of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reaction {
    /// Debounced re-filter on query change
    Requery,
    /// Immediate re-filter on a discrete control change
    Refilter,
    /// Full reload when the expiry toggle flips
    ReloadOnExpiry,
    /// Defaults restored, immediate re-filter
    Reset,
}

impl Reaction {
    fn reacts_to(&self, event: &InputEvent) -> bool {
        matches!(
            (self, event),
            (Reaction::Requery, InputEvent::Query(_))
                | (Reaction::Refilter, InputEvent::Filter(..))
                | (Reaction::ReloadOnExpiry, InputEvent::ShowExpired(_))
                | (Reaction::Reset, InputEvent::Reset)
        )
    }
}

/// Per-list settings derived from [`Config`].
#[derive(Debug, Clone)]
pub struct ListingSettings {
    /// Page the list belongs to
    pub page: Url,
    /// Data file path relative to the page directory
    pub data_path: String,
    pub timeout: Duration,
    pub debounce: Duration,
    pub cache_bust: bool,
    pub messages: Messages,
}

impl ListingSettings {
    pub fn from_config(config: &Config, kind: ListKind) -> Result<Self> {
        let data_path = match kind {
            ListKind::Materials => &config.source.materials_path,
            ListKind::Announcements => &config.source.announcements_path,
        };
        Ok(Self {
            page: config.source.page_url()?,
            data_path: data_path.clone(),
            timeout: Duration::from_secs(config.source.timeout_secs),
            debounce: Duration::from_millis(config.listing.debounce_ms),
            cache_bust: config.source.cache_bust,
            messages: config.messages.clone(),
        })
    }
}

/// Message templates for one list kind.
struct KindText<'a> {
    loading: &'a str,
    loaded: &'a str,
    failed: &'a str,
    empty: &'a str,
    hints: &'a [String],
    generated_label: &'a str,
}

/// Controller for one list on a page.
pub struct ListingController<T: Listable> {
    source: Arc<dyn JsonSource>,
    settings: ListingSettings,
    page_dir: Url,
    target: Url,
    state: LoadState,
    binding: Binding,
    reactions: Vec<Reaction>,
    items: Vec<T>,
    generated_at: Option<String>,
    facets: Facets,
    filter: FilterState,
    visible: Vec<usize>,
    debouncer: Debouncer,
    updates: UnboundedSender<ListingUpdate>,
}

impl<T: Listable> ListingController<T> {
    /// Create an idle controller emitting on `updates`.
    pub fn new(
        source: Arc<dyn JsonSource>,
        settings: ListingSettings,
        updates: UnboundedSender<ListingUpdate>,
    ) -> Result<Self> {
        let page_dir = page_dir(&settings.page);
        let target = resolve_resource(&page_dir, &settings.data_path).ok_or_else(|| {
            AppError::config(format!(
                "cannot resolve {} data path '{}'",
                T::KIND,
                settings.data_path
            ))
        })?;

        Ok(Self {
            source,
            debouncer: Debouncer::new(settings.debounce),
            settings,
            page_dir,
            target,
            state: LoadState::Idle,
            binding: Binding::Uninitialized,
            reactions: Vec::new(),
            items: Vec::new(),
            generated_at: None,
            facets: Facets::default(),
            filter: FilterState::default(),
            visible: Vec::new(),
            updates,
        })
    }

    /// Fetch, normalize and render the list. Never fails: errors become a
    /// `Failed` state plus a diagnostic update.
    pub async fn load(&mut self) -> LoadState {
        self.state = LoadState::Loading;
        let loading = self.text().loading.to_string();
        self.emit_status(Tone::Neutral, loading);
        self.emit(ListingUpdate::Loading { kind: T::KIND });

        let target = if self.settings.cache_bust {
            with_cache_bust(&self.target, cache_token())
        } else {
            self.target.clone()
        };

        match self.fetch(&target).await {
            Ok(raw) => self.accept(raw),
            Err(e) => self.fail(&target, e),
        }
        self.state
    }

    /// Fetch with the configured timeout; on expiry the in-flight request is dropped.
    async fn fetch(&self, target: &Url) -> Result<Value> {
        log::info!("Loading {} from {}", T::KIND, target);
        match tokio::time::timeout(self.settings.timeout, self.source.fetch_json(target)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::connection(
                target.as_str(),
                format!("timed out after {}s", self.settings.timeout.as_secs_f32()),
            )),
        }
    }

    fn accept(&mut self, raw: Value) {
        let payload = normalize(raw);
        let items: Vec<T> = payload.items.iter().filter_map(T::from_value).collect();
        let skipped = payload.items.len() - items.len();
        if skipped > 0 {
            log::debug!("Skipped {skipped} non-object {} entries", T::KIND);
        }

        // Loads are serialized by `&mut self`; each one replaces the collection wholesale
        self.items = items;
        self.generated_at = payload.generated_at();
        let now = now();
        self.refresh_facets(now);
        self.state = LoadState::Ready;
        self.bind_reactions();
        self.refilter_at(now);

        let count = base_collection(&self.items, &self.filter, now).len();
        log::info!("Loaded {count} {}", T::KIND);

        let text = self.text();
        let generated = self
            .generated_at
            .as_deref()
            .map(|g| format!(" • {}: {g}", text.generated_label))
            .unwrap_or_default();
        let status = fill(
            text.loaded,
            &[("count", &count.to_string()), ("generated", &generated)],
        );
        self.emit_status(Tone::Ok, status);
    }

    fn fail(&mut self, target: &Url, error: AppError) {
        let url = error.url().unwrap_or(target.as_str()).to_string();
        log::error!("Failed to load {} from {}: {}", T::KIND, url, error);

        self.state = LoadState::Failed;
        let text = self.text();
        let failed = text.failed.to_string();
        let update = ListingUpdate::Failed {
            kind: T::KIND,
            url,
            message: error.to_string(),
            hints: text.hints.to_vec(),
        };
        self.emit(update);
        self.emit_status(Tone::Bad, failed);
    }

    /// Register input reactions; only the first call has any effect.
    fn bind_reactions(&mut self) {
        if self.binding == Binding::Bound {
            return;
        }
        self.binding = Binding::Bound;

        self.reactions
            .extend([Reaction::Requery, Reaction::Refilter, Reaction::Reset]);
        if T::KIND == ListKind::Announcements {
            self.reactions.push(Reaction::ReloadOnExpiry);
        }
        log::debug!("Bound {} input reactions for {}", self.reactions.len(), T::KIND);
    }

    /// Apply an input event: update the filter state, then run bound reactions.
    pub async fn handle(&mut self, event: InputEvent) {
        if self.react(event) {
            self.load().await;
        }
    }

    /// Synchronous part of [`handle`](Self::handle). Returns whether a reload is due.
    fn react(&mut self, event: InputEvent) -> bool {
        let mut expiry_changed = false;
        match &event {
            InputEvent::Query(text) => self.filter.query = text.clone(),
            InputEvent::Filter(field, value) => self.filter.set(*field, value.clone()),
            InputEvent::ShowExpired(show) => self.filter.show_expired = *show,
            InputEvent::Reset => {
                expiry_changed = self.filter.show_expired;
                self.filter = FilterState::default();
            }
            InputEvent::Reload => return true,
        }

        let bound: Vec<Reaction> = self
            .reactions
            .iter()
            .copied()
            .filter(|r| r.reacts_to(&event))
            .collect();

        let mut reload = false;
        for reaction in bound {
            match reaction {
                Reaction::Requery => self.debouncer.schedule(),
                Reaction::Refilter => self.refilter(),
                Reaction::ReloadOnExpiry => reload = true,
                Reaction::Reset => {
                    self.debouncer.cancel();
                    if expiry_changed {
                        self.refresh_facets(now());
                    }
                    self.refilter();
                }
            }
        }
        reload
    }

    /// Update the query; re-filtering waits for the debounce period.
    pub fn on_query_change(&mut self, text: impl Into<String>) {
        self.react(InputEvent::Query(text.into()));
    }

    /// Update a discrete filter and re-filter immediately.
    pub fn on_filter_change(&mut self, field: FilterField, value: impl Into<String>) {
        self.react(InputEvent::Filter(field, value.into()));
    }

    /// Restore default filters and re-filter immediately (no reload).
    pub fn reset(&mut self) {
        self.react(InputEvent::Reset);
    }

    /// Flip the expiry toggle; announcements reload in full.
    pub async fn set_show_expired(&mut self, show: bool) {
        self.handle(InputEvent::ShowExpired(show)).await;
    }

    /// Wait for the pending debounced query, then re-filter.
    ///
    /// Never resolves while nothing is pending; cancel-safe.
    pub async fn next_debounced(&mut self) {
        self.debouncer.elapsed().await;
        self.refilter();
    }

    /// Run a pending debounced re-filter, if any.
    pub async fn settle(&mut self) {
        if self.debouncer.is_pending() {
            self.next_debounced().await;
        }
    }

    /// Load once, then serve input events until the sender is dropped.
    pub async fn run(mut self, mut events: UnboundedReceiver<InputEvent>) {
        self.load().await;
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
                _ = self.next_debounced() => {}
            }
        }
        log::debug!("{} controller stopped", T::KIND);
    }

    fn refilter(&mut self) {
        self.refilter_at(now());
    }

    fn refilter_at(&mut self, now: NaiveDateTime) {
        self.visible = visible_indices(&self.items, &self.filter, now);
        let total = base_collection(&self.items, &self.filter, now).len();

        let records = self
            .visible
            .iter()
            .map(|&idx| self.items[idx].to_record(&self.page_dir))
            .collect();

        let empty = if total == 0 {
            Some(EmptyReason::NoItems)
        } else if self.visible.is_empty() {
            Some(EmptyReason::NoMatches)
        } else {
            None
        };
        let notice = empty.map(|reason| match reason {
            EmptyReason::NoItems => self.text().empty.to_string(),
            EmptyReason::NoMatches => self.settings.messages.no_matches.clone(),
        });

        let view = ListingView {
            kind: T::KIND,
            records,
            shown: self.visible.len(),
            total,
            facets: self.facets.clone(),
            generated_at: self.generated_at.clone(),
            rendered_at: render_timestamp(),
            empty,
            notice,
        };
        self.emit(ListingUpdate::Ready(view));
    }

    fn refresh_facets(&mut self, now: NaiveDateTime) {
        self.facets = T::facets(base_collection(&self.items, &self.filter, now));
    }

    fn text(&self) -> KindText<'_> {
        let m = &self.settings.messages;
        match T::KIND {
            ListKind::Materials => KindText {
                loading: &m.materials_loading,
                loaded: &m.materials_loaded,
                failed: &m.materials_failed,
                empty: &m.materials_empty,
                hints: &m.materials_hints,
                generated_label: "index",
            },
            ListKind::Announcements => KindText {
                loading: &m.announcements_loading,
                loaded: &m.announcements_loaded,
                failed: &m.announcements_failed,
                empty: &m.announcements_empty,
                hints: &m.announcements_hints,
                generated_label: "updated",
            },
        }
    }

    fn emit(&self, update: ListingUpdate) {
        // A dropped receiver just means nobody is watching
        let _ = self.updates.send(update);
    }

    fn emit_status(&self, tone: Tone, text: String) {
        self.emit(ListingUpdate::Status {
            kind: T::KIND,
            tone,
            text,
        });
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    /// Number of registered input reactions.
    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Items currently shown, in display order.
    pub fn visible(&self) -> impl Iterator<Item = &T> {
        self.visible.iter().map(|&idx| &self.items[idx])
    }

    pub fn generated_at(&self) -> Option<&str> {
        self.generated_at.as_deref()
    }

    /// The data file URL without cache busting.
    pub fn target(&self) -> &Url {
        &self.target
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
