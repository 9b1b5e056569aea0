// src/services/board.rs

//! The course page: both lists plus the preview overlay.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;

use crate::error::Result;
use crate::models::{
    Announcement, Config, DisplayRecord, ListKind, ListingUpdate, Material, MaterialAction,
    MaterialRecord,
};
use crate::services::listing::{InputEvent, ListingController, ListingSettings, LoadState};
use crate::services::preview::{DismissTrigger, OverlaySession, PreviewOverlay};
use crate::services::source::{JsonSource, source_for};

/// Everything that can happen on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Materials(InputEvent),
    Announcements(InputEvent),
    /// Preview the n-th visible material
    OpenPreview(usize),
    Dismiss(DismissTrigger),
}

/// Page-level state outside the two lists.
struct Page {
    overlay: PreviewOverlay,
    overlay_tx: watch::Sender<Option<OverlaySession>>,
    /// Materials as last rendered, in display order
    shown_materials: Vec<MaterialRecord>,
    /// Controller output, relayed to `updates`
    relay: UnboundedReceiver<ListingUpdate>,
    updates: UnboundedSender<ListingUpdate>,
}

impl Page {
    fn forward(&mut self, update: ListingUpdate) {
        if let (ListingUpdate::Ready(view), ListKind::Materials) = (&update, update.kind()) {
            self.shown_materials = view
                .records
                .iter()
                .filter_map(|record| match record {
                    DisplayRecord::Material(m) => Some(m.clone()),
                    DisplayRecord::Announcement(_) => None,
                })
                .collect();
        }
        let _ = self.updates.send(update);
    }

    /// Relay whatever the controllers have emitted so far.
    fn flush(&mut self) {
        while let Ok(update) = self.relay.try_recv() {
            self.forward(update);
        }
    }

    fn open_material(&mut self, n: usize) -> bool {
        let Some(material) = self.shown_materials.get(n) else {
            log::warn!("No visible material at position {n}");
            return false;
        };
        let MaterialAction::Preview { resource, .. } = &material.action else {
            log::warn!("Material at position {n} has no previewable PDF");
            return false;
        };

        let opened = self.overlay.open(&material.title, resource);
        self.publish_overlay();
        opened
    }

    fn dismiss(&mut self, trigger: DismissTrigger) {
        self.overlay.dismiss(trigger);
        self.publish_overlay();
    }

    fn publish_overlay(&self) {
        let session = self.overlay.session().cloned();
        self.overlay_tx.send_if_modified(|current| {
            if *current == session {
                return false;
            }
            *current = session;
            true
        });
    }
}

/// Both listing controllers and the single preview overlay.
pub struct Board {
    materials: ListingController<Material>,
    announcements: ListingController<Announcement>,
    page: Page,
}

impl Board {
    pub fn new(
        config: &Config,
        source: Arc<dyn JsonSource>,
        updates: UnboundedSender<ListingUpdate>,
    ) -> Result<Self> {
        let page = config.source.page_url()?;
        let (relay_tx, relay) = mpsc::unbounded_channel();
        let (overlay_tx, _) = watch::channel(None);

        Ok(Self {
            materials: ListingController::new(
                source.clone(),
                ListingSettings::from_config(config, ListKind::Materials)?,
                relay_tx.clone(),
            )?,
            announcements: ListingController::new(
                source,
                ListingSettings::from_config(config, ListKind::Announcements)?,
                relay_tx,
            )?,
            page: Page {
                overlay: PreviewOverlay::new(&page),
                overlay_tx,
                shown_materials: Vec::new(),
                relay,
                updates,
            },
        })
    }

    /// Build a board reading through the source matching the configured page.
    pub fn from_config(config: &Config, updates: UnboundedSender<ListingUpdate>) -> Result<Self> {
        Self::new(config, source_for(&config.source)?, updates)
    }

    /// Overlay session changes; rejected open requests produce none.
    pub fn watch_overlay(&self) -> watch::Receiver<Option<OverlaySession>> {
        self.page.overlay_tx.subscribe()
    }

    /// Load both lists concurrently. Each list fails on its own.
    pub async fn load_all(&mut self) -> (LoadState, LoadState) {
        let states = tokio::join!(self.materials.load(), self.announcements.load());
        self.page.flush();
        states
    }

    /// Preview the n-th visible material. Only PDF materials open.
    pub fn open_material(&mut self, n: usize) -> bool {
        self.page.open_material(n)
    }

    pub fn dismiss(&mut self, trigger: DismissTrigger) {
        self.page.dismiss(trigger);
    }

    pub async fn handle(&mut self, event: PageEvent) {
        match event {
            PageEvent::Materials(event) => self.materials.handle(event).await,
            PageEvent::Announcements(event) => self.announcements.handle(event).await,
            PageEvent::OpenPreview(n) => {
                self.open_material(n);
            }
            PageEvent::Dismiss(trigger) => self.dismiss(trigger),
        }
        self.page.flush();
    }

    /// Run any pending debounced queries.
    pub async fn settle(&mut self) {
        self.materials.settle().await;
        self.announcements.settle().await;
        self.page.flush();
    }

    /// Serve page events until the sender is dropped.
    ///
    /// Each list runs as its own task, so a slow fetch on one list never
    /// holds up the other list or the overlay.
    pub async fn run(self, mut events: UnboundedReceiver<PageEvent>) {
        let Board {
            materials,
            announcements,
            mut page,
        } = self;

        let (materials_tx, materials_rx) = mpsc::unbounded_channel();
        let (announcements_tx, announcements_rx) = mpsc::unbounded_channel();
        let materials_task = tokio::spawn(materials.run(materials_rx));
        let announcements_task = tokio::spawn(announcements.run(announcements_rx));

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(PageEvent::Materials(event)) => {
                        let _ = materials_tx.send(event);
                    }
                    Some(PageEvent::Announcements(event)) => {
                        let _ = announcements_tx.send(event);
                    }
                    Some(PageEvent::OpenPreview(n)) => {
                        page.open_material(n);
                    }
                    Some(PageEvent::Dismiss(trigger)) => page.dismiss(trigger),
                    None => break,
                },
                Some(update) = page.relay.recv() => page.forward(update),
            }
        }

        drop(materials_tx);
        drop(announcements_tx);
        for (kind, task) in [
            (ListKind::Materials, materials_task),
            (ListKind::Announcements, announcements_task),
        ] {
            if let Err(e) = task.await {
                log::error!("{kind} controller task failed: {e}");
            }
        }
        while let Some(update) = page.relay.recv().await {
            page.forward(update);
        }
        log::debug!("Board stopped");
    }

    pub fn materials(&self) -> &ListingController<Material> {
        &self.materials
    }

    pub fn announcements(&self) -> &ListingController<Announcement> {
        &self.announcements
    }

    pub fn overlay(&self) -> &PreviewOverlay {
        &self.page.overlay
    }
}
