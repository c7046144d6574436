use std::sync::Arc;

use gallery_model::{Artwork, ArtworkId};
use serde::Serialize;
use tokio::sync::mpsc::Sender;
use tracing::{debug, info};

use crate::artwork_set::ArtworkSet;
use crate::config::{GallerySettings, RearmPolicy};
use crate::error::Error;
use crate::events::{CatalogSnapshot, TimerEvent};
use crate::lightbox::{LightboxController, LightboxPhase};
use crate::slideshow::SlideshowTimer;

/// Everything the page needs at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum GalleryFrame {
    Loading,
    Empty,
    Ready(ReadyFrame),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyFrame {
    /// `None` renders the static fallback background.
    pub slide: Option<Slide>,
    pub grid: Vec<Artwork>,
    /// Hover captions are hidden on narrow viewports.
    pub captions_suppressed: bool,
    pub lightbox: LightboxFrame,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub index: usize,
    pub count: usize,
    pub artwork: Artwork,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightboxFrame {
    pub phase: LightboxPhase,
    pub artwork: Option<Artwork>,
}

impl GalleryFrame {
    pub fn artworks(&self) -> &[Artwork] {
        match self {
            Self::Ready(frame) => &frame.grid,
            Self::Loading | Self::Empty => &[],
        }
    }
}

/// Slideshow, grid and lightbox for one gallery page.
///
/// Single-threaded: the owner feeds it catalog snapshots, user actions and
/// the [`TimerEvent`]s its own schedules emit, one at a time.
#[derive(Debug)]
pub struct GalleryView {
    rearm: RearmPolicy,
    // `None` while the catalog is loading.
    set: Option<ArtworkSet>,
    slideshow: SlideshowTimer,
    lightbox: LightboxController,
}

impl GalleryView {
    pub fn new(settings: &GallerySettings, timers: Sender<TimerEvent>) -> Self {
        debug!(
            interval_ms = settings.slideshow.interval_ms,
            rearm = %settings.slideshow.rearm,
            grace_ms = settings.lightbox.grace_ms,
            "gallery view configured"
        );
        Self {
            rearm: settings.slideshow.rearm,
            set: None,
            slideshow: SlideshowTimer::new(settings.slideshow.interval(), timers.clone()),
            lightbox: LightboxController::new(settings.lightbox.grace(), timers),
        }
    }

    pub fn apply_catalog(&mut self, snapshot: CatalogSnapshot) {
        if snapshot.is_loading {
            debug!("catalog loading");
            self.set = None;
            self.slideshow.stop();
            return;
        }
        let data = snapshot
            .data
            .unwrap_or_else(|| Arc::from(Vec::<Artwork>::new()));
        let next = ArtworkSet::derive(data);
        let rearm = self.needs_rearm(&next);
        info!(
            artworks = next.all().len(),
            eligible = next.eligible_len(),
            rearm,
            "catalog applied"
        );
        if rearm {
            self.slideshow.start(next.eligible_len());
        }
        self.set = Some(next);
    }

    fn needs_rearm(&self, next: &ArtworkSet) -> bool {
        if !self.slideshow.is_running() {
            return true;
        }
        if self.slideshow.eligible_count() != next.eligible_len() {
            return true;
        }
        match (self.rearm, &self.set) {
            (RearmPolicy::Length, _) => false,
            (RearmPolicy::Contents, Some(current)) => current.eligible_ids() != next.eligible_ids(),
            (RearmPolicy::Contents, None) => true,
        }
    }

    /// Open the lightbox on a grid artwork.
    pub fn open_by_id(&mut self, id: ArtworkId) -> Result<(), Error> {
        let artwork = self
            .set
            .as_ref()
            .and_then(|set| set.find(id))
            .cloned()
            .ok_or(Error::UnknownArtwork(id))?;
        self.lightbox.open(artwork);
        Ok(())
    }

    /// Open the lightbox on an artwork the caller already holds, e.g. one
    /// taken from a rendered frame. It stays pinned across catalog refreshes.
    pub fn open(&mut self, artwork: Artwork) {
        self.lightbox.open(artwork);
    }

    pub fn close(&mut self) {
        self.lightbox.close();
    }

    /// Route a timer event to its controller. Returns whether anything changed.
    pub fn handle_timer(&mut self, event: TimerEvent) -> bool {
        match event {
            TimerEvent::SlideTick(epoch) => self.slideshow.on_tick(epoch).is_some(),
            TimerEvent::GraceElapsed(epoch) => self.lightbox.on_grace_elapsed(epoch),
        }
    }

    /// Cancel both schedules before the view goes away.
    pub fn teardown(&mut self) {
        self.slideshow.stop();
        self.lightbox.shutdown();
        debug!("gallery view torn down");
    }

    pub fn slideshow(&self) -> &SlideshowTimer {
        &self.slideshow
    }

    pub fn lightbox(&self) -> &LightboxController {
        &self.lightbox
    }

    pub fn render(&self) -> GalleryFrame {
        let Some(set) = &self.set else {
            return GalleryFrame::Loading;
        };
        if set.is_empty() {
            return GalleryFrame::Empty;
        }
        let slide = self.slideshow.current_index().and_then(|index| {
            set.eligible_at(index).map(|artwork| Slide {
                index,
                count: set.eligible_len(),
                artwork: artwork.clone(),
            })
        });
        GalleryFrame::Ready(ReadyFrame {
            slide,
            grid: set.all().to_vec(),
            captions_suppressed: self.lightbox.suppresses_captions(),
            lightbox: LightboxFrame {
                phase: self.lightbox.phase(),
                artwork: self.lightbox.selected().cloned(),
            },
        })
    }
}
