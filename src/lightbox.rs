//! Open/close lifecycle of the lightbox overlay.
//!
//! `close()` does not drop the selected artwork right away: the overlay stays
//! in [`LightboxPhase::Closing`] for a grace window so the exit transition can
//! finish with its content still in place. The release is a scheduled event
//! that any later `open()` cancels.

use std::time::Duration;

use gallery_model::Artwork;
use serde::Serialize;
use tokio::sync::mpsc::Sender;
use tracing::{debug, trace};

use crate::events::{Epoch, TimerEvent};
use crate::schedule::{self, ScheduleHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightboxPhase {
    Closed,
    Open,
    Closing,
}

impl LightboxPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::Closing => "closing",
        }
    }
}

#[derive(Debug)]
pub struct LightboxController {
    grace: Duration,
    to_gallery: Sender<TimerEvent>,
    phase: LightboxPhase,
    // Owned copy, so a catalog refresh cannot swap what the overlay shows.
    selected: Option<Artwork>,
    epoch: Epoch,
    pending_close: Option<ScheduleHandle>,
}

impl LightboxController {
    pub fn new(grace: Duration, to_gallery: Sender<TimerEvent>) -> Self {
        Self {
            grace,
            to_gallery,
            phase: LightboxPhase::Closed,
            selected: None,
            epoch: Epoch::default(),
            pending_close: None,
        }
    }

    /// Show `artwork`. From `Open` or `Closing` this is a direct swap and
    /// any pending release is cancelled.
    pub fn open(&mut self, artwork: Artwork) {
        self.cancel_pending();
        debug!(id = %artwork.id, from = ?self.phase, "lightbox open");
        self.selected = Some(artwork);
        self.phase = LightboxPhase::Open;
    }

    /// Start dismissal. No-op unless the overlay is `Open`; a second close
    /// while `Closing` keeps the original deadline.
    pub fn close(&mut self) {
        if self.phase != LightboxPhase::Open {
            trace!(phase = ?self.phase, "lightbox close ignored");
            return;
        }
        self.phase = LightboxPhase::Closing;
        let epoch = self.epoch.bump();
        self.pending_close = Some(schedule::spawn_once(
            self.grace,
            self.to_gallery.clone(),
            TimerEvent::GraceElapsed(epoch),
        ));
        debug!(grace_ms = self.grace.as_millis() as u64, "lightbox closing");
    }

    /// Complete a dismissal. Returns `false` for a release that was
    /// superseded by a later `open()`.
    pub fn on_grace_elapsed(&mut self, epoch: Epoch) -> bool {
        if self.phase != LightboxPhase::Closing || epoch != self.epoch {
            trace!(?epoch, current = ?self.epoch, "ignoring stale lightbox release");
            return false;
        }
        self.pending_close = None;
        self.phase = LightboxPhase::Closed;
        if let Some(released) = self.selected.take() {
            debug!(id = %released.id, "lightbox closed");
        }
        true
    }

    /// Drop any scheduled release without changing the phase.
    pub fn shutdown(&mut self) {
        self.cancel_pending();
    }

    pub fn phase(&self) -> LightboxPhase {
        self.phase
    }

    pub fn selected(&self) -> Option<&Artwork> {
        self.selected.as_ref()
    }

    /// Grid captions hide on narrow screens whenever the overlay is up.
    pub fn suppresses_captions(&self) -> bool {
        self.phase != LightboxPhase::Closed
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending_close.take() {
            handle.cancel();
            self.epoch.bump();
            trace!("pending lightbox release cancelled");
        }
    }
}
