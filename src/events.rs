use std::sync::Arc;

use gallery_model::{Artwork, ArtworkId};
use tokio::sync::oneshot;

use crate::error::Error;

/// Generation stamp of a schedule. Controllers bump theirs on every
/// stop/re-arm and drop events stamped with any other value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Epoch(pub(crate) u64);

impl Epoch {
    pub(crate) fn bump(&mut self) -> Epoch {
        self.0 = self.0.wrapping_add(1);
        *self
    }
}

/// Timer output delivered back into the gallery loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    SlideTick(Epoch),
    GraceElapsed(Epoch),
}

/// What the artwork collaborator currently reports.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub data: Option<Arc<[Artwork]>>,
    pub is_loading: bool,
}

impl CatalogSnapshot {
    pub fn loading() -> Self {
        Self {
            data: None,
            is_loading: true,
        }
    }

    pub fn loaded(artworks: impl Into<Arc<[Artwork]>>) -> Self {
        Self {
            data: Some(artworks.into()),
            is_loading: false,
        }
    }
}

/// Requests handled by the gallery task.
#[derive(Debug)]
pub enum GalleryCommand {
    Catalog(CatalogSnapshot),
    Open {
        id: ArtworkId,
        reply: oneshot::Sender<Result<(), Error>>,
    },
    Close,
}
