//! Slideshow eligibility derived from the artwork catalog.

use std::sync::Arc;

use gallery_model::{Artwork, ArtworkId};

/// One catalog refresh worth of artworks plus the positions of the
/// slideshow-eligible ones.
///
/// Rebuilt from scratch on every refresh; never patched in place.
#[derive(Debug, Clone)]
pub struct ArtworkSet {
    all: Arc<[Artwork]>,
    eligible: Vec<usize>,
}

impl ArtworkSet {
    pub fn derive(all: Arc<[Artwork]>) -> Self {
        let eligible = all
            .iter()
            .enumerate()
            .filter(|(_, art)| art.show_in_slider)
            .map(|(idx, _)| idx)
            .collect();
        Self { all, eligible }
    }

    pub fn all(&self) -> &[Artwork] {
        &self.all
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn eligible_len(&self) -> usize {
        self.eligible.len()
    }

    /// Eligible artworks in catalog order.
    pub fn eligible(&self) -> impl Iterator<Item = &Artwork> + '_ {
        self.eligible.iter().map(|&idx| &self.all[idx])
    }

    pub fn eligible_at(&self, index: usize) -> Option<&Artwork> {
        self.eligible.get(index).map(|&idx| &self.all[idx])
    }

    pub fn eligible_ids(&self) -> Vec<ArtworkId> {
        self.eligible().map(|art| art.id).collect()
    }

    pub fn find(&self, id: ArtworkId) -> Option<&Artwork> {
        self.all.iter().find(|art| art.id == id)
    }
}
