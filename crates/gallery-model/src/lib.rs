use std::collections::HashSet;
use std::fmt;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Stable identifier of an artwork within a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtworkId(pub u64);

impl fmt::Display for ArtworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ArtworkId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A single piece as published in the artwork catalog.
///
/// Keys follow the catalog's camelCase wire names (`imageUrl`, `showInSlider`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: ArtworkId,
    pub title: String,
    #[serde(default)]
    pub technique: String,
    #[serde(default)]
    pub year: String,
    pub image_url: String,
    #[serde(default)]
    pub show_in_slider: bool,
}

impl Artwork {
    /// Caption line shown under the title, e.g. `Huile sur toile • 2021`.
    pub fn caption(&self) -> String {
        match (self.technique.trim(), self.year.trim()) {
            ("", "") => String::new(),
            (technique, "") => technique.to_string(),
            ("", year) => year.to_string(),
            (technique, year) => format!("{technique} • {year}"),
        }
    }
}

/// Check catalog-wide invariants serde cannot express.
pub fn validate_catalog(artworks: &[Artwork]) -> Result<()> {
    let mut seen = HashSet::with_capacity(artworks.len());
    for artwork in artworks {
        ensure!(
            seen.insert(artwork.id),
            "artwork id {} appears more than once",
            artwork.id
        );
        ensure!(
            !artwork.image_url.trim().is_empty(),
            "artwork {} has a blank imageUrl",
            artwork.id
        );
    }
    Ok(())
}
