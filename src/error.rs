use std::path::PathBuf;

use gallery_model::ArtworkId;
use thiserror::Error;

/// Library error type for gallery operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog file could not be read.
    #[error("failed to read catalog {}: {source}", path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not a valid artwork list.
    #[error("failed to parse catalog {}: {source}", path.display())]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The catalog parsed but breaks a catalog-wide invariant.
    #[error("invalid catalog {}: {reason}", path.display())]
    CatalogInvalid { path: PathBuf, reason: String },

    /// No artwork with this id is part of the current gallery.
    #[error("unknown artwork {0}")]
    UnknownArtwork(ArtworkId),

    /// The gallery task has stopped and no longer accepts requests.
    #[error("gallery task is not running")]
    GalleryClosed,
}
