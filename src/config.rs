use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// When a catalog refresh restarts the slideshow schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RearmPolicy {
    /// Only when the number of eligible artworks changes.
    #[default]
    Length,
    /// Also when the eligible artworks change at equal length.
    Contents,
}

impl fmt::Display for RearmPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Length => "length",
            Self::Contents => "contents",
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SlideshowOptions {
    /// Time each slide stays up before the next one, in ms.
    pub interval_ms: u64,
    pub rearm: RearmPolicy,
}

impl Default for SlideshowOptions {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            rearm: RearmPolicy::default(),
        }
    }
}

impl SlideshowOptions {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LightboxOptions {
    /// Delay between a close request and releasing the overlay content, in ms.
    pub grace_ms: u64,
}

impl Default for LightboxOptions {
    fn default() -> Self {
        Self { grace_ms: 300 }
    }
}

impl LightboxOptions {
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PageOptions {
    pub title: String,
    pub description: Option<String>,
    pub artist: String,
    pub tagline: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            title: "Galerie".into(),
            description: None,
            artist: "Ivan Gauthier".into(),
            tagline: "Artiste Contemporain".into(),
        }
    }
}

/// Settings the gallery controller itself needs.
#[derive(Debug, Clone, Default)]
pub struct GallerySettings {
    pub slideshow: SlideshowOptions,
    pub lightbox: LightboxOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// JSON file holding the artwork list.
    pub catalog_path: PathBuf,
    /// Directory served under `/images`.
    pub images_path: PathBuf,
    pub bind_address: SocketAddr,
    pub slideshow: SlideshowOptions,
    pub lightbox: LightboxOptions,
    pub page: PageOptions,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("artworks.json"),
            images_path: PathBuf::from("public/images"),
            bind_address: SocketAddr::from(([0, 0, 0, 0], 5000)),
            slideshow: SlideshowOptions::default(),
            lightbox: LightboxOptions::default(),
            page: PageOptions::default(),
        }
    }
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.slideshow.interval_ms > 0,
            "slideshow.interval-ms must be greater than zero"
        );
        ensure!(
            !self.catalog_path.as_os_str().is_empty(),
            "catalog-path must not be empty"
        );
        ensure!(
            !self.page.title.trim().is_empty(),
            "page.title must not be blank"
        );
        Ok(self)
    }

    pub fn gallery_settings(&self) -> GallerySettings {
        GallerySettings {
            slideshow: self.slideshow.clone(),
            lightbox: self.lightbox.clone(),
        }
    }
}
