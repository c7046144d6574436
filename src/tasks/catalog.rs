use crate::error::Error;
use crate::events::{CatalogSnapshot, GalleryCommand};
use anyhow::{Context, Result};
use gallery_model::Artwork;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, recommended_watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use tracing::{debug, error, info, warn};

/// How often to retry watching a catalog directory that could not be watched.
pub const WATCH_RETRY: Duration = Duration::from_secs(5);

/// Read and check the artwork catalog at `path`.
pub fn load_catalog(path: &Path) -> Result<Vec<Artwork>, Error> {
    let bytes = std::fs::read(path).map_err(|source| Error::CatalogRead {
        path: path.to_path_buf(),
        source,
    })?;
    let artworks: Vec<Artwork> =
        serde_json::from_slice(&bytes).map_err(|source| Error::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;
    gallery_model::validate_catalog(&artworks).map_err(|err| Error::CatalogInvalid {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    Ok(artworks)
}

/// Publish the catalog to the gallery and republish whenever the file changes.
///
/// The gallery sees `Loading` first. A catalog that fails to load keeps the
/// last good one in place; if nothing was published yet, an empty catalog is
/// published so the page leaves its loading state. A directory that cannot
/// be watched yet is retried until it can; the task never exits on its own.
#[instrument(skip(to_gallery, cancel), fields(catalog = %path.display()))]
pub async fn run(
    path: PathBuf,
    to_gallery: Sender<GalleryCommand>,
    cancel: CancellationToken,
) -> Result<()> {
    let mut published = false;
    if to_gallery
        .send(GalleryCommand::Catalog(CatalogSnapshot::loading()))
        .await
        .is_err()
    {
        warn!("gallery channel closed before catalog load");
        return Ok(());
    }
    reload(&path, &to_gallery, &mut published).await;

    let mut watching = match watch_catalog(&path) {
        Ok(watching) => Some(watching),
        Err(err) => {
            error!("catalog watcher failed: {err:#}; retrying every {WATCH_RETRY:?}");
            None
        }
    };
    let mut retry = interval_at(Instant::now() + WATCH_RETRY, WATCH_RETRY);
    retry.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("cancel received; exiting catalog task");
                break;
            }

            _ = retry.tick(), if watching.is_none() => {
                match watch_catalog(&path) {
                    Ok(started) => {
                        watching = Some(started);
                        reload(&path, &to_gallery, &mut published).await;
                    }
                    Err(err) => debug!("catalog watcher still unavailable: {err:#}"),
                }
            }

            Some(res) = next_event(&mut watching) => match res {
                Ok(event) => {
                    if !touches_catalog(&event, &path) {
                        continue;
                    }
                    debug!(kind = ?event.kind, "catalog event");
                    match event.kind {
                        EventKind::Create(_)
                        | EventKind::Modify(ModifyKind::Data(_))
                        | EventKind::Modify(ModifyKind::Name(_))
                        | EventKind::Modify(ModifyKind::Any) => {
                            reload(&path, &to_gallery, &mut published).await;
                        }
                        EventKind::Remove(_) => {
                            warn!("catalog removed; keeping last published artworks");
                        }
                        _ => {
                            debug!(kind = ?event.kind, "catalog event ignored");
                        }
                    }
                }
                Err(err) => error!("watch error: {err}"),
            }
        }
    }
    Ok(())
}

/// A live notify watcher on the catalog's directory and its event stream.
struct CatalogWatch {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
}

fn watch_catalog(path: &Path) -> Result<CatalogWatch> {
    // Bridge notify callback -> async channel
    let (watch_tx, events) = mpsc::channel::<notify::Result<Event>>(128);
    let mut watcher = recommended_watcher(move |res| {
        let _ = watch_tx.blocking_send(res);
    })?;
    let dir = watch_dir(path);
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("cannot watch {}", dir.display()))?;
    info!(watching = %dir.display(), "catalog watcher initialized");
    Ok(CatalogWatch {
        _watcher: watcher,
        events,
    })
}

async fn next_event(watching: &mut Option<CatalogWatch>) -> Option<notify::Result<Event>> {
    match watching {
        Some(watching) => watching.events.recv().await,
        None => std::future::pending().await,
    }
}

async fn reload(path: &Path, to_gallery: &Sender<GalleryCommand>, published: &mut bool) {
    let snapshot = match load_catalog(path) {
        Ok(artworks) => {
            info!(artworks = artworks.len(), "catalog loaded");
            CatalogSnapshot::loaded(artworks)
        }
        Err(err) if *published => {
            warn!(error = %err, "catalog reload failed; keeping previous artworks");
            return;
        }
        Err(err) => {
            error!(error = %err, "catalog load failed; showing empty gallery");
            CatalogSnapshot::loaded(Vec::<Artwork>::new())
        }
    };
    if to_gallery
        .send(GalleryCommand::Catalog(snapshot))
        .await
        .is_ok()
    {
        *published = true;
    } else {
        warn!("gallery channel closed; catalog update dropped");
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn touches_catalog(event: &Event, path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    event.paths.iter().any(|p| p.file_name() == Some(name))
}
