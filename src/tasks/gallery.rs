use crate::config::GallerySettings;
use crate::error::Error;
use crate::events::{GalleryCommand, TimerEvent};
use crate::view::{GalleryFrame, GalleryView};
use anyhow::Result;
use gallery_model::ArtworkId;
use tokio::select;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Cloneable front door to a running gallery task.
#[derive(Debug, Clone)]
pub struct GalleryHandle {
    commands: Sender<GalleryCommand>,
    frames: watch::Receiver<GalleryFrame>,
}

impl GalleryHandle {
    pub fn new(commands: Sender<GalleryCommand>, frames: watch::Receiver<GalleryFrame>) -> Self {
        Self { commands, frames }
    }

    /// Latest rendered frame.
    pub fn frame(&self) -> GalleryFrame {
        self.frames.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GalleryFrame> {
        self.frames.clone()
    }

    pub async fn open(&self, id: ArtworkId) -> Result<(), Error> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(GalleryCommand::Open { id, reply })
            .await
            .map_err(|_| Error::GalleryClosed)?;
        response.await.map_err(|_| Error::GalleryClosed)?
    }

    pub async fn close(&self) -> Result<(), Error> {
        self.commands
            .send(GalleryCommand::Close)
            .await
            .map_err(|_| Error::GalleryClosed)
    }
}

/// Own the gallery view and run every input to completion, one at a time.
///
/// Inputs are commands (catalog snapshots, open, close) and the events the
/// view's own timers emit. After each input the rendered frame is published
/// if it changed.
pub async fn run(
    settings: GallerySettings,
    mut commands: Receiver<GalleryCommand>,
    frames: watch::Sender<GalleryFrame>,
    cancel: CancellationToken,
) -> Result<()> {
    let (timer_tx, mut timer_rx) = mpsc::channel::<TimerEvent>(16);
    let mut view = GalleryView::new(&settings, timer_tx);
    publish(&frames, &view);

    loop {
        select! {
            _ = cancel.cancelled() => break,

            maybe_cmd = commands.recv() => {
                match maybe_cmd {
                    Some(cmd) => apply(&mut view, cmd),
                    None => {
                        debug!("command channel closed");
                        break;
                    }
                }
            }

            // The view keeps a sender alive, so this arm never sees `None`.
            Some(event) = timer_rx.recv() => {
                if !view.handle_timer(event) {
                    continue;
                }
            }
        }
        publish(&frames, &view);
    }

    view.teardown();
    info!("gallery task stopped");
    Ok(())
}

fn apply(view: &mut GalleryView, cmd: GalleryCommand) {
    match cmd {
        GalleryCommand::Catalog(snapshot) => view.apply_catalog(snapshot),
        GalleryCommand::Open { id, reply } => {
            let result = view.open_by_id(id);
            if let Err(err) = &result {
                warn!(%id, error = %err, "open rejected");
            }
            // Caller may have given up waiting; nothing to do then.
            let _ = reply.send(result);
        }
        GalleryCommand::Close => view.close(),
    }
}

fn publish(frames: &watch::Sender<GalleryFrame>, view: &GalleryView) {
    let next = view.render();
    frames.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}
