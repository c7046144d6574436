//! Binary entrypoint for the artwork gallery server.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use artwork_gallery::config::Configuration;
use artwork_gallery::events::GalleryCommand;
use artwork_gallery::tasks::{self, gallery::GalleryHandle};
use artwork_gallery::view::GalleryFrame;
use artwork_gallery::web;
use clap::{ArgAction, Parser};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "artwork-gallery",
    version,
    about = "Single-artist gallery with slideshow and lightbox"
)]
struct Args {
    /// Path to YAML config
    #[arg(short, long, value_name = "FILE", default_value = "gallery.yaml")]
    config: PathBuf,

    /// Override the slideshow cadence (ms)
    #[arg(long, value_name = "MILLIS")]
    interval_ms: Option<u64>,

    /// Override the listen address
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if verbosity > 0 {
        let level = match verbosity {
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        filter = filter.add_directive(
            format!("artwork_gallery={level}")
                .parse()
                .context("invalid log directive")?,
        );
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        interval_ms,
        bind,
        verbose,
    } = Args::parse();
    init_tracing(verbose)?;

    let mut cfg = if config.exists() {
        Configuration::from_yaml_file(&config)
            .with_context(|| format!("failed to load configuration from {}", config.display()))?
    } else {
        tracing::warn!(path = %config.display(), "config file not found; using defaults");
        Configuration::default()
    };
    if let Some(ms) = interval_ms {
        cfg.slideshow.interval_ms = ms;
    }
    if let Some(addr) = bind {
        cfg.bind_address = addr;
    }
    let cfg = cfg.validated().context("invalid configuration values")?;
    tracing::info!("Loaded configuration:\n{:#?}", cfg);

    // Catalog/Web -> Gallery
    let (command_tx, command_rx) = mpsc::channel::<GalleryCommand>(32);
    // Gallery -> Web
    let (frame_tx, frame_rx) = watch::channel(GalleryFrame::Loading);
    let gallery = GalleryHandle::new(command_tx.clone(), frame_rx);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let mut running = JoinSet::new();

    // Gallery
    running.spawn({
        let settings = cfg.gallery_settings();
        let cancel = cancel.clone();
        async move {
            tasks::gallery::run(settings, command_rx, frame_tx, cancel)
                .await
                .context("gallery task failed")
        }
    });

    // Catalog
    running.spawn({
        let path = cfg.catalog_path.clone();
        let to_gallery = command_tx.clone();
        let cancel = cancel.clone();
        async move {
            tasks::catalog::run(path, to_gallery, cancel)
                .await
                .context("catalog task failed")
        }
    });

    // Web
    running.spawn({
        let app = web::router(
            gallery,
            cfg.page.clone(),
            cfg.slideshow.interval(),
            &cfg.images_path,
        );
        let bind_addr = cfg.bind_address;
        let cancel = cancel.clone();
        async move { web::serve(app, bind_addr, cancel).await }
    });
    drop(command_tx);

    // The first task to finish (error or not) brings the others down.
    while let Some(res) = running.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task error: {e:?}"),
            Err(e) => tracing::error!("join error: {e}"),
        }
        cancel.cancel();
    }

    Ok(())
}
