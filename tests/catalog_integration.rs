use artwork_gallery::events::{CatalogSnapshot, GalleryCommand};
use artwork_gallery::tasks::catalog;
use gallery_model::ArtworkId;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const ONE: &str = r#"[{"id": 1, "title": "Aube", "technique": "Huile", "year": "2020", "imageUrl": "/images/aube.jpg", "showInSlider": true}]"#;
const TWO: &str = r#"[
  {"id": 1, "title": "Aube", "technique": "Huile", "year": "2020", "imageUrl": "/images/aube.jpg", "showInSlider": true},
  {"id": 2, "title": "Nuit", "technique": "Acrylique", "year": "2022", "imageUrl": "/images/nuit.jpg"}
]"#;

async fn next_snapshot(rx: &mut mpsc::Receiver<GalleryCommand>) -> CatalogSnapshot {
    loop {
        let cmd = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timeout waiting for catalog snapshot")
            .expect("catalog task closed its channel");
        if let GalleryCommand::Catalog(snapshot) = cmd {
            return snapshot;
        }
    }
}

fn ids(snapshot: &CatalogSnapshot) -> Vec<ArtworkId> {
    snapshot
        .data
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|a| a.id)
        .collect()
}

fn spawn(
    path: &Path,
) -> (
    mpsc::Receiver<GalleryCommand>,
    CancellationToken,
    tokio::task::JoinHandle<anyhow::Result<()>>,
) {
    let (tx, rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(catalog::run(path.to_path_buf(), tx, cancel.clone()));
    (rx, cancel, handle)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn startup_publishes_loading_then_catalog() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("artworks.json");
    fs::write(&path, ONE).unwrap();

    let (mut rx, cancel, handle) = spawn(&path);

    let first = next_snapshot(&mut rx).await;
    assert!(first.is_loading);
    assert!(first.data.is_none());

    let second = next_snapshot(&mut rx).await;
    assert!(!second.is_loading);
    assert_eq!(ids(&second), vec![ArtworkId(1)]);

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rewriting_catalog_publishes_new_artworks() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("artworks.json");
    fs::write(&path, ONE).unwrap();

    let (mut rx, cancel, handle) = spawn(&path);
    next_snapshot(&mut rx).await;
    next_snapshot(&mut rx).await;

    // Give the watcher a moment to register.
    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(&path, TWO).unwrap();

    loop {
        let snapshot = next_snapshot(&mut rx).await;
        if ids(&snapshot).len() == 2 {
            assert_eq!(ids(&snapshot), vec![ArtworkId(1), ArtworkId(2)]);
            break;
        }
    }

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreadable_catalog_falls_back_to_empty_gallery() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("artworks.json");
    fs::write(&path, b"{ definitely not json").unwrap();

    let (mut rx, cancel, handle) = spawn(&path);
    assert!(next_snapshot(&mut rx).await.is_loading);

    let fallback = next_snapshot(&mut rx).await;
    assert!(!fallback.is_loading);
    assert_eq!(fallback.data.as_deref().map(<[_]>::len), Some(0));

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn broken_rewrite_keeps_previous_catalog() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("artworks.json");
    fs::write(&path, ONE).unwrap();

    let (mut rx, cancel, handle) = spawn(&path);
    next_snapshot(&mut rx).await;
    next_snapshot(&mut rx).await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(&path, b"[{").unwrap();

    let quiet = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;
    assert!(quiet.is_err(), "broken catalog must not replace the last good one");

    cancel.cancel();
    handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_directory_keeps_task_alive_and_picks_catalog_up_later() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("not-yet");
    let path = dir.join("artworks.json");

    let (mut rx, cancel, handle) = spawn(&path);
    assert!(next_snapshot(&mut rx).await.is_loading);
    let fallback = next_snapshot(&mut rx).await;
    assert_eq!(fallback.data.as_deref().map(<[_]>::len), Some(0));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!handle.is_finished(), "catalog task must outlive a missing directory");

    fs::create_dir_all(&dir).unwrap();
    fs::write(&path, ONE).unwrap();
    let picked_up = tokio::time::timeout(catalog::WATCH_RETRY * 3, async {
        loop {
            if let Some(GalleryCommand::Catalog(snapshot)) = rx.recv().await {
                if ids(&snapshot) == vec![ArtworkId(1)] {
                    break;
                }
            }
        }
    })
    .await;
    assert!(picked_up.is_ok(), "catalog not picked up once its directory exists");

    cancel.cancel();
    handle.await.unwrap().unwrap();
}
