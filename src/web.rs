use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::{Body, to_bytes};
use axum::extract::{Path, Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gallery_model::{Artwork, ArtworkId};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::PageOptions;
use crate::error::Error;
use crate::page;
use crate::tasks::gallery::GalleryHandle;
use crate::view::GalleryFrame;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self'; img-src 'self' data:; frame-src 'self' https://www.youtube.com; connect-src 'self'; style-src 'self' 'unsafe-inline'; object-src 'none'; upgrade-insecure-requests";
const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";
const LOG_LINE_MAX_CHARS: usize = 80;

#[derive(Clone)]
struct AppState {
    gallery: GalleryHandle,
    page: Arc<PageOptions>,
    refresh: Duration,
}

/// Build the gallery router.
///
/// `refresh` is the slideshow cadence used for the page's reload hint.
pub fn router(
    gallery: GalleryHandle,
    page: PageOptions,
    refresh: Duration,
    images_path: &FsPath,
) -> Router {
    let state = AppState {
        gallery,
        page: Arc::new(page),
        refresh,
    };
    let images = Router::new()
        .fallback_service(ServeDir::new(images_path))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(IMMUTABLE_CACHE),
        ));

    Router::new()
        .route("/", get(index))
        .route("/lightbox/close", post(close_form))
        .route("/lightbox/{id}", post(open_form))
        .route("/api/artworks", get(list_artworks))
        .route("/api/gallery", get(current_frame))
        .route("/api/lightbox/close", post(close_api))
        .route("/api/lightbox/{id}", post(open_api))
        .nest_service("/images", images)
        .with_state(state)
        .layer(middleware::from_fn(log_api))
        .layer(middleware::from_fn(security_headers))
}

/// Serve `app` on `bind_addr` until `cancel` fires.
pub async fn serve(app: Router, bind_addr: SocketAddr, cancel: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind gallery server on {bind_addr}"))?;
    tracing::info!(%bind_addr, "serving gallery");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await
        .context("gallery server exited")?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let frame = state.gallery.frame();
    Html(page::render(&frame, &state.page, state.refresh))
}

async fn open_form(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Redirect, (StatusCode, Html<String>)> {
    match state.gallery.open(ArtworkId(id)).await {
        Ok(()) => Ok(Redirect::to("/")),
        Err(err) => {
            let status = status_for(&err);
            Err((
                status,
                Html(page::render_message(
                    &state.page,
                    "Œuvre introuvable",
                    &err.to_string(),
                )),
            ))
        }
    }
}

async fn close_form(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    state.gallery.close().await?;
    Ok(Redirect::to("/"))
}

async fn list_artworks(State(state): State<AppState>) -> Json<Vec<Artwork>> {
    Json(state.gallery.frame().artworks().to_vec())
}

async fn current_frame(State(state): State<AppState>) -> Json<GalleryFrame> {
    Json(state.gallery.frame())
}

async fn open_api(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state.gallery.open(ArtworkId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn close_api(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.gallery.close().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

/// JSON error response: `{ "message": ... }` with a matching status.
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorBody {
                message: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::UnknownArtwork(_) => StatusCode::NOT_FOUND,
        Error::GalleryClosed => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    response
}

async fn log_api(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if !path.starts_with("/api") {
        return next.run(request).await;
    }
    let method = request.method().clone();
    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed = started.elapsed();
    let status = response.status();

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if !is_json {
        tracing::info!("{}", api_log_line(&method, &path, status, elapsed, None));
        return response;
    }

    let (parts, body) = response.into_parts();
    match to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes);
            tracing::info!(
                "{}",
                api_log_line(&method, &path, status, elapsed, Some(&text))
            );
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(err) => {
            tracing::warn!(error = %err, %path, "failed to buffer api response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /api/x 200 in 3ms :: {...}`, cut to 80 characters.
fn api_log_line(
    method: &Method,
    path: &str,
    status: StatusCode,
    elapsed: Duration,
    body: Option<&str>,
) -> String {
    let mut line = format!(
        "{method} {path} {} in {}ms",
        status.as_u16(),
        elapsed.as_millis()
    );
    if let Some(body) = body {
        line.push_str(" :: ");
        line.push_str(body);
    }
    if line.chars().count() > LOG_LINE_MAX_CHARS {
        let mut cut: String = line.chars().take(LOG_LINE_MAX_CHARS - 1).collect();
        cut.push('…');
        return cut;
    }
    line
}
