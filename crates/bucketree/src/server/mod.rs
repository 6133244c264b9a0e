//! HTTP front: every request path is resolved against the current snapshot
//! and answered with a listing page, a redirect, or an error status.

pub mod render;

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::header::LOCATION;
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use url::Url;

use crate::index::resolver::{Resolution, resolve};
use crate::index::snapshot::SnapshotHandle;

/// Shared per-request state; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub snapshot: SnapshotHandle,
    /// Base URL that file requests redirect to.
    pub public_base_url: Arc<Url>,
}

/// Builds the service router: a single catch-all route over the snapshot,
/// wrapped in request tracing and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .fallback(handle_path)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// Catch-all handler: resolves the request path against the published
/// snapshot.
///
/// Before the first successful index build there is no snapshot and every
/// request answers 503 so load balancers keep probing instead of caching an
/// empty listing.
async fn handle_path(State(state): State<AppState>, uri: Uri) -> Response {
    let Some(tree) = state.snapshot.snapshot() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "index not ready\n").into_response();
    };

    // Entry names are stored decoded, so the wire path is decoded before
    // resolution and re-encoded in every emitted link or Location.
    let path = percent_encoding::percent_decode_str(uri.path()).decode_utf8_lossy();

    match resolve(&tree, &path) {
        Resolution::File(file) => {
            let target = format!(
                "{}/{}",
                state.public_base_url,
                render::encode_path(&file.full_path())
            );
            Redirect::temporary(&target).into_response()
        }
        Resolution::Folder(folder) => match render::listing_page(folder, &path) {
            Ok(page) => Html(page).into_response(),
            Err(error) => {
                tracing::error!(path = %path, %error, "failed to render listing");
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to render listing\n")
                    .into_response()
            }
        },
        // Trailing-slash repair is a 301; crawlers may cache the canonical
        // folder path indefinitely.
        Resolution::Redirect(location) => (
            StatusCode::MOVED_PERMANENTLY,
            [(LOCATION, render::encode_path(&location))],
        )
            .into_response(),
        Resolution::NotFound => {
            (StatusCode::NOT_FOUND, "file or folder not found\n").into_response()
        }
    }
}
