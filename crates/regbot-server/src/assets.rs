//! Static site serving.
//!
//! `index.html` and `soon.html` come from the site root. Any other path is
//! looked up in the public directory first, then in the site root. Every
//! miss, entry documents included, is a plain-text 404.

use std::path::Path;

use axum::Router;
use axum::extract::Request;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{StatusCode, Uri};
use tower::ServiceExt;
use tower_http::services::ServeDir;

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

fn index_request(mut req: Request) -> Request {
    *req.uri_mut() = Uri::from_static("/index.html");
    req
}

/// Routes for the two entry documents plus a fallback resolving everything else.
pub fn router<S>(site_root: &Path, public_dir: &Path) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let root_files = ServeDir::new(site_root)
        .append_index_html_on_directories(false)
        .not_found_service(not_found.into_service());
    let assets = ServeDir::new(public_dir)
        .append_index_html_on_directories(false)
        .fallback(root_files.clone());

    Router::new()
        .route_service("/", root_files.clone().map_request(index_request))
        .route_service("/soon.html", root_files)
        .fallback_service(assets)
}
