//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method
//! classification, dispatching, and access logging.

use crate::config::AppState;
use crate::handler::{intake, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Where a request is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// POST on the intake prefix
    Intake,
    /// GET on anything else
    Static,
    /// Every other method/path combination
    MethodNotAllowed,
}

/// Classify a request by method and path prefix
pub fn classify(method: &Method, path: &str, intake_path: &str) -> Route {
    match *method {
        Method::POST if path.starts_with(intake_path) => Route::Intake,
        Method::GET => Route::Static,
        _ => Route::MethodNotAllowed,
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let access_log = state.access_log_enabled();
    let mut entry = access_log.then(|| AccessLogEntry::from_request(&req, remote_addr));

    let mut response = route_request(req, &state).await;

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch to the intake recorder or the static file responder
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    match classify(req.method(), req.uri().path(), &state.config.site.intake_path) {
        Route::Intake => intake::handle_intake(req, state).await,
        Route::Static => static_files::serve_static(req.uri().path(), state).await,
        Route::MethodNotAllowed => {
            logger::log_warning(&format!(
                "Method not allowed: {} {}",
                req.method(),
                req.uri().path()
            ));
            http::build_405_response()
        }
    }
}
