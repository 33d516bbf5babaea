//! Intake submission handler
//!
//! Buffers the request body, validates it, appends it to the store and
//! answers with the acknowledgment for the submitted form type.

use crate::config::AppState;
use crate::http;
use crate::intake::{FormKind, IntakeError, IntakePayload, SubmissionRecord};
use crate::logger;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Serialize)]
struct Acknowledgment {
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Handle a POST on the intake path
pub async fn handle_intake<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    match record_submission(req, state).await {
        Ok(record) => {
            let form_type = record.form_type().unwrap_or_default();
            logger::log_submission_stored(record.id().unwrap_or(&Value::Null), form_type);
            let body = Acknowledgment {
                message: FormKind::from_tag(form_type).acknowledgment(),
            };
            http::json_response(StatusCode::OK, &body)
        }
        Err(err) => {
            if err.status().is_server_error() {
                logger::log_error(&format!("Intake submission failed: {err}"));
            } else {
                logger::log_warning(&format!("Intake submission rejected: {err}"));
            }
            http::json_response(
                err.status(),
                &ErrorBody {
                    error: err.public_message(),
                },
            )
        }
    }
}

async fn record_submission<B>(
    req: Request<B>,
    state: &AppState,
) -> Result<SubmissionRecord, IntakeError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let max_body_size = state.config.http.max_body_size;
    check_body_size(&req, max_body_size)?;

    let body = read_body(req.into_body(), max_body_size).await?;
    let payload = IntakePayload::parse(&body)?;
    state.store.append(payload).await
}

/// Reject a declared `Content-Length` above the limit before reading
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Result<(), IntakeError> {
    let declared = req
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    match declared {
        Some(size) if size > max_body_size => Err(IntakeError::PayloadTooLarge),
        _ => Ok(()),
    }
}

/// Buffer the whole body, failing once it grows past `max_body_size`
async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, IntakeError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(IntakeError::PayloadTooLarge),
        Err(e) => Err(IntakeError::Body(e.to_string())),
    }
}
