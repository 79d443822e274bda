//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use common::protocol::{EncryptForm, ErrorResponse, HealthResponse};
use common::ServiceError;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::page::render_index;
use super::state::AppState;
use crate::workflow::seal_and_verify;

/// Where a successful `POST /encrypt` sends the client.
pub const REDIRECT_TARGET: &str = "/index.html";

/// `GET /index.html` — the plaintext submission form.
pub async fn index(uri: Uri) -> Html<String> {
    render_index(uri.path())
}

/// `POST /encrypt` — seal the submitted plaintext and verify the round trip.
///
/// Nothing derived from the plaintext is returned. On success the client is
/// redirected back to the form with `302 Found`; on failure it receives an
/// [`ErrorResponse`] and no redirect. A body that is not a form, or is over
/// the size cap, is answered with an [`ErrorResponse`] as well.
#[instrument(name = "encrypt", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn encrypt(
    State(state): State<AppState>,
    form: Result<Form<EncryptForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            warn!(status = %rejection.status(), "form rejected");
            return error_response(&rejection_error(rejection));
        }
    };
    info!(plaintext_len = form.plaintext.len(), "data received");

    match seal_and_verify(&state.keys, &state.engine, form.plaintext.as_bytes()) {
        Ok(report) => {
            info!(
                key_fingerprint = %report.key_fingerprint,
                plaintext_len = report.plaintext_len,
                ciphertext_len = report.ciphertext_len,
                "request complete"
            );
            (StatusCode::FOUND, [(header::LOCATION, REDIRECT_TARGET)]).into_response()
        }
        Err(e) => {
            warn!(error = %e, "round trip failed");
            error_response(&ServiceError::from(e))
        }
    }
}

/// `GET /health` — liveness and readiness check.
///
/// Returns `200 OK` when the entropy source answers a probe read,
/// `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let entropy_ok = state.keys.probe_entropy();

    let (status_code, status_str) = if entropy_ok {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        entropy_ok,
        rotations: state.keys.rotations(),
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found(uri: Uri) -> Response {
    error_response(&ServiceError::NotFound(uri.path().to_owned()))
}

fn rejection_error(rejection: FormRejection) -> ServiceError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::PayloadTooLarge(rejection.body_text())
    } else {
        ServiceError::BadRequest(rejection.body_text())
    }
}

fn error_response(err: &ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err))).into_response()
}
