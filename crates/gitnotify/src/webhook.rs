use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error, info, instrument, warn};

use crate::events::{DecodeError, WebhookEvent};
use crate::notification::{Notification, Notify};
use crate::rules::RuleSet;
use crate::server::AppState;
use crate::signature::{self, SignatureError};

pub const EVENT_HEADER: &str = "x-github-event";
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// Largest delivery body accepted on `/webhook`. GitHub caps payloads at
/// 25 MB.
pub const MAX_PAYLOAD_BYTES: usize = 25 * 1024 * 1024;

/// What happened to an authenticated delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Notified(Notification),
    /// Supported event, but no rule matched.
    Filtered,
    /// Event type gitnotify does not handle.
    Ignored,
}

/// Decodes a delivery, runs it through `rules` and hands any resulting
/// notification to `notifier`.
pub fn process_event(
    rules: &RuleSet,
    notifier: &dyn Notify,
    event_type: &str,
    payload: &[u8],
) -> Result<Outcome, DecodeError> {
    let event = match WebhookEvent::decode(event_type, payload)? {
        WebhookEvent::Supported(event) => event,
        WebhookEvent::Ignored(event_type) => {
            info!(event = %event_type, "Ignoring event");
            return Ok(Outcome::Ignored);
        }
    };

    if !rules.should_notify(event.event_type(), &event.action, &event.repo_name) {
        debug!(
            action = %event.action,
            repo = %event.repo_name,
            "No notification rule matched"
        );
        return Ok(Outcome::Filtered);
    }

    let notification = Notification::for_event(&event);
    notifier.notify(&notification);
    Ok(Outcome::Notified(notification))
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("failed to read request body: {0}")]
    ReadBody(String),

    #[error("invalid webhook signature: {0}")]
    Signature(#[from] SignatureError),

    #[error("missing X-GitHub-Event header")]
    MissingEventType,

    #[error("error processing event: {0}")]
    Decode(#[from] DecodeError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::ReadBody(_) | Self::MissingEventType => (StatusCode::BAD_REQUEST, "Bad request"),
            Self::Signature(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            // A malformed payload for a known event type is reported as a
            // server error, which makes GitHub mark the delivery as failed.
            Self::Decode(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        (status, body).into_response()
    }
}

#[instrument(
    name = "github.webhook",
    skip_all,
    fields(
        event = tracing::field::Empty,
        delivery = tracing::field::Empty,
    )
)]
pub(crate) async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<&'static str, WebhookError> {
    let body = body.map_err(|e| {
        warn!(error = %e, "Error reading request body");
        WebhookError::ReadBody(e.body_text())
    })?;

    let config = state.store.snapshot();

    if let Err(e) = signature::verify_request(&config.webhook_secret, &headers, &body) {
        warn!(error = %e, "Invalid webhook signature");
        return Err(e.into());
    }

    let Some(event_type) = headers
        .get(EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    else {
        warn!("Missing X-GitHub-Event header");
        return Err(WebhookError::MissingEventType);
    };

    let delivery = headers
        .get(DELIVERY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let span = tracing::Span::current();
    span.record("event", event_type);
    span.record("delivery", delivery);

    match process_event(
        &config.notifications,
        state.notifier.as_ref(),
        event_type,
        &body,
    ) {
        Ok(_) => Ok("OK"),
        Err(e) => {
            error!(error = %e, "Error processing event");
            Err(e.into())
        }
    }
}
