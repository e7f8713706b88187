//! `GET`/`PUT /api/config`, gated by `Authorization: Bearer <token>`.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tracing::{error, info, warn};

use crate::config::{Config, ConfigError, ValidationError};
use crate::server::AppState;
use crate::store::ReplaceError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigApiError {
    #[error("Config API token not set")]
    TokenNotSet,

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid JSON")]
    InvalidJson,

    #[error("invalid config: {0}")]
    InvalidConfig(ValidationError),

    #[error("failed to save config: {0}")]
    SaveFailed(ConfigError),
}

impl From<ReplaceError> for ConfigApiError {
    fn from(err: ReplaceError) -> Self {
        match err {
            ReplaceError::Invalid(e) => Self::InvalidConfig(e),
            ReplaceError::Persist(e) => Self::SaveFailed(e),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
pub(crate) struct StatusBody {
    status: &'static str,
}

impl IntoResponse for ConfigApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::TokenNotSet => {
                return (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response();
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidJson | Self::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            Self::SaveFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn authorize(expected: Option<&str>, headers: &HeaderMap) -> Result<(), ConfigApiError> {
    let Some(expected) = expected else {
        error!("Config API called but GITNOTIFY_CONFIG_TOKEN is not set");
        return Err(ConfigApiError::TokenNotSet);
    };

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if provided.is_some_and(|token| token_matches(token, expected)) {
        Ok(())
    } else {
        warn!("Rejected config API request with missing or wrong bearer token");
        Err(ConfigApiError::Unauthorized)
    }
}

/// Compares bearer tokens in constant time by checking HMAC tags keyed with
/// the expected token, so neither length nor common prefix leaks.
fn token_matches(provided: &str, expected: &str) -> bool {
    let tag = |token: &str| {
        Hmac::<Sha256>::new_from_slice(expected.as_bytes()).map(|mut mac| {
            mac.update(token.as_bytes());
            mac
        })
    };
    match (tag(provided), tag(expected)) {
        (Ok(provided), Ok(expected)) => provided
            .verify_slice(&expected.finalize().into_bytes())
            .is_ok(),
        _ => false,
    }
}

pub(crate) async fn get_config(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Config>, ConfigApiError> {
    authorize(state.config_token.as_deref(), &headers)?;
    Ok(Json(Config::clone(&state.store.snapshot())))
}

pub(crate) async fn put_config(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<StatusBody>, ConfigApiError> {
    authorize(state.config_token.as_deref(), &headers)?;

    let config: Config = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected config update with invalid JSON");
        ConfigApiError::InvalidJson
    })?;

    state.store.replace(config).map_err(|e| {
        match &e {
            ReplaceError::Invalid(_) => warn!(error = %e, "Rejected invalid config update"),
            ReplaceError::Persist(_) => error!(error = %e, "Failed to persist config update"),
        }
        ConfigApiError::from(e)
    })?;

    info!("Config updated via API");
    Ok(Json(StatusBody { status: "ok" }))
}
