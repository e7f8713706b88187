//! # gitnotify
//!
//! GitHub webhook receiver that logs a notification line for the events an
//! organization cares about.
//!
//! ## How it works
//!
//! 1. GitHub sends `POST /webhook` with `X-Hub-Signature-256` and
//!    `X-GitHub-Event` headers plus a JSON payload.
//! 2. The server validates the HMAC-SHA256 signature against the configured
//!    `webhook_secret`.
//! 3. `issues` and `pull_request` payloads are decoded; other event types are
//!    acknowledged and ignored.
//! 4. The (event type, action, repository) triple is checked against the
//!    notification rules. An empty rule list matches everything.
//! 5. Matching events are logged, e.g.
//!    `New Issue Opened: #42 - Crash on start by octocat`.
//!
//! ## Endpoints
//!
//! | Method | Path | Auth | Description |
//! |---|---|---|---|
//! | `POST` | `/webhook` | HMAC signature | GitHub deliveries |
//! | `GET` | `/health` | none | `{"status":"healthy","service":"gitnotify"}` |
//! | `GET`/`PUT` | `/api/config` | `Bearer $GITNOTIFY_CONFIG_TOKEN` | Read or replace the configuration |
//!
//! ## Configuration
//!
//! Loaded from a YAML file (`--config`, default `config.yml`); see
//! [`Config`]. A `PUT /api/config` validates the new configuration, writes it
//! back to the same file and activates it for subsequent deliveries.

pub mod config;
pub mod config_api;
pub mod events;
pub mod notification;
pub mod rules;
pub mod server;
pub mod settings;
pub mod signature;
pub mod store;
pub mod webhook;

pub use config::{Config, ConfigError, GithubApp, ValidationError};
pub use events::{EventKind, InboundEvent, WebhookEvent};
pub use notification::{LogNotifier, Notification, Notify};
pub use rules::{NotificationRule, RuleSet, should_notify};
pub use server::{AppState, router, serve};
pub use settings::ServerSettings;
pub use store::ConfigStore;
