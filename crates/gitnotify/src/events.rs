//! Decoding of GitHub webhook payloads into [`InboundEvent`]s.
//!
//! Only `issues` and `pull_request` deliveries are decoded. Every other event
//! type becomes [`WebhookEvent::Ignored`]. Missing fields decode to empty
//! values; only a body that is not valid JSON for the event shape fails.

use std::fmt;

use serde::Deserialize;

/// Event kinds that can produce a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Issue,
    PullRequest,
}

impl EventKind {
    /// Value of the `X-GitHub-Event` header for this kind.
    pub fn event_type(self) -> &'static str {
        match self {
            Self::Issue => "issues",
            Self::PullRequest => "pull_request",
        }
    }

    /// Human-readable noun used in notification lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Issue => "Issue",
            Self::PullRequest => "Pull Request",
        }
    }

    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            "issues" => Some(Self::Issue),
            "pull_request" => Some(Self::PullRequest),
            _ => None,
        }
    }

    pub fn decode(self, payload: &[u8]) -> Result<InboundEvent, DecodeError> {
        let json_error = |source| DecodeError { kind: self, source };
        match self {
            Self::Issue => {
                let event: IssuesPayload = serde_json::from_slice(payload).map_err(json_error)?;
                Ok(InboundEvent::from_parts(
                    self,
                    event.action,
                    event.repository,
                    event.issue,
                ))
            }
            Self::PullRequest => {
                let event: PullRequestPayload =
                    serde_json::from_slice(payload).map_err(json_error)?;
                Ok(InboundEvent::from_parts(
                    self,
                    event.action,
                    event.repository,
                    event.pull_request,
                ))
            }
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_type())
    }
}

/// The fields of an issue or pull request delivery that matching and
/// formatting need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub kind: EventKind,
    pub action: String,
    pub repo_name: String,
    pub actor_login: String,
    pub subject_number: u64,
    pub subject_title: String,
    /// Only set for pull requests.
    pub merged: Option<bool>,
}

impl InboundEvent {
    pub fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn from_parts(
        kind: EventKind,
        action: Option<String>,
        repository: Option<Repository>,
        subject: Option<Subject>,
    ) -> Self {
        let subject = subject.unwrap_or_default();
        let merged = match kind {
            EventKind::PullRequest => Some(subject.merged.unwrap_or(false)),
            EventKind::Issue => None,
        };
        Self {
            kind,
            action: action.unwrap_or_default(),
            repo_name: repository.and_then(|r| r.name).unwrap_or_default(),
            actor_login: subject.user.and_then(|u| u.login).unwrap_or_default(),
            subject_number: subject.number.unwrap_or_default(),
            subject_title: subject.title.unwrap_or_default(),
            merged,
        }
    }
}

/// Outcome of classifying a delivery by its event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Supported(InboundEvent),
    Ignored(String),
}

impl WebhookEvent {
    pub fn decode(event_type: &str, payload: &[u8]) -> Result<Self, DecodeError> {
        match EventKind::from_event_type(event_type) {
            Some(kind) => kind.decode(payload).map(Self::Supported),
            None => Ok(Self::Ignored(event_type.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to decode {kind} event: {source}")]
pub struct DecodeError {
    pub kind: EventKind,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Deserialize)]
struct IssuesPayload {
    action: Option<String>,
    issue: Option<Subject>,
    repository: Option<Repository>,
}

#[derive(Deserialize)]
struct PullRequestPayload {
    action: Option<String>,
    pull_request: Option<Subject>,
    repository: Option<Repository>,
}

#[derive(Deserialize, Default)]
struct Subject {
    number: Option<u64>,
    title: Option<String>,
    user: Option<User>,
    merged: Option<bool>,
}

#[derive(Deserialize)]
struct Repository {
    name: Option<String>,
}

#[derive(Deserialize)]
struct User {
    login: Option<String>,
}
