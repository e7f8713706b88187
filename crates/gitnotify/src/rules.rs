//! Notification rules and the matcher that decides whether an event is
//! worth a notification.

use serde::{Deserialize, Deserializer, Serialize};

/// One filter over (event type, action, repository).
///
/// Empty `actions` or `repos` match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRule {
    #[serde(default)]
    pub event_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repos: Vec<String>,
}

impl NotificationRule {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Self::default()
        }
    }

    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_repos<I, S>(mut self, repos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.repos = repos.into_iter().map(Into::into).collect();
        self
    }

    pub fn matches(&self, event_type: &str, action: &str, repo_name: &str) -> bool {
        self.event_type == event_type
            && allows(&self.actions, action)
            && allows(&self.repos, repo_name)
    }
}

fn allows(filter: &[String], value: &str) -> bool {
    filter.is_empty() || filter.iter().any(|allowed| allowed == value)
}

/// Rules in declaration order. Empty means "notify for everything".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(Vec<NotificationRule>);

impl RuleSet {
    pub fn new(rules: Vec<NotificationRule>) -> Self {
        Self(rules)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NotificationRule> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[NotificationRule] {
        &self.0
    }

    /// First rule that matches, in declaration order.
    pub fn first_match(
        &self,
        event_type: &str,
        action: &str,
        repo_name: &str,
    ) -> Option<&NotificationRule> {
        self.0
            .iter()
            .find(|rule| rule.matches(event_type, action, repo_name))
    }

    pub fn should_notify(&self, event_type: &str, action: &str, repo_name: &str) -> bool {
        should_notify(&self.0, event_type, action, repo_name)
    }
}

impl From<Vec<NotificationRule>> for RuleSet {
    fn from(rules: Vec<NotificationRule>) -> Self {
        Self(rules)
    }
}

impl FromIterator<NotificationRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = NotificationRule>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a NotificationRule;
    type IntoIter = std::slice::Iter<'a, NotificationRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Decides whether an event should produce a notification.
///
/// An empty rule list allows everything. Otherwise the first rule whose
/// event type matches exactly and whose non-empty `actions`/`repos` filters
/// contain the action and repository wins.
pub fn should_notify(
    rules: &[NotificationRule],
    event_type: &str,
    action: &str,
    repo_name: &str,
) -> bool {
    rules.is_empty()
        || rules
            .iter()
            .any(|rule| rule.matches(event_type, action, repo_name))
}

/// Treats an explicit `null` the same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
