use gitnotify_std::env::ReadEnv;

pub const CONFIG_TOKEN_ENV: &str = "GITNOTIFY_CONFIG_TOKEN";

/// Server settings that come from the environment rather than the config
/// file.
///
/// - `GITNOTIFY_CONFIG_TOKEN`: bearer token for `/api/config`. Unset or empty
///   leaves the config API answering 500.
#[derive(Debug, Clone, Default)]
pub struct ServerSettings {
    pub config_token: Option<String>,
}

impl ServerSettings {
    pub fn from_env<E: ReadEnv>(env: &E) -> Self {
        Self {
            config_token: env
                .var(CONFIG_TOKEN_ENV)
                .ok()
                .filter(|token| !token.is_empty()),
        }
    }

    pub fn with_config_token(mut self, token: impl Into<String>) -> Self {
        self.config_token = Some(token.into());
        self
    }
}
