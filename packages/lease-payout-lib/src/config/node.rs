use crate::{
    config::{Env, PayoutConfigResult},
    defaults,
    utils::{is_opt_env_var, trim_opt_env_key},
};
use serde::Deserialize;

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Base URL of the node REST API.
    pub url: String,

    /// Timeout applied to every request sent to the node.
    pub request_timeout_secs: u64,

    /// API key used for the node's protected endpoints.
    pub api_key: Option<String>,
}

impl Env for NodeConfig {
    fn inject_opt_env_vars(&mut self) -> PayoutConfigResult<()> {
        if is_opt_env_var(&self.url) {
            self.url = std::env::var(trim_opt_env_key(&self.url))?;
        }

        if let Some(api_key) = self.api_key.as_mut() {
            if is_opt_env_var(api_key) {
                *api_key = std::env::var(trim_opt_env_key(api_key))?;
            }
        }

        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: defaults::NODE_URL.into(),
            request_timeout_secs: defaults::NODE_REQUEST_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConfig")
            .field("url", &self.url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "XXXX"))
            .finish()
    }
}
