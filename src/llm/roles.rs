//! Per-role text-generation clients.
//!
//! The pipeline talks to the model under four roles. Each role may carry its
//! own API key; roles that resolve to the same key share one rate limiter,
//! since upstream quotas are counted per key.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::llm::{LiteLlmClient, LlmProvider, RateLimiter, ThrottledProvider};
use crate::pipeline::PipelineConfig;

/// HTTP timeout used when the per-call timeout is disabled.
const TRANSPORT_TIMEOUT: Duration = Duration::from_secs(600);

/// The four callers of the text-generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmRole {
    /// Background research over the topic rows.
    Research,
    /// Long-form blog drafting.
    Content,
    /// Tweets and LinkedIn posts.
    Social,
    /// Editorial pass over all content.
    Optimization,
}

impl LlmRole {
    /// Every role, in pipeline order.
    pub const ALL: [LlmRole; 4] = [
        LlmRole::Research,
        LlmRole::Content,
        LlmRole::Social,
        LlmRole::Optimization,
    ];

    /// Returns the role name used in logs and health output.
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmRole::Research => "research",
            LlmRole::Content => "content",
            LlmRole::Social => "social",
            LlmRole::Optimization => "optimization",
        }
    }

    /// Environment variable holding this role's key override.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            LlmRole::Research => "LITELLM_API_KEY_RESEARCH",
            LlmRole::Content => "LITELLM_API_KEY_CONTENT",
            LlmRole::Social => "LITELLM_API_KEY_SOCIAL",
            LlmRole::Optimization => "LITELLM_API_KEY_OPTIMIZATION",
        }
    }
}

impl fmt::Display for LlmRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One provider per role.
#[derive(Clone)]
pub struct RoleClients {
    research: Arc<dyn LlmProvider>,
    content: Arc<dyn LlmProvider>,
    social: Arc<dyn LlmProvider>,
    optimization: Arc<dyn LlmProvider>,
}

impl fmt::Debug for RoleClients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleClients").finish_non_exhaustive()
    }
}

impl RoleClients {
    /// Creates a client set from explicit providers.
    pub fn new(
        research: Arc<dyn LlmProvider>,
        content: Arc<dyn LlmProvider>,
        social: Arc<dyn LlmProvider>,
        optimization: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            research,
            content,
            social,
            optimization,
        }
    }

    /// Uses one provider for every role.
    pub fn uniform(provider: Arc<dyn LlmProvider>) -> Self {
        Self::new(
            provider.clone(),
            provider.clone(),
            provider.clone(),
            provider,
        )
    }

    /// Builds throttled LiteLLM clients for every role.
    ///
    /// A role without a key still gets a client: local proxies often accept
    /// anonymous calls. Readiness reporting decides whether that is allowed.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingApiBase` if the API base is empty.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, LlmError> {
        let policy = config.rate_limit_policy();
        let mut limiters: HashMap<Option<String>, Arc<RateLimiter>> = HashMap::new();
        let mut build = |role: LlmRole| -> Result<Arc<dyn LlmProvider>, LlmError> {
            let key = config.api_key_for(role).map(str::to_string);
            let limiter = limiters
                .entry(key.clone())
                .or_insert_with(|| Arc::new(RateLimiter::new(policy)))
                .clone();
            let client = LiteLlmClient::new(
                config.llm_api_base.clone(),
                key,
                config.default_model.clone(),
                config.request_timeout.unwrap_or(TRANSPORT_TIMEOUT),
            )?;

            tracing::debug!(role = %role, policy = ?policy, "Configured LLM client");
            Ok(Arc::new(
                ThrottledProvider::new(Arc::new(client), limiter, config.request_timeout)
                    .with_label(role.as_str()),
            ))
        };

        Ok(Self {
            research: build(LlmRole::Research)?,
            content: build(LlmRole::Content)?,
            social: build(LlmRole::Social)?,
            optimization: build(LlmRole::Optimization)?,
        })
    }

    /// Returns the provider for `role`.
    pub fn get(&self, role: LlmRole) -> Arc<dyn LlmProvider> {
        match role {
            LlmRole::Research => self.research.clone(),
            LlmRole::Content => self.content.clone(),
            LlmRole::Social => self.social.clone(),
            LlmRole::Optimization => self.optimization.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names() {
        let names: Vec<&str> = LlmRole::ALL.iter().map(|r| r.as_str()).collect();
        assert_eq!(names, vec!["research", "content", "social", "optimization"]);
        assert_eq!(LlmRole::Social.to_string(), "social");
        assert_eq!(
            LlmRole::Optimization.key_env_var(),
            "LITELLM_API_KEY_OPTIMIZATION"
        );
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&LlmRole::Content).unwrap();
        assert_eq!(json, "\"content\"");
    }

    #[test]
    fn test_from_config_builds_all_roles() {
        let config = PipelineConfig::default()
            .with_api_key("shared")
            .with_role_api_key(LlmRole::Research, "research-only");
        let clients = RoleClients::from_config(&config).expect("clients should build");
        for role in LlmRole::ALL {
            let _ = clients.get(role);
        }
    }

    #[test]
    fn test_from_config_rejects_empty_base() {
        let config = PipelineConfig::default().with_api_base("");
        let err = RoleClients::from_config(&config).expect_err("empty base");
        assert!(matches!(err, LlmError::MissingApiBase));
    }

    #[test]
    fn test_uniform_shares_provider() {
        let config = PipelineConfig::default();
        let provider = RoleClients::from_config(&config)
            .expect("clients should build")
            .get(LlmRole::Research);
        let clients = RoleClients::uniform(provider.clone());
        assert!(Arc::ptr_eq(&clients.get(LlmRole::Social), &provider));
        assert!(Arc::ptr_eq(&clients.get(LlmRole::Optimization), &provider));
    }
}
