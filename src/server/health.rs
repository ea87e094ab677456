//! Readiness checks for the pipeline's collaborators.
//!
//! Every collaborator gets a [`Probe`]; the aggregate is healthy only when
//! every probe is. Probes inspect configuration and never call out, so a
//! readiness check costs nothing against upstream quotas.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::llm::LlmRole;
use crate::pipeline::PipelineConfig;

/// Health of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ComponentHealth {
    pub fn healthy() -> Self {
        Self {
            status: ComponentStatus::Healthy,
            detail: None,
        }
    }

    pub fn unhealthy(detail: impl Into<String>) -> Self {
        Self {
            status: ComponentStatus::Unhealthy,
            detail: Some(detail.into()),
        }
    }

    /// Healthy, with a note attached.
    pub fn degraded(detail: impl Into<String>) -> Self {
        Self {
            status: ComponentStatus::Healthy,
            detail: Some(detail.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ComponentStatus::Healthy
    }
}

/// A readiness check for one collaborator.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Key of the component in the health report.
    fn name(&self) -> String;

    async fn check(&self) -> ComponentHealth;
}

/// Checks that an LLM role has the credentials it needs.
#[derive(Debug, Clone)]
pub struct LlmRoleProbe {
    role: LlmRole,
    has_key: bool,
    require_key: bool,
}

impl LlmRoleProbe {
    pub fn new(role: LlmRole, has_key: bool, require_key: bool) -> Self {
        Self {
            role,
            has_key,
            require_key,
        }
    }
}

#[async_trait]
impl Probe for LlmRoleProbe {
    fn name(&self) -> String {
        format!("llm_{}", self.role)
    }

    async fn check(&self) -> ComponentHealth {
        match (self.has_key, self.require_key) {
            (true, _) => ComponentHealth::healthy(),
            (false, true) => ComponentHealth::unhealthy(format!(
                "missing API key: set {} or LITELLM_API_KEY",
                self.role.key_env_var()
            )),
            (false, false) => ComponentHealth::degraded("no API key, calling anonymously"),
        }
    }
}

/// Reports whether real spreadsheet rows will be read.
///
/// Always healthy: the row source falls back to sample rows.
#[derive(Debug, Clone)]
pub struct SpreadsheetProbe {
    configured: bool,
}

impl SpreadsheetProbe {
    pub fn new(configured: bool) -> Self {
        Self { configured }
    }
}

#[async_trait]
impl Probe for SpreadsheetProbe {
    fn name(&self) -> String {
        "google_sheets".to_string()
    }

    async fn check(&self) -> ComponentHealth {
        if self.configured {
            ComponentHealth::healthy()
        } else {
            ComponentHealth::degraded("not configured, sample rows will be used")
        }
    }
}

/// Reports whether reports will actually be emailed.
///
/// Always healthy: without credentials delivery is skipped.
#[derive(Debug, Clone)]
pub struct EmailProbe {
    configured: bool,
}

impl EmailProbe {
    pub fn new(configured: bool) -> Self {
        Self { configured }
    }
}

#[async_trait]
impl Probe for EmailProbe {
    fn name(&self) -> String {
        "email_service".to_string()
    }

    async fn check(&self) -> ComponentHealth {
        if self.configured {
            ComponentHealth::healthy()
        } else {
            ComponentHealth::degraded("SMTP credentials not configured, delivery will be skipped")
        }
    }
}

/// Aggregated readiness.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub timestamp: DateTime<Utc>,
    pub healthy: bool,
    pub components: BTreeMap<String, ComponentHealth>,
}

/// Runs every probe and folds the results.
#[derive(Clone, Default)]
pub struct HealthChecker {
    probes: Vec<Arc<dyn Probe>>,
}

impl std::fmt::Debug for HealthChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.probes.iter().map(|p| p.name()).collect();
        f.debug_struct("HealthChecker")
            .field("probes", &names)
            .finish()
    }
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probes for the four LLM roles, the spreadsheet and email.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut checker = Self::new();
        for role in LlmRole::ALL {
            checker = checker.with_probe(LlmRoleProbe::new(
                role,
                config.api_key_for(role).is_some(),
                config.require_api_key,
            ));
        }
        checker
            .with_probe(SpreadsheetProbe::new(config.sheets.is_configured()))
            .with_probe(EmailProbe::new(config.smtp.has_credentials()))
    }

    pub fn with_probe(mut self, probe: impl Probe + 'static) -> Self {
        self.probes.push(Arc::new(probe));
        self
    }

    pub async fn check_all(&self) -> HealthReport {
        let mut components = BTreeMap::new();
        for probe in &self.probes {
            let health = probe.check().await;
            if !health.is_healthy() {
                tracing::warn!(
                    component = %probe.name(),
                    detail = health.detail.as_deref().unwrap_or_default(),
                    "Component unhealthy"
                );
            }
            components.insert(probe.name(), health);
        }

        HealthReport {
            timestamp: Utc::now(),
            healthy: components.values().all(ComponentHealth::is_healthy),
            components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_all_configured_is_healthy() {
        let config = PipelineConfig::default().with_api_key("shared");
        let report = HealthChecker::from_config(&config).check_all().await;

        assert!(report.healthy);
        assert_eq!(report.components.len(), 6);
        assert!(report.components.contains_key("llm_research"));
        assert!(report.components.contains_key("google_sheets"));
        assert!(report.components["google_sheets"].detail.is_some());
    }

    #[tokio::test]
    async fn test_missing_key_is_unhealthy_when_required() {
        let config = PipelineConfig::default().with_role_api_key(LlmRole::Research, "only-one");
        let report = HealthChecker::from_config(&config).check_all().await;

        assert!(!report.healthy);
        assert!(report.components["llm_research"].is_healthy());
        let social = &report.components["llm_social"];
        assert_eq!(social.status, ComponentStatus::Unhealthy);
        assert!(social
            .detail
            .as_deref()
            .unwrap()
            .contains("LITELLM_API_KEY_SOCIAL"));
    }

    #[tokio::test]
    async fn test_missing_key_allowed_when_not_required() {
        let mut config = PipelineConfig::default();
        config.require_api_key = false;
        let report = HealthChecker::from_config(&config).check_all().await;
        assert!(report.healthy);
    }

    #[tokio::test]
    async fn test_report_serialization() {
        let checker = HealthChecker::new().with_probe(LlmRoleProbe::new(LlmRole::Content, true, true));
        let json = serde_json::to_value(checker.check_all().await).unwrap();

        assert_eq!(json["healthy"], true);
        assert_eq!(json["components"]["llm_content"]["status"], "healthy");
        assert!(json["components"]["llm_content"].get("detail").is_none());
    }

    #[tokio::test]
    async fn test_empty_checker_is_healthy() {
        assert!(HealthChecker::new().check_all().await.healthy);
    }
}
