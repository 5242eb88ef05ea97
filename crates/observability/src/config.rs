//! Configuration for observability/telemetry
//!
//! One deployment identifier names the service, set once at startup.

use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;

use crate::error::{ObservabilityError, Result};

/// API key sent as a bearer token to the ingest endpoint.
pub const API_KEY_ENV: &str = "SPYGLASS_API_KEY";
/// Deployment identifier, used as both `service.name` and `deployment.id`.
pub const DEPLOYMENT_ID_ENV: &str = "SPYGLASS_DEPLOYMENT_ID";
/// Optional override of the OTLP endpoint.
pub const ENDPOINT_ENV: &str = "SPYGLASS_OTLP_ENDPOINT";
/// Standard OTLP endpoint variable, consulted when the spyglass one is unset.
pub const OTEL_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
/// Log filter for the console subscriber.
pub const LOG_ENV: &str = "SPYGLASS_LOG";

/// Ingest endpoint used when no override is configured.
pub const DEFAULT_ENDPOINT: &str = "https://ingest.spyglass-ai.com";

/// Observability configuration
#[derive(Clone)]
pub struct ObservabilityConfig {
    /// API key for the ingest endpoint
    pub api_key: String,

    /// Deployment identifier (e.g., "checkout-agent-prod")
    pub deployment_id: String,

    /// OTLP endpoint override (defaults to [`DEFAULT_ENDPOINT`])
    pub otlp_endpoint: Option<String>,

    /// Enable console/log output in addition to OTLP export
    pub enable_console: bool,

    /// Log level filter (e.g., "info", "debug", "trace")
    /// Defaults to "info" if not set
    pub log_level: Option<String>,

    /// Additional resource attributes (key-value pairs)
    pub resource_attributes: Vec<(String, String)>,
}

impl std::fmt::Debug for ObservabilityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservabilityConfig")
            .field("api_key", &"<redacted>")
            .field("deployment_id", &self.deployment_id)
            .field("otlp_endpoint", &self.otlp_endpoint)
            .field("enable_console", &self.enable_console)
            .field("log_level", &self.log_level)
            .field("resource_attributes", &self.resource_attributes)
            .finish()
    }
}

impl ObservabilityConfig {
    /// Create a new configuration with the two required values.
    pub fn new(api_key: impl Into<String>, deployment_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            deployment_id: deployment_id.into(),
            otlp_endpoint: None,
            enable_console: true,
            log_level: None,
            resource_attributes: Vec::new(),
        }
    }

    /// Set OTLP endpoint
    pub fn with_otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enable: bool) -> Self {
        self.enable_console = enable;
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Add resource attribute
    pub fn with_resource_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.resource_attributes.push((key.into(), value.into()));
        self
    }

    /// Build from environment variables
    ///
    /// Reads:
    /// - `SPYGLASS_API_KEY` → api_key (required)
    /// - `SPYGLASS_DEPLOYMENT_ID` → deployment_id (required)
    /// - `SPYGLASS_OTLP_ENDPOINT` or `OTEL_EXPORTER_OTLP_ENDPOINT` → otlp_endpoint
    /// - `SPYGLASS_LOG` or `RUST_LOG` → log_level
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = non_empty(API_KEY_ENV)
            .ok_or_else(|| ObservabilityError::Config(format!("{API_KEY_ENV} is not set")))?;

        let deployment_id = non_empty(DEPLOYMENT_ID_ENV).ok_or_else(|| {
            ObservabilityError::Config(format!("{DEPLOYMENT_ID_ENV} is not set"))
        })?;

        let otlp_endpoint = non_empty(ENDPOINT_ENV).or_else(|| non_empty(OTEL_ENDPOINT_ENV));

        let log_level = non_empty(LOG_ENV).or_else(|| non_empty("RUST_LOG"));

        Ok(Self {
            api_key,
            deployment_id,
            otlp_endpoint,
            enable_console: true,
            log_level,
            resource_attributes: Vec::new(),
        })
    }

    /// Endpoint spans are exported to.
    pub fn endpoint(&self) -> &str {
        self.otlp_endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Immutable resource identity derived from this configuration.
    pub fn resource(&self) -> ResourceDescriptor {
        ResourceDescriptor {
            service_name: self.deployment_id.clone(),
            deployment_id: self.deployment_id.clone(),
            endpoint: self.otlp_endpoint.clone(),
            extra: self.resource_attributes.clone(),
        }
    }
}

/// Identity attached to every span this process produces.
///
/// `service.name` and `deployment.id` always carry the same value so
/// dashboards can query either one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    service_name: String,
    deployment_id: String,
    endpoint: Option<String>,
    extra: Vec<(String, String)>,
}

impl ResourceDescriptor {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn deployment_id(&self) -> &str {
        &self.deployment_id
    }

    /// Custom exporter endpoint, if one was configured.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Convert to an OpenTelemetry resource.
    pub fn to_resource(&self) -> Resource {
        let mut attributes = vec![
            KeyValue::new("service.name", self.service_name.clone()),
            KeyValue::new("deployment.id", self.deployment_id.clone()),
        ];

        for (key, value) in &self.extra {
            attributes.push(KeyValue::new(key.clone(), value.clone()));
        }

        // In 0.31, Resource constructors are private; ResourceBuilder is the public API
        Resource::builder().with_attributes(attributes).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::{Key, Value};
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_required_values() {
        let config = ObservabilityConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "sk-test"),
            (DEPLOYMENT_ID_ENV, "support-bot"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.deployment_id, "support-bot");
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = ObservabilityConfig::from_lookup(lookup(&[(DEPLOYMENT_ID_ENV, "support-bot")]))
            .unwrap_err();
        assert_eq!(
            err,
            ObservabilityError::Config("SPYGLASS_API_KEY is not set".to_string())
        );
    }

    #[test]
    fn test_blank_deployment_id_is_config_error() {
        let err = ObservabilityConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "sk-test"),
            (DEPLOYMENT_ID_ENV, "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ObservabilityError::Config(msg) if msg.contains(DEPLOYMENT_ID_ENV)));
    }

    #[test]
    fn test_endpoint_override_precedence() {
        let config = ObservabilityConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "sk-test"),
            (DEPLOYMENT_ID_ENV, "support-bot"),
            (ENDPOINT_ENV, "http://localhost:4317"),
            (OTEL_ENDPOINT_ENV, "http://collector:4317"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint(), "http://localhost:4317");

        let config = ObservabilityConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "sk-test"),
            (DEPLOYMENT_ID_ENV, "support-bot"),
            (OTEL_ENDPOINT_ENV, "http://collector:4317"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint(), "http://collector:4317");
        assert_eq!(config.resource().endpoint(), Some("http://collector:4317"));
    }

    #[test]
    fn test_resource_duplicates_deployment_id() {
        let descriptor = ObservabilityConfig::new("sk-test", "support-bot")
            .with_resource_attribute("team", "ml-platform")
            .resource();

        assert_eq!(descriptor.service_name(), "support-bot");
        assert_eq!(descriptor.deployment_id(), "support-bot");

        let resource = descriptor.to_resource();
        assert_eq!(
            resource.get(&Key::new("service.name")),
            Some(Value::from("support-bot"))
        );
        assert_eq!(
            resource.get(&Key::new("deployment.id")),
            Some(Value::from("support-bot"))
        );
        assert_eq!(
            resource.get(&Key::new("team")),
            Some(Value::from("ml-platform"))
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ObservabilityConfig::new("sk-secret", "support-bot");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("support-bot"));
    }
}
