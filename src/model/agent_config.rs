//! Agent configuration

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::Capability;

pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Role an agent plays in the team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentRole {
    Copilot,
    Architect,
    Developer,
    Reviewer,
    Tester,
    Documentor,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copilot => "copilot",
            Self::Architect => "architect",
            Self::Developer => "developer",
            Self::Reviewer => "reviewer",
            Self::Tester => "tester",
            Self::Documentor => "documentor",
        }
    }
}

/// Static configuration owned by one agent instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    pub role: AgentRole,
    pub model: String,
    pub system_prompt: String,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_enabled() -> bool {
    true
}

impl AgentConfig {
    pub fn new(id: &str, name: &str, role: AgentRole, model: &str, system_prompt: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            role,
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
            capabilities: Vec::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            enabled: true,
            api_key: None,
            base_url: None,
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.capabilities.extend(capabilities);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("agent.id", &self.id),
            ("agent.name", &self.name),
            ("agent.model", &self.model),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field.to_string()));
            }
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::out_of_range(
                "agent.temperature",
                self.temperature,
                "0.0..=2.0",
            ));
        }
        if self.max_tokens == 0 {
            return Err(ValidationError::out_of_range("agent.max_tokens", 0, ">= 1"));
        }
        self.capabilities.iter().try_for_each(Capability::validate)
    }

    /// Capabilities that take part in matching
    pub fn enabled_capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter().filter(|c| c.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AgentConfig {
        AgentConfig::new("backend-agent", "Backend", AgentRole::Developer, "sonnet", "prompt")
    }

    #[test]
    fn test_defaults() {
        let c = config();
        assert_eq!(c.max_tokens, 4000);
        assert!((c.temperature - 0.7).abs() < f64::EPSILON);
        assert!(c.enabled);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_temperature_range() {
        assert!(config().with_temperature(0.0).validate().is_ok());
        assert!(config().with_temperature(2.0).validate().is_ok());
        assert!(config().with_temperature(2.1).validate().is_err());
        assert!(config().with_temperature(-0.1).validate().is_err());
        assert!(config().with_temperature(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_missing_fields() {
        let c = AgentConfig::new("", "Backend", AgentRole::Developer, "sonnet", "");
        assert_eq!(
            c.validate(),
            Err(ValidationError::MissingField("agent.id".to_string()))
        );
        let c = AgentConfig::new("x", "Backend", AgentRole::Developer, " ", "");
        assert_eq!(
            c.validate(),
            Err(ValidationError::MissingField("agent.model".to_string()))
        );
    }

    #[test]
    fn test_invalid_capability_fails_config() {
        let mut bad = Capability::new("Testing", "", 5).unwrap();
        bad.priority = 42;
        assert!(config().with_capability(bad).validate().is_err());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let c = config().with_api_key(Some("sk-secret".to_string()));
        let json = serde_json::to_string(&c).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(!json.contains("api_key"));
    }

    #[test]
    fn test_enabled_capabilities_filter() {
        let c = config()
            .with_capability(Capability::new("A", "", 5).unwrap())
            .with_capability(Capability::new("B", "", 5).unwrap().disabled());
        let names: Vec<_> = c.enabled_capabilities().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A"]);
    }
}
