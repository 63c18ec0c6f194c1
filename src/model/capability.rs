//! Agent capabilities

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lowest allowed capability priority
pub const MIN_PRIORITY: u8 = 1;
/// Highest allowed capability priority
pub const MAX_PRIORITY: u8 = 10;

/// A named, priority-weighted skill an agent declares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub priority: u8,
}

fn default_enabled() -> bool {
    true
}

impl Capability {
    /// Create an enabled capability, rejecting priorities outside 1..=10
    pub fn new(name: &str, description: &str, priority: u8) -> Result<Self, ValidationError> {
        let capability = Self {
            name: name.to_string(),
            description: description.to_string(),
            enabled: true,
            priority,
        };
        capability.validate()?;
        Ok(capability)
    }

    /// Mark as disabled (excluded from matching)
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("capability.name".to_string()));
        }
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&self.priority) {
            return Err(ValidationError::out_of_range(
                "capability.priority",
                self.priority,
                "1..=10",
            ));
        }
        Ok(())
    }

    /// Priority scaled into [0.1, 1.0]
    pub fn weight(&self) -> f64 {
        f64::from(self.priority) / f64::from(MAX_PRIORITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_bounds() {
        assert!(Capability::new("API Design", "", 1).is_ok());
        assert!(Capability::new("API Design", "", 10).is_ok());
        assert!(matches!(
            Capability::new("API Design", "", 0),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            Capability::new("API Design", "", 11),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_capability_requires_name() {
        assert_eq!(
            Capability::new("  ", "blank", 5),
            Err(ValidationError::MissingField("capability.name".to_string()))
        );
    }

    #[test]
    fn test_deserialized_capability_defaults_enabled() {
        let cap: Capability =
            serde_json::from_str(r#"{"name":"Testing","description":"","priority":7}"#).unwrap();
        assert!(cap.enabled);
        assert!((cap.weight() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_builder() {
        let cap = Capability::new("Caching", "Redis layers", 6).unwrap().disabled();
        assert!(!cap.enabled);
        assert!(cap.validate().is_ok());
    }
}
