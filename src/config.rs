use serde::{Deserialize, Serialize};

use crate::core::{BusError, Result};
use crate::types::UnknownTypePolicy;

/// Descriptor factory configuration
///
/// # Examples
///
/// ```
/// use servicebus_common::{DescriptorConfig, UnknownTypePolicy};
///
/// let config = DescriptorConfig::new()
///     .unknown_types(UnknownTypePolicy::TreatAsScalar)
///     .infer_message_class(false);
///
/// assert!(!config.infer_message_class);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptorConfig {
    /// Treatment of declared type names missing from the registry
    pub unknown_types: UnknownTypePolicy,

    /// Use the first object argument as message class when none is given
    pub infer_message_class: bool,
}

impl DescriptorConfig {
    pub fn new() -> Self {
        Self {
            unknown_types: UnknownTypePolicy::Reject,
            infer_message_class: true,
        }
    }

    /// Set the unknown type policy
    pub fn unknown_types(mut self, policy: UnknownTypePolicy) -> Self {
        self.unknown_types = policy;
        self
    }

    /// Enable or disable message class inference
    pub fn infer_message_class(mut self, infer: bool) -> Self {
        self.infer_message_class = infer;
        self
    }

    /// Parse from JSON; missing keys keep their defaults
    ///
    /// ```
    /// # use servicebus_common::{DescriptorConfig, UnknownTypePolicy};
    /// let config = DescriptorConfig::from_json(r#"{"unknown_types": "treat_as_scalar"}"#).unwrap();
    /// assert_eq!(config.unknown_types, UnknownTypePolicy::TreatAsScalar);
    /// assert!(config.infer_message_class);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BusError::InvalidConfig(e.to_string()))
    }
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self::new()
    }
}
