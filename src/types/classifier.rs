use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::TypeRegistry;

/// What to do with a declared type name the registry has never heard of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTypePolicy {
    /// Fail descriptor construction with `UnknownType`.
    #[default]
    Reject,
    /// Classify the name as a scalar.
    #[serde(alias = "scalar")]
    TreatAsScalar,
}

impl FromStr for UnknownTypePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "scalar" | "treat_as_scalar" => Ok(Self::TreatAsScalar),
            other => Err(format!(
                "unknown type policy '{other}', expected 'reject' or 'scalar'"
            )),
        }
    }
}

impl fmt::Display for UnknownTypePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => f.write_str("reject"),
            Self::TreatAsScalar => f.write_str("scalar"),
        }
    }
}

/// Outcome of classifying a single declared type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeClass {
    /// A registered class or interface, with its ancestor closure.
    Object { ancestors: Vec<String> },
    Scalar,
    Unknown,
}

/// Classification pass over declared type names.
#[derive(Debug, Clone)]
pub struct TypeClassifier {
    registry: Arc<TypeRegistry>,
    unknown_types: UnknownTypePolicy,
}

impl TypeClassifier {
    pub fn new(registry: Arc<TypeRegistry>, unknown_types: UnknownTypePolicy) -> Self {
        Self {
            registry,
            unknown_types,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn unknown_types(&self) -> UnknownTypePolicy {
        self.unknown_types
    }

    pub fn classify(&self, name: &str) -> TypeClass {
        if self.registry.is_object_type(name) {
            return TypeClass::Object {
                ancestors: self.registry.ancestors(name),
            };
        }

        if self.registry.is_scalar(name) {
            return TypeClass::Scalar;
        }

        match self.unknown_types {
            UnknownTypePolicy::Reject => TypeClass::Unknown,
            UnknownTypePolicy::TreatAsScalar => TypeClass::Scalar,
        }
    }
}
