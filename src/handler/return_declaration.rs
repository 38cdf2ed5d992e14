use serde::{Deserialize, Serialize};

use crate::core::{BusError, Result};
use crate::reflection::TypeDeclaration;

/// Declared names that mean "no return value".
const VOID_NAMES: &[&str] = &["void", "()"];

/// Classification of a handler's declared return type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnDescriptor {
    Void,
    Typed(String),
}

impl ReturnDescriptor {
    pub fn void() -> Self {
        Self::Void
    }

    pub fn from_type_name(name: impl Into<String>) -> Self {
        let name = name.into();
        if VOID_NAMES.contains(&name.as_str()) {
            Self::Void
        } else {
            Self::Typed(name)
        }
    }

    pub fn from_declaration(method: &str, declaration: Option<&TypeDeclaration>) -> Result<Self> {
        match declaration {
            None => Ok(Self::Void),
            Some(TypeDeclaration::Named(name)) => Ok(Self::from_type_name(name.as_str())),
            Some(other) => Err(BusError::UnresolvableReturnType {
                method: method.to_string(),
                declared: other.to_string(),
            }),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Void => None,
            Self::Typed(name) => Some(name),
        }
    }
}
