use serde::Serialize;

use crate::core::{BusError, Result};
use crate::reflection::{ParameterReflection, TypeDeclaration};
use crate::types::{TypeClass, TypeClassifier};

/// One formal parameter of a handler method.
///
/// `type_class` is set if and only if `is_object` is true, and an untyped
/// parameter is never an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentDescriptor {
    position: usize,
    name: String,
    has_type: bool,
    is_object: bool,
    type_class: Option<String>,
    declared_type: Option<String>,
    /// Ancestor closure of `type_class`, frozen at construction
    ancestors: Vec<String>,
}

impl ArgumentDescriptor {
    /// Classify one reflected parameter.
    ///
    /// `position` is 1-based; `method` is only used for error context.
    pub fn from_parameter(
        method: &str,
        position: usize,
        parameter: &ParameterReflection,
        classifier: &TypeClassifier,
    ) -> Result<Self> {
        let Some(declared) = &parameter.declared_type else {
            return Ok(Self {
                position,
                name: parameter.name.clone(),
                has_type: false,
                is_object: false,
                type_class: None,
                declared_type: None,
                ancestors: Vec::new(),
            });
        };

        let TypeDeclaration::Named(type_name) = declared else {
            return Err(BusError::MalformedArgumentType {
                method: method.to_string(),
                parameter: parameter.name.clone(),
                position,
                declared: declared.to_string(),
            });
        };

        let (is_object, type_class, ancestors) = match classifier.classify(type_name) {
            TypeClass::Object { ancestors } => (true, Some(type_name.clone()), ancestors),
            TypeClass::Scalar => (false, None, Vec::new()),
            TypeClass::Unknown => {
                return Err(BusError::UnknownType {
                    method: method.to_string(),
                    parameter: parameter.name.clone(),
                    position,
                    type_name: type_name.clone(),
                });
            }
        };

        Ok(Self {
            position,
            name: parameter.name.clone(),
            has_type: true,
            is_object,
            type_class,
            declared_type: Some(type_name.clone()),
            ancestors,
        })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_type(&self) -> bool {
        self.has_type
    }

    pub fn is_object(&self) -> bool {
        self.is_object
    }

    pub fn type_class(&self) -> Option<&str> {
        self.type_class.as_deref()
    }

    /// Declared type name, scalars included.
    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    /// Whether the argument's class is `candidate` or one of its declared
    /// descendants. Always false for non-object arguments.
    pub fn is_compatible_with(&self, candidate: &str) -> bool {
        match &self.type_class {
            Some(type_class) => {
                type_class == candidate || self.ancestors.iter().any(|a| a == candidate)
            }
            None => false,
        }
    }
}
