//! Discovery-time signature records.
//!
//! These are the inputs descriptor construction reflects over. They are
//! produced either by hand or by the `#[message_handlers]` attribute, which
//! records the signature of every `#[handler]` method at compile time. Nothing
//! built from them keeps a reference back to them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a parameter or return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDeclaration {
    Named(String),
    Union(Vec<String>),
    Intersection(Vec<String>),
}

impl TypeDeclaration {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn union<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Union(names.into_iter().map(Into::into).collect())
    }

    pub fn intersection<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Intersection(names.into_iter().map(Into::into).collect())
    }

    /// The single name, if this is a simple named type.
    pub fn as_named(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Union(names) => f.write_str(&names.join("|")),
            Self::Intersection(names) => f.write_str(&names.join("&")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterReflection {
    pub name: String,
    pub declared_type: Option<TypeDeclaration>,
}

impl ParameterReflection {
    pub fn new(name: impl Into<String>, declared_type: Option<TypeDeclaration>) -> Self {
        Self {
            name: name.into(),
            declared_type,
        }
    }

    /// Parameter with a single named type.
    pub fn typed(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, Some(TypeDeclaration::named(type_name)))
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }
}

/// Signature of one handler method, parameters in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodReflection {
    pub name: String,
    pub parameters: Vec<ParameterReflection>,
    pub return_type: Option<TypeDeclaration>,
    pub description: Option<String>,
}

impl MethodReflection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterReflection) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_return_type(mut self, return_type: TypeDeclaration) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Types whose handler methods were reflected at compile time.
///
/// Implemented by `#[message_handlers]`, which records every method marked
/// `#[handler]`:
///
/// ```
/// use servicebus_common::prelude::*;
///
/// #[derive(Debug, Clone, Message)]
/// struct OrderPlaced;
///
/// struct Listener;
///
/// #[message_handlers]
/// impl Listener {
///     #[handler]
///     fn on_placed(&self, event: OrderPlaced) {
///         let _ = event;
///     }
/// }
///
/// assert_eq!(Listener::handler_methods()[0].name, "on_placed");
/// ```
///
/// A marker outside such a block is rejected instead of silently skipped:
///
/// ```compile_fail
/// use servicebus_common::prelude::*;
///
/// #[derive(Debug, Clone, Message)]
/// struct OrderPlaced;
///
/// struct Stray;
///
/// impl Stray {
///     #[handler]
///     fn forgotten(&self, event: OrderPlaced) {
///         let _ = event;
///     }
/// }
/// ```
///
/// So is a handler argument of unit type:
///
/// ```compile_fail
/// use servicebus_common::prelude::*;
///
/// struct Listener;
///
/// #[message_handlers]
/// impl Listener {
///     #[handler]
///     fn on_nothing(&self, nothing: ()) {
///         let _ = nothing;
///     }
/// }
/// ```
pub trait HandlerReflection {
    fn handler_methods() -> Vec<MethodReflection>;
}
