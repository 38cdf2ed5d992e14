use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::{ArgumentDescriptor, HandlerOptions, HandlerThunk, ReturnDescriptor};
use crate::core::Result;
use crate::reflection::MethodReflection;
use crate::types::TypeClassifier;

/// Immutable description of one message handler.
///
/// Cloning is cheap: arguments, options and the thunk are shared.
#[derive(Clone)]
pub struct HandlerDescriptor {
    method_name: String,
    message_class: String,
    arguments: Arc<[ArgumentDescriptor]>,
    return_declaration: ReturnDescriptor,
    options: HandlerOptions,
    thunk: Arc<dyn HandlerThunk>,
    description: Option<String>,
}

/// Structural snapshot of a descriptor, without the thunk and options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerSignature {
    pub method_name: String,
    pub message_class: String,
    pub arguments: Vec<ArgumentDescriptor>,
    pub return_declaration: ReturnDescriptor,
    pub description: Option<String>,
}

impl HandlerDescriptor {
    /// Build a descriptor from a reflected method.
    ///
    /// Fails on the first malformed or unknown parameter type; a handler with
    /// one bad parameter cannot be described at all.
    pub fn new(
        message_class: impl Into<String>,
        thunk: Arc<dyn HandlerThunk>,
        method: &MethodReflection,
        options: HandlerOptions,
        description: Option<String>,
        classifier: &TypeClassifier,
    ) -> Result<Self> {
        let message_class = message_class.into();
        Self::assemble(
            method,
            |_| Ok(message_class),
            thunk,
            options,
            description,
            classifier,
        )
    }

    /// Like [`HandlerDescriptor::new`], deciding the message class once the
    /// arguments are classified.
    pub(crate) fn assemble<F>(
        method: &MethodReflection,
        message_class: F,
        thunk: Arc<dyn HandlerThunk>,
        options: HandlerOptions,
        description: Option<String>,
        classifier: &TypeClassifier,
    ) -> Result<Self>
    where
        F: FnOnce(&[ArgumentDescriptor]) -> Result<String>,
    {
        let arguments = method
            .parameters
            .iter()
            .enumerate()
            .map(|(index, parameter)| {
                ArgumentDescriptor::from_parameter(&method.name, index + 1, parameter, classifier)
            })
            .collect::<Result<Vec<_>>>()?;

        let return_declaration =
            ReturnDescriptor::from_declaration(&method.name, method.return_type.as_ref())?;
        let message_class = message_class(&arguments)?;

        Ok(Self {
            method_name: method.name.clone(),
            message_class,
            arguments: arguments.into(),
            return_declaration,
            options,
            thunk,
            description,
        })
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Message type this handler is registered for.
    pub fn message_class(&self) -> &str {
        &self.message_class
    }

    /// Arguments in declaration order; positions run from 1 without gaps.
    pub fn arguments(&self) -> &[ArgumentDescriptor] {
        &self.arguments
    }

    pub fn argument(&self, position: usize) -> Option<&ArgumentDescriptor> {
        position
            .checked_sub(1)
            .and_then(|index| self.arguments.get(index))
    }

    pub fn has_arguments(&self) -> bool {
        !self.arguments.is_empty()
    }

    pub fn return_declaration(&self) -> &ReturnDescriptor {
        &self.return_declaration
    }

    pub fn options(&self) -> &HandlerOptions {
        &self.options
    }

    pub fn thunk(&self) -> &Arc<dyn HandlerThunk> {
        &self.thunk
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// First argument whose class is `type_name` or a descendant of it.
    pub fn find_argument_compatible_with(&self, type_name: &str) -> Option<&ArgumentDescriptor> {
        self.arguments
            .iter()
            .find(|argument| argument.is_compatible_with(type_name))
    }

    pub fn signature(&self) -> HandlerSignature {
        HandlerSignature {
            method_name: self.method_name.clone(),
            message_class: self.message_class.clone(),
            arguments: self.arguments.to_vec(),
            return_declaration: self.return_declaration.clone(),
            description: self.description.clone(),
        }
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("method_name", &self.method_name)
            .field("message_class", &self.message_class)
            .field("arguments", &self.arguments)
            .field("return_declaration", &self.return_declaration)
            .field("options", &self.options)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BusError;
    use crate::handler::thunk;
    use crate::reflection::{ParameterReflection, TypeDeclaration};
    use crate::types::{TypeRegistry, UnknownTypePolicy};

    fn classifier() -> TypeClassifier {
        let registry = TypeRegistry::with_builtins()
            .with_class("OrderPlaced", ["Event"])
            .unwrap()
            .with_class("Context", Vec::<String>::new())
            .unwrap();
        TypeClassifier::new(Arc::new(registry), UnknownTypePolicy::Reject)
    }

    fn noop() -> Arc<dyn HandlerThunk> {
        thunk::dynamic(|_, _| async { Ok(None) })
    }

    #[test]
    fn test_positions_are_contiguous() {
        let method = MethodReflection::new("handle")
            .with_parameter(ParameterReflection::typed("event", "OrderPlaced"))
            .with_parameter(ParameterReflection::typed("id", "string"))
            .with_parameter(ParameterReflection::untyped("rest"));

        let descriptor = HandlerDescriptor::new(
            "OrderPlaced",
            noop(),
            &method,
            HandlerOptions::none(),
            None,
            &classifier(),
        )
        .unwrap();

        let positions: Vec<_> = descriptor.arguments().iter().map(|a| a.position()).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert!(descriptor.has_arguments());
        assert_eq!(descriptor.argument(2).map(|a| a.name()), Some("id"));
        assert!(descriptor.argument(0).is_none());
        assert!(descriptor.argument(4).is_none());
    }

    #[test]
    fn test_no_parameters() {
        let method = MethodReflection::new("tick");
        let descriptor = HandlerDescriptor::new(
            "OrderPlaced",
            noop(),
            &method,
            HandlerOptions::none(),
            Some("periodic".into()),
            &classifier(),
        )
        .unwrap();

        assert!(descriptor.arguments().is_empty());
        assert!(!descriptor.has_arguments());
        assert_eq!(descriptor.description(), Some("periodic"));
        assert!(descriptor.return_declaration().is_void());
    }

    #[test]
    fn test_fails_fast_on_malformed_parameter() {
        let method = MethodReflection::new("handle")
            .with_parameter(ParameterReflection::typed("event", "OrderPlaced"))
            .with_parameter(ParameterReflection::new(
                "either",
                Some(TypeDeclaration::union(["int", "string"])),
            ))
            .with_parameter(ParameterReflection::typed("ghost", "Ghost"));

        let err = HandlerDescriptor::new(
            "OrderPlaced",
            noop(),
            &method,
            HandlerOptions::none(),
            None,
            &classifier(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            BusError::MalformedArgumentType { parameter, position: 2, .. } if parameter == "either"
        ));
    }

    #[test]
    fn test_unresolvable_return_type() {
        let method = MethodReflection::new("handle")
            .with_return_type(TypeDeclaration::intersection(["Event", "Command"]));

        let err = HandlerDescriptor::new(
            "OrderPlaced",
            noop(),
            &method,
            HandlerOptions::none(),
            None,
            &classifier(),
        )
        .unwrap_err();

        assert!(matches!(err, BusError::UnresolvableReturnType { .. }));
    }

    #[test]
    fn test_find_compatible_argument() {
        let method = MethodReflection::new("handle")
            .with_parameter(ParameterReflection::typed("event", "OrderPlaced"))
            .with_parameter(ParameterReflection::typed("context", "Context"));

        let descriptor = HandlerDescriptor::new(
            "OrderPlaced",
            noop(),
            &method,
            HandlerOptions::none(),
            None,
            &classifier(),
        )
        .unwrap();

        assert_eq!(
            descriptor.find_argument_compatible_with("Message").map(|a| a.position()),
            Some(1)
        );
        assert_eq!(
            descriptor.find_argument_compatible_with("Context").map(|a| a.name()),
            Some("context")
        );
        assert!(descriptor.find_argument_compatible_with("Command").is_none());
    }

    #[test]
    fn test_descriptor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HandlerDescriptor>();
    }
}
