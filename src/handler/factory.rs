//! Descriptor construction entry point.

use std::sync::Arc;

use tracing::{debug, debug_span, warn};

use super::{HandlerDescriptor, HandlerOptions, HandlerThunk};
use crate::config::DescriptorConfig;
use crate::core::{BusError, Result};
use crate::reflection::{HandlerReflection, MethodReflection};
use crate::types::{TypeClassifier, TypeRegistry};

/// A discovered handler method together with its invocation thunk.
pub struct BoundHandler {
    pub method: MethodReflection,
    pub thunk: Arc<dyn HandlerThunk>,
    /// Explicit message class; inferred from the arguments when absent
    pub message_class: Option<String>,
}

impl BoundHandler {
    pub fn new(method: MethodReflection, thunk: Arc<dyn HandlerThunk>) -> Self {
        Self {
            method,
            thunk,
            message_class: None,
        }
    }

    pub fn for_message(mut self, message_class: impl Into<String>) -> Self {
        self.message_class = Some(message_class.into());
        self
    }
}

/// Thunk and options supplied for one discovered method.
///
/// Converts from a bare thunk, which carries no options, or from a
/// `(thunk, options)` pair.
pub struct HandlerBinding {
    pub thunk: Arc<dyn HandlerThunk>,
    pub options: HandlerOptions,
}

impl From<Arc<dyn HandlerThunk>> for HandlerBinding {
    fn from(thunk: Arc<dyn HandlerThunk>) -> Self {
        Self {
            thunk,
            options: HandlerOptions::none(),
        }
    }
}

impl From<(Arc<dyn HandlerThunk>, HandlerOptions)> for HandlerBinding {
    fn from((thunk, options): (Arc<dyn HandlerThunk>, HandlerOptions)) -> Self {
        Self { thunk, options }
    }
}

/// Produces descriptors for discovered handlers.
///
/// The bound handler is consumed: no reflection record outlives `create`.
pub trait DescriptorFactory: Send + Sync {
    fn create(
        &self,
        handler: BoundHandler,
        options: HandlerOptions,
        description: Option<String>,
    ) -> Result<HandlerDescriptor>;
}

/// Factory classifying signatures against a [`TypeRegistry`].
#[derive(Debug, Clone)]
pub struct ReflectionDescriptorFactory {
    classifier: TypeClassifier,
    config: DescriptorConfig,
}

impl ReflectionDescriptorFactory {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(registry, DescriptorConfig::default())
    }

    pub fn with_config(registry: Arc<TypeRegistry>, config: DescriptorConfig) -> Self {
        Self {
            classifier: TypeClassifier::new(registry, config.unknown_types),
            config,
        }
    }

    pub fn config(&self) -> &DescriptorConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.classifier.registry()
    }

    /// Describe every reflected handler method of `T`.
    ///
    /// `bind` supplies the thunk, optionally with options, for a method
    /// name. Stops at the first failure.
    pub fn create_all<T, B, H>(&self, mut bind: B) -> Result<Vec<HandlerDescriptor>>
    where
        T: HandlerReflection,
        B: FnMut(&str) -> Option<H>,
        H: Into<HandlerBinding>,
    {
        T::handler_methods()
            .into_iter()
            .map(|method| {
                let binding: HandlerBinding = bind(&method.name)
                    .ok_or_else(|| BusError::MissingThunk {
                        method: method.name.clone(),
                    })?
                    .into();
                let HandlerBinding { thunk, options } = binding;
                self.create(BoundHandler::new(method, thunk), options, None)
            })
            .collect()
    }

    fn build(
        &self,
        handler: BoundHandler,
        options: HandlerOptions,
        description: Option<String>,
    ) -> Result<HandlerDescriptor> {
        let BoundHandler {
            method,
            thunk,
            message_class,
        } = handler;
        let infer = self.config.infer_message_class;
        let description = description.or_else(|| method.description.clone());

        HandlerDescriptor::assemble(
            &method,
            |arguments| {
                message_class
                    .or_else(|| {
                        infer
                            .then(|| arguments.iter().find_map(|a| a.type_class()))
                            .flatten()
                            .map(str::to_string)
                    })
                    .ok_or_else(|| BusError::MissingMessageClass {
                        method: method.name.clone(),
                    })
            },
            thunk,
            options,
            description,
            &self.classifier,
        )
    }
}

impl DescriptorFactory for ReflectionDescriptorFactory {
    fn create(
        &self,
        handler: BoundHandler,
        options: HandlerOptions,
        description: Option<String>,
    ) -> Result<HandlerDescriptor> {
        let method_name = handler.method.name.clone();
        let _span = debug_span!("describe_handler", method = %method_name).entered();

        match self.build(handler, options, description) {
            Ok(descriptor) => {
                debug!(
                    message_class = descriptor.message_class(),
                    arguments = descriptor.arguments().len(),
                    returns = ?descriptor.return_declaration(),
                    "handler described"
                );
                Ok(descriptor)
            }
            Err(err) => {
                warn!(error = %err, "handler rejected");
                Err(err)
            }
        }
    }
}
