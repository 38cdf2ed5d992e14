//! Handler descriptors.
//!
//! Provides:
//! - [`ArgumentDescriptor`] - one classified parameter
//! - [`ReturnDescriptor`] - return type classification
//! - [`HandlerDescriptor`] - the frozen description handed to the dispatcher
//! - [`DescriptorFactory`] - the construction entry point
//! - [`MessageExecutor`] - invocation of a described handler
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use servicebus_common::handler::{
//!     BoundHandler, DescriptorFactory, HandlerOptions, ReflectionDescriptorFactory, thunk,
//! };
//! use servicebus_common::reflection::{MethodReflection, ParameterReflection};
//! use servicebus_common::types::TypeRegistry;
//!
//! let registry = TypeRegistry::with_builtins()
//!     .with_class("OrderPlaced", ["Event"])
//!     .unwrap();
//! let factory = ReflectionDescriptorFactory::new(Arc::new(registry));
//!
//! let method = MethodReflection::new("when_order_placed")
//!     .with_parameter(ParameterReflection::typed("event", "OrderPlaced"));
//! let handler = thunk::dynamic(|_message, _context| async { Ok(None) });
//!
//! let descriptor = factory
//!     .create(BoundHandler::new(method, handler), HandlerOptions::none(), None)
//!     .unwrap();
//!
//! assert_eq!(descriptor.message_class(), "OrderPlaced");
//! assert!(descriptor.arguments()[0].is_compatible_with("Event"));
//! ```

mod argument;
mod descriptor;
mod executor;
mod factory;
mod options;
mod return_declaration;
pub mod thunk;

pub use argument::ArgumentDescriptor;
pub use descriptor::{HandlerDescriptor, HandlerSignature};
pub use executor::{
    DefaultMessageExecutor, DefaultMessageExecutorFactory, MessageExecutor, MessageExecutorFactory,
};
pub use factory::{BoundHandler, DescriptorFactory, HandlerBinding, ReflectionDescriptorFactory};
pub use options::HandlerOptions;
pub use return_declaration::ReturnDescriptor;
pub use thunk::{HandlerOutput, HandlerResult, HandlerThunk, TypedThunk};
