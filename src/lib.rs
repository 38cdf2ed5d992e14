// ============================================================================
// servicebus-common: message handler descriptors
// ============================================================================
//!
//! Extracts immutable descriptions of message handler signatures.
//!
//! Handler discovery hands every candidate method to a [`DescriptorFactory`],
//! which classifies each parameter against an explicit [`TypeRegistry`],
//! classifies the return type and freezes the result, together with the
//! invocation thunk and handler options, into a [`HandlerDescriptor`] the
//! dispatcher can share across tasks without locking.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use servicebus_common::prelude::*;
//!
//! #[derive(Debug, Clone, Message)]
//! #[message(parents("Event"))]
//! struct OrderPlaced {
//!     order_id: u64,
//! }
//!
//! struct OrderListener;
//!
//! #[message_handlers]
//! impl OrderListener {
//!     #[handler(description = "Reserve stock for new orders")]
//!     async fn when_order_placed(&self, event: OrderPlaced, id: &str) {
//!         let _ = (event, id);
//!     }
//! }
//!
//! # fn main() -> servicebus_common::Result<()> {
//! let registry = TypeRegistry::with_builtins().with_message::<OrderPlaced>()?;
//! let factory = ReflectionDescriptorFactory::new(Arc::new(registry));
//!
//! let descriptors = factory.create_all::<OrderListener, _, _>(|_method| {
//!     Some(thunk::typed(|_event: OrderPlaced, _ctx| async { Ok(None) }))
//! })?;
//!
//! let descriptor = &descriptors[0];
//! assert_eq!(descriptor.message_class(), "OrderPlaced");
//! assert_eq!(descriptor.description(), Some("Reserve stock for new orders"));
//! assert!(descriptor.arguments()[0].is_compatible_with("Event"));
//! assert!(!descriptor.arguments()[1].is_object());
//! # Ok(())
//! # }
//! ```

extern crate self as servicebus_common;

pub mod config;
pub mod context;
pub mod core;
pub mod handler;
pub mod message;
pub mod prelude;
pub mod reflection;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use config::DescriptorConfig;
pub use context::{DetachedContext, ExecutionContext};
pub use crate::core::{BusError, Result};
pub use handler::{
    ArgumentDescriptor, BoundHandler, DescriptorFactory, HandlerBinding, HandlerDescriptor,
    HandlerOptions, HandlerSignature, HandlerThunk, ReflectionDescriptorFactory, ReturnDescriptor,
};
pub use message::{Message, MessageType};
pub use reflection::{HandlerReflection, MethodReflection, ParameterReflection, TypeDeclaration};
pub use types::{TypeClassifier, TypeKind, TypeRegistry, UnknownTypePolicy};

pub use servicebus_common_derive::{Message, handler, message_handlers};
