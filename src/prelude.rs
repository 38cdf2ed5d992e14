//! Everything needed to declare messages and describe their handlers.

pub use crate::config::DescriptorConfig;
pub use crate::context::{
    DETACHED_CONTEXT_CLASS, DetachedContext, EXECUTION_CONTEXT_INTERFACE, ExecutionContext,
};
pub use crate::core::{BusError, Result};
pub use crate::handler::{
    ArgumentDescriptor, BoundHandler, DefaultMessageExecutor, DefaultMessageExecutorFactory,
    DescriptorFactory, HandlerBinding, HandlerDescriptor, HandlerOptions, HandlerOutput,
    HandlerResult, HandlerSignature, HandlerThunk, MessageExecutor, MessageExecutorFactory,
    ReflectionDescriptorFactory, ReturnDescriptor, thunk,
};
pub use crate::message::{
    COMMAND_INTERFACE, EVENT_INTERFACE, MESSAGE_INTERFACE, Message, MessageType,
};
pub use crate::reflection::{
    HandlerReflection, MethodReflection, ParameterReflection, TypeDeclaration,
};
pub use crate::types::{TypeClassifier, TypeKind, TypeRegistry, UnknownTypePolicy};

pub use servicebus_common_derive::{Message, handler, message_handlers};
