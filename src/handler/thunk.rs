//! Invocation thunks.
//!
//! A thunk is the deferred call into a handler method: it receives the
//! message and the execution context and yields a future. Descriptors only
//! store thunks; executing them is the dispatcher's job.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::context::ExecutionContext;
use crate::core::BusError;
use crate::message::{Message, MessageType};

/// What a handler produces: optionally a follow-up message.
pub type HandlerOutput = Option<Arc<dyn Message>>;

/// Result of one handler invocation.
pub type HandlerResult = anyhow::Result<HandlerOutput>;

pub trait HandlerThunk: Send + Sync + 'static {
    fn invoke(
        &self,
        message: Arc<dyn Message>,
        context: Arc<dyn ExecutionContext>,
    ) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> HandlerThunk for F
where
    F: Fn(Arc<dyn Message>, Arc<dyn ExecutionContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn invoke(
        &self,
        message: Arc<dyn Message>,
        context: Arc<dyn ExecutionContext>,
    ) -> BoxFuture<'static, HandlerResult> {
        Box::pin((self)(message, context))
    }
}

/// Thunk that downcasts the message to `M` before calling the handler.
pub struct TypedThunk<M, F, Fut>
where
    M: MessageType + Clone,
    F: Fn(M, Arc<dyn ExecutionContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    handler: F,
    _phantom: PhantomData<fn(M) -> Fut>,
}

impl<M, F, Fut> TypedThunk<M, F, Fut>
where
    M: MessageType + Clone,
    F: Fn(M, Arc<dyn ExecutionContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<M, F, Fut> HandlerThunk for TypedThunk<M, F, Fut>
where
    M: MessageType + Clone,
    F: Fn(M, Arc<dyn ExecutionContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn invoke(
        &self,
        message: Arc<dyn Message>,
        context: Arc<dyn ExecutionContext>,
    ) -> BoxFuture<'static, HandlerResult> {
        let Some(typed) = message.downcast_ref::<M>() else {
            let err = BusError::MessageTypeMismatch {
                expected: M::TYPE_NAME.to_string(),
                actual: message.message_type().to_string(),
            };
            return Box::pin(async move { Err(err.into()) });
        };

        Box::pin((self.handler)(typed.clone(), context))
    }
}

/// Wrap a closure taking a concrete message type into a shared thunk.
pub fn typed<M, F, Fut>(handler: F) -> Arc<dyn HandlerThunk>
where
    M: MessageType + Clone,
    F: Fn(M, Arc<dyn ExecutionContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(TypedThunk::new(handler))
}

/// Wrap a closure over the dynamic message into a shared thunk.
pub fn dynamic<F, Fut>(handler: F) -> Arc<dyn HandlerThunk>
where
    F: Fn(Arc<dyn Message>, Arc<dyn ExecutionContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(handler)
}
