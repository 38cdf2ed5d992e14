use std::sync::Arc;

use async_trait::async_trait;
use tracing::{Instrument, error, info_span};

use super::{HandlerDescriptor, HandlerOutput};
use crate::context::ExecutionContext;
use crate::core::{BusError, Result};
use crate::message::Message;

/// Runs one described handler against a message.
#[async_trait]
pub trait MessageExecutor: Send + Sync {
    fn descriptor(&self) -> &HandlerDescriptor;

    async fn execute(
        &self,
        message: Arc<dyn Message>,
        context: Arc<dyn ExecutionContext>,
    ) -> Result<HandlerOutput>;
}

/// Creates executors for descriptors; implemented by the bus.
pub trait MessageExecutorFactory: Send + Sync {
    fn create(&self, descriptor: HandlerDescriptor) -> Box<dyn MessageExecutor>;
}

/// Executor that calls the descriptor's thunk directly.
#[derive(Debug, Clone)]
pub struct DefaultMessageExecutor {
    descriptor: HandlerDescriptor,
}

impl DefaultMessageExecutor {
    pub fn new(descriptor: HandlerDescriptor) -> Self {
        Self { descriptor }
    }
}

#[async_trait]
impl MessageExecutor for DefaultMessageExecutor {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    async fn execute(
        &self,
        message: Arc<dyn Message>,
        context: Arc<dyn ExecutionContext>,
    ) -> Result<HandlerOutput> {
        let method = self.descriptor.method_name();
        let span = info_span!(
            "execute_handler",
            method,
            message_type = message.message_type(),
            trace_id = ?context.trace_id()
        );

        self.descriptor
            .thunk()
            .invoke(message, context)
            .instrument(span)
            .await
            .map_err(|source| {
                error!(method, error = %source, "handler failed");
                BusError::HandlerFailed {
                    method: method.to_string(),
                    source,
                }
            })
    }
}

/// Factory producing [`DefaultMessageExecutor`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessageExecutorFactory;

impl MessageExecutorFactory for DefaultMessageExecutorFactory {
    fn create(&self, descriptor: HandlerDescriptor) -> Box<dyn MessageExecutor> {
        Box::new(DefaultMessageExecutor::new(descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DetachedContext;
    use crate::handler::{HandlerOptions, thunk};
    use crate::reflection::MethodReflection;
    use crate::types::{TypeClassifier, TypeRegistry, UnknownTypePolicy};
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Ping;

    impl Message for Ping {
        fn message_type(&self) -> &'static str {
            "Ping"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn descriptor(thunk: Arc<dyn crate::handler::HandlerThunk>) -> HandlerDescriptor {
        let classifier = TypeClassifier::new(
            Arc::new(TypeRegistry::with_builtins()),
            UnknownTypePolicy::Reject,
        );
        HandlerDescriptor::new(
            "Ping",
            thunk,
            &MethodReflection::new("on_ping"),
            HandlerOptions::none(),
            None,
            &classifier,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_executor_invokes_thunk() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = thunk::dynamic(move |_, _| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        });

        let executor = DefaultMessageExecutorFactory.create(descriptor(handler));
        let output = executor
            .execute(Arc::new(Ping), Arc::new(DetachedContext::new()))
            .await
            .unwrap();

        assert!(output.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(executor.descriptor().method_name(), "on_ping");
    }

    #[tokio::test]
    async fn test_executor_wraps_handler_failure() {
        let handler = thunk::dynamic(|_, _| async { Err(anyhow::anyhow!("boom")) });
        let executor = DefaultMessageExecutor::new(descriptor(handler));

        let err = executor
            .execute(Arc::new(Ping), Arc::new(DetachedContext::new()))
            .await
            .unwrap_err();

        match err {
            BusError::HandlerFailed { method, source } => {
                assert_eq!(method, "on_ping");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
