/// Executor tests
///
/// Describe handlers, then run their thunks through the default executor.
/// Run with: cargo test --test executor_tests

use servicebus_common::prelude::*;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, Message)]
#[message(parents("Command"))]
struct ShipOrder {
    order_id: u64,
}

#[derive(Debug, Clone, Message)]
#[message(parents("Event"))]
struct OrderShipped {
    order_id: u64,
}

#[allow(dead_code)]
struct Shipping;

#[allow(dead_code)]
#[message_handlers]
impl Shipping {
    #[handler(description = "Ships the order and announces it")]
    async fn ship(&self, command: ShipOrder, context: Arc<dyn ExecutionContext>) -> OrderShipped {
        let _ = context;
        OrderShipped {
            order_id: command.order_id,
        }
    }
}

fn factory() -> ReflectionDescriptorFactory {
    let registry = TypeRegistry::with_builtins()
        .with_message::<ShipOrder>()
        .unwrap()
        .with_message::<OrderShipped>()
        .unwrap();
    ReflectionDescriptorFactory::new(Arc::new(registry))
}

#[tokio::test]
async fn test_described_handler_produces_follow_up() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let descriptors = factory()
        .create_all::<Shipping, _, _>(|method| {
            assert_eq!(method, "ship");
            let recorder = recorder.clone();
            Some(thunk::typed(move |command: ShipOrder, ctx: Arc<dyn ExecutionContext>| {
                let recorder = recorder.clone();
                async move {
                    recorder.lock().await.push((command.order_id, ctx.trace_id()));
                    Ok(Some(Arc::new(OrderShipped {
                        order_id: command.order_id,
                    }) as Arc<dyn Message>))
                }
            }))
        })
        .unwrap();

    let descriptor = descriptors.into_iter().next().unwrap();
    assert_eq!(descriptor.message_class(), "ShipOrder");
    assert_eq!(
        descriptor.return_declaration(),
        &ReturnDescriptor::Typed("OrderShipped".into())
    );
    assert_eq!(
        descriptor.arguments()[1].type_class(),
        Some("ExecutionContext")
    );

    let trace_id = Uuid::new_v4();
    let executor = DefaultMessageExecutorFactory.create(descriptor);
    let output = executor
        .execute(
            Arc::new(ShipOrder { order_id: 7 }),
            Arc::new(DetachedContext::with_trace_id(trace_id)),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(output.message_type(), "OrderShipped");
    assert_eq!(output.downcast_ref::<OrderShipped>().map(|m| m.order_id), Some(7));
    assert_eq!(*seen.lock().await, vec![(7, Some(trace_id))]);
}

#[tokio::test]
async fn test_wrong_message_is_reported_as_handler_failure() {
    let method = MethodReflection::new("ship")
        .with_parameter(ParameterReflection::typed("command", "ShipOrder"));
    let descriptor = factory()
        .create(
            BoundHandler::new(method, thunk::typed(|_: ShipOrder, _ctx| async { Ok(None) })),
            HandlerOptions::none(),
            None,
        )
        .unwrap();

    let executor = DefaultMessageExecutor::new(descriptor);
    let err = executor
        .execute(
            Arc::new(OrderShipped { order_id: 1 }),
            Arc::new(DetachedContext::new()),
        )
        .await
        .unwrap_err();

    match err {
        BusError::HandlerFailed { method, source } => {
            assert_eq!(method, "ship");
            assert!(matches!(
                source.downcast_ref::<BusError>(),
                Some(BusError::MessageTypeMismatch { expected, actual })
                    if expected == "ShipOrder" && actual == "OrderShipped"
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_shared_descriptor_runs_concurrently() {
    let method = MethodReflection::new("ship")
        .with_parameter(ParameterReflection::typed("command", "ShipOrder"));
    let descriptor = factory()
        .create(
            BoundHandler::new(
                method,
                thunk::typed(|command: ShipOrder, _ctx| async move {
                    Ok(Some(Arc::new(OrderShipped {
                        order_id: command.order_id,
                    }) as Arc<dyn Message>))
                }),
            ),
            HandlerOptions::none(),
            None,
        )
        .unwrap();

    let executor: Arc<dyn MessageExecutor> = Arc::new(DefaultMessageExecutor::new(descriptor));
    let tasks: Vec<_> = (0..8u64)
        .map(|order_id| {
            let executor = executor.clone();
            tokio::spawn(async move {
                executor
                    .execute(
                        Arc::new(ShipOrder { order_id }),
                        Arc::new(DetachedContext::new()),
                    )
                    .await
            })
        })
        .collect();

    let mut shipped = Vec::new();
    for task in tasks {
        let output = task.await.unwrap().unwrap().unwrap();
        shipped.push(output.downcast_ref::<OrderShipped>().unwrap().order_id);
    }
    shipped.sort_unstable();
    assert_eq!(shipped, (0..8).collect::<Vec<_>>());
}
