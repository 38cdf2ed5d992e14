/// Descriptor construction tests
///
/// Signature scenarios and structural properties of handler descriptors.
/// Run with: cargo test --test descriptor_tests

use servicebus_common::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone, Message)]
#[message(parents("Event"))]
struct OrderPlaced {
    order_id: u64,
}

#[derive(Debug, Clone, Message)]
#[message(name = "OrderShipped", parents("Event"))]
struct ShippedEvent;

fn registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::with_builtins()
        .with_message::<OrderPlaced>()
        .unwrap()
        .with_message::<ShippedEvent>()
        .unwrap()
        .with_interface("Context", Vec::<String>::new())
        .unwrap();
    Arc::new(registry)
}

fn factory() -> ReflectionDescriptorFactory {
    ReflectionDescriptorFactory::new(registry())
}

fn noop() -> Arc<dyn HandlerThunk> {
    thunk::dynamic(|_, _| async { Ok(None) })
}

fn describe(method: MethodReflection) -> Result<HandlerDescriptor> {
    factory().create(BoundHandler::new(method, noop()), HandlerOptions::none(), None)
}

#[test]
fn test_order_placed_with_context() {
    let method = MethodReflection::new("handle")
        .with_parameter(ParameterReflection::typed("event", "OrderPlaced"))
        .with_parameter(ParameterReflection::typed("ctx", "Context"));

    let descriptor = describe(method).unwrap();

    assert_eq!(descriptor.method_name(), "handle");
    assert_eq!(descriptor.arguments().len(), 2);

    let event = &descriptor.arguments()[0];
    assert_eq!(event.position(), 1);
    assert!(event.is_object());
    assert_eq!(event.type_class(), Some("OrderPlaced"));

    let ctx = &descriptor.arguments()[1];
    assert_eq!(ctx.position(), 2);
    assert!(ctx.is_object());
    assert_eq!(ctx.type_class(), Some("Context"));

    assert_eq!(descriptor.return_declaration(), &ReturnDescriptor::Void);
}

#[test]
fn test_scalar_argument() {
    let method = MethodReflection::new("handle")
        .with_parameter(ParameterReflection::typed("id", "string"));

    let descriptor = factory()
        .create(
            BoundHandler::new(method, noop()).for_message("OrderPlaced"),
            HandlerOptions::none(),
            None,
        )
        .unwrap();

    let id = &descriptor.arguments()[0];
    assert!(id.has_type());
    assert!(!id.is_object());
    assert_eq!(id.type_class(), None);
}

#[test]
fn test_union_argument_reports_name_and_position() {
    let method = MethodReflection::new("handle")
        .with_parameter(ParameterReflection::typed("event", "OrderPlaced"))
        .with_parameter(ParameterReflection::new(
            "payload",
            Some(TypeDeclaration::union(["OrderPlaced", "OrderShipped"])),
        ));

    let err = describe(method).unwrap_err();
    assert!(err.is_construction_error());

    match err {
        BusError::MalformedArgumentType {
            method,
            parameter,
            position,
            ..
        } => {
            assert_eq!(method, "handle");
            assert_eq!(parameter, "payload");
            assert_eq!(position, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_no_parameter_handler() {
    let descriptor = factory()
        .create(
            BoundHandler::new(MethodReflection::new("tick"), noop()).for_message("OrderPlaced"),
            HandlerOptions::none(),
            None,
        )
        .unwrap();

    assert!(descriptor.arguments().is_empty());
    assert!(!descriptor.has_arguments());
}

#[test]
fn test_positions_match_declaration_order() {
    for n in 0..6 {
        let method = (0..n).fold(MethodReflection::new("handle"), |method, i| {
            method.with_parameter(ParameterReflection::typed(format!("p{i}"), "int"))
        });

        let descriptor = factory()
            .create(
                BoundHandler::new(method, noop()).for_message("OrderPlaced"),
                HandlerOptions::none(),
                None,
            )
            .unwrap();

        let positions: Vec<_> = descriptor.arguments().iter().map(|a| a.position()).collect();
        let names: Vec<_> = descriptor.arguments().iter().map(|a| a.name().to_string()).collect();
        assert_eq!(positions, (1..=n).collect::<Vec<_>>());
        assert_eq!(names, (0..n).map(|i| format!("p{i}")).collect::<Vec<_>>());
        assert_eq!(descriptor.has_arguments(), n > 0);
    }
}

#[test]
fn test_argument_invariants_hold() {
    let method = MethodReflection::new("handle")
        .with_parameter(ParameterReflection::typed("event", "OrderPlaced"))
        .with_parameter(ParameterReflection::typed("count", "int"))
        .with_parameter(ParameterReflection::untyped("anything"))
        .with_parameter(ParameterReflection::typed("ctx", "Context"));

    let descriptor = describe(method).unwrap();

    for argument in descriptor.arguments() {
        assert_eq!(argument.is_object(), argument.type_class().is_some());
        if !argument.has_type() {
            assert!(!argument.is_object());
            assert!(argument.type_class().is_none());
        }
    }
}

#[test]
fn test_compatibility_is_reflexive_and_transitive() {
    let registry = TypeRegistry::with_builtins()
        .with_interface("DomainEvent", ["Event"])
        .unwrap()
        .with_class("OrderEvent", ["DomainEvent"])
        .unwrap()
        .with_class("OrderPlaced", ["OrderEvent"])
        .unwrap();
    let factory = ReflectionDescriptorFactory::new(Arc::new(registry));

    let method = MethodReflection::new("handle")
        .with_parameter(ParameterReflection::typed("event", "OrderPlaced"));
    let descriptor = factory
        .create(BoundHandler::new(method, noop()), HandlerOptions::none(), None)
        .unwrap();
    let event = &descriptor.arguments()[0];

    assert!(event.is_compatible_with("OrderPlaced"));
    assert!(event.is_compatible_with("OrderEvent"));
    assert!(event.is_compatible_with("DomainEvent"));
    assert!(event.is_compatible_with("Event"));
    assert!(event.is_compatible_with("Message"));
    assert!(!event.is_compatible_with("Command"));
    assert!(!event.is_compatible_with("OrderPlacedV2"));

    for ancestor in event.ancestors() {
        assert!(factory.registry().is_subtype_of("OrderPlaced", ancestor));
    }
}

#[test]
fn test_same_signature_yields_equal_descriptors() {
    let method = MethodReflection::new("handle")
        .with_parameter(ParameterReflection::typed("event", "OrderPlaced"))
        .with_parameter(ParameterReflection::typed("ctx", "Context"))
        .with_return_type(TypeDeclaration::named("OrderShipped"));

    let first = describe(method.clone()).unwrap();
    let second = describe(method).unwrap();

    assert_eq!(first.signature(), second.signature());
    assert_eq!(
        serde_json::to_value(first.signature()).unwrap(),
        serde_json::to_value(second.signature()).unwrap()
    );
}

#[test]
fn test_signature_snapshot() {
    let method = MethodReflection::new("handle")
        .with_parameter(ParameterReflection::typed("event", "OrderPlaced"))
        .with_return_type(TypeDeclaration::named("OrderShipped"));

    let signature = serde_json::to_value(describe(method).unwrap().signature()).unwrap();

    assert_eq!(signature["method_name"], "handle");
    assert_eq!(signature["message_class"], "OrderPlaced");
    assert_eq!(signature["arguments"][0]["position"], 1);
    assert_eq!(signature["arguments"][0]["type_class"], "OrderPlaced");
    assert_eq!(signature["return_declaration"]["Typed"], "OrderShipped");
}

#[test]
fn test_unknown_argument_type_rejected() {
    let method = MethodReflection::new("handle")
        .with_parameter(ParameterReflection::typed("event", "OrderPlaced"))
        .with_parameter(ParameterReflection::typed("invoice", "Invoice"));

    match describe(method).unwrap_err() {
        BusError::UnknownType {
            method,
            parameter,
            position,
            type_name,
        } => {
            assert_eq!(method, "handle");
            assert_eq!(parameter, "invoice");
            assert_eq!(position, 2);
            assert_eq!(type_name, "Invoice");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_options_are_carried_untouched() {
    #[derive(Debug, PartialEq)]
    struct Validation {
        groups: Vec<&'static str>,
    }

    let method = MethodReflection::new("handle")
        .with_parameter(ParameterReflection::typed("event", "OrderPlaced"));
    let descriptor = factory()
        .create(
            BoundHandler::new(method, noop()),
            HandlerOptions::new(Validation {
                groups: vec!["strict"],
            }),
            Some("validated handler".into()),
        )
        .unwrap();

    let cloned = descriptor.clone();
    assert_eq!(
        cloned.options().get::<Validation>(),
        Some(&Validation {
            groups: vec!["strict"]
        })
    );
    assert_eq!(cloned.description(), Some("validated handler"));
}

#[test]
fn test_descriptors_shared_across_threads() {
    let method = MethodReflection::new("handle")
        .with_parameter(ParameterReflection::typed("event", "OrderPlaced"));
    let descriptor = Arc::new(describe(method).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let descriptor = descriptor.clone();
            std::thread::spawn(move || descriptor.arguments()[0].is_compatible_with("Event"))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
