//! Message markers.
//!
//! [`Message`] is the object-safe view handed to invocation thunks, while
//! [`MessageType`] carries the static metadata (name and declared parents)
//! used to populate a [`TypeRegistry`](crate::types::TypeRegistry) during
//! bootstrap. Both are normally implemented with `#[derive(Message)]`.

use std::any::Any;
use std::fmt;

use crate::types::TypeKind;

/// Root interface every message type descends from.
pub const MESSAGE_INTERFACE: &str = "Message";

/// Marker interface for commands (requests for an action with one owner).
pub const COMMAND_INTERFACE: &str = "Command";

/// Marker interface for events (facts published to any number of listeners).
pub const EVENT_INTERFACE: &str = "Event";

/// A message instance as seen by handlers and executors.
pub trait Message: Any + Send + Sync + fmt::Debug {
    /// Registered type name of this message.
    fn message_type(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

impl dyn Message {
    /// Downcast to a concrete message type.
    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.as_any().downcast_ref::<M>()
    }

    pub fn is<M: Message>(&self) -> bool {
        self.as_any().is::<M>()
    }
}

/// Static type metadata of a message.
pub trait MessageType: Message + Sized {
    /// Name the type is registered under.
    const TYPE_NAME: &'static str;

    /// Whether the name denotes a class or an interface.
    const KIND: TypeKind = TypeKind::Class;

    /// Declared parents (superclass and implemented interfaces).
    fn parents() -> &'static [&'static str] {
        &[MESSAGE_INTERFACE]
    }
}
