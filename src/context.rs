//! Execution context boundary.
//!
//! The bus supplies a context to every handler invocation; this crate only
//! passes it through to the stored thunk.

use std::any::Any;

use uuid::Uuid;

/// Type name handlers see for `dyn ExecutionContext` parameters.
pub const EXECUTION_CONTEXT_INTERFACE: &str = "ExecutionContext";
/// Type name of [`DetachedContext`].
pub const DETACHED_CONTEXT_CLASS: &str = "DetachedContext";

pub trait ExecutionContext: Send + Sync {
    /// Identifier of the operation the current message belongs to.
    fn trace_id(&self) -> Option<Uuid> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn ExecutionContext {
    pub fn downcast_ref<C: ExecutionContext + 'static>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }
}

/// Context without any bus state, for tests and direct invocation.
#[derive(Debug, Clone, Default)]
pub struct DetachedContext {
    trace_id: Option<Uuid>,
}

impl DetachedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_id(trace_id: Uuid) -> Self {
        Self {
            trace_id: Some(trace_id),
        }
    }
}

impl ExecutionContext for DetachedContext {
    fn trace_id(&self) -> Option<Uuid> {
        self.trace_id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
