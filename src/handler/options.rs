use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// Handler-specific options, owned by whoever registers the handler.
///
/// Descriptors carry the value without interpreting it; consumers that know
/// the concrete type read it back with [`HandlerOptions::get`].
#[derive(Clone, Default)]
pub struct HandlerOptions {
    value: Option<Arc<dyn Any + Send + Sync>>,
    type_name: Option<&'static str>,
}

impl HandlerOptions {
    /// No options.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Some(Arc::new(value)),
            type_name: Some(type_name::<T>()),
        }
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.value.as_ref()?.downcast_ref::<T>()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Rust type name of the stored value.
    pub fn type_name(&self) -> Option<&'static str> {
        self.type_name
    }
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_name {
            Some(name) => write!(f, "HandlerOptions({name})"),
            None => f.write_str("HandlerOptions(none)"),
        }
    }
}
