//! Small stateless helpers shared by bus components.

mod bytes;
mod datetime;
mod fs;

pub use bytes::format_bytes;
pub use datetime::{DEFAULT_DATETIME_FORMAT, datetime_instantiator, datetime_to_string};
pub use fs::remove_directory;

/// Generate a version 4 (random) UUID.
pub fn uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}
