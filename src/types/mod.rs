//! Bounded type system used to classify handler signatures.
//!
//! A [`TypeRegistry`] is populated once during bootstrap with every class and
//! interface a handler may reference, together with their declared parents.
//! The [`TypeClassifier`] then answers the only two questions descriptor
//! construction needs: "is this name an object type?" and "what are its
//! ancestors?".

mod classifier;
mod registry;

pub use classifier::{TypeClass, TypeClassifier, UnknownTypePolicy};
pub use registry::{DEFAULT_SCALARS, TypeEntry, TypeKind, TypeRegistry};
