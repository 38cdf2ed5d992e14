use std::collections::{HashSet, VecDeque};
use std::fmt;

use im::{HashMap, HashSet as PersistentSet};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::context::{DETACHED_CONTEXT_CLASS, EXECUTION_CONTEXT_INTERFACE};
use crate::core::{BusError, Result};
use crate::message::{COMMAND_INTERFACE, EVENT_INTERFACE, MESSAGE_INTERFACE, MessageType};

/// Scalar names recognised out of the box.
pub const DEFAULT_SCALARS: &[&str] = &[
    // Rust primitives and std containers as reported by the handler macros
    "bool", "char", "str", "String", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16",
    "u32", "u64", "u128", "usize", "f32", "f64", "Vec", "HashMap", "BTreeMap",
    // Loosely typed names used by hand-written reflection records
    "string", "int", "float", "array", "iterable", "callable", "mixed", "object", "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class => f.write_str("class"),
            Self::Interface => f.write_str("interface"),
        }
    }
}

/// A registered class or interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    pub kind: TypeKind,
    /// Superclass and implemented interfaces, in declaration order
    pub parents: Vec<String>,
}

/// Registry of known class, interface and scalar names.
///
/// Immutable once built: every `with_*` call returns a new registry sharing
/// structure with the old one, so a registry handed to a factory never changes
/// under it. Parents must be registered before their children, which keeps
/// the hierarchy acyclic.
#[derive(Clone)]
pub struct TypeRegistry {
    types: HashMap<String, TypeEntry>,
    scalars: PersistentSet<String>,
}

impl TypeRegistry {
    /// Empty registry that only knows [`DEFAULT_SCALARS`].
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
            scalars: DEFAULT_SCALARS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Registry with the `Message`, `Command` and `Event` interfaces, plus
    /// the `ExecutionContext` interface and `DetachedContext` class handlers
    /// receive their context as.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert_builtin(MESSAGE_INTERFACE, TypeKind::Interface, &[]);
        registry.insert_builtin(COMMAND_INTERFACE, TypeKind::Interface, &[MESSAGE_INTERFACE]);
        registry.insert_builtin(EVENT_INTERFACE, TypeKind::Interface, &[MESSAGE_INTERFACE]);
        registry.insert_builtin(EXECUTION_CONTEXT_INTERFACE, TypeKind::Interface, &[]);
        registry.insert_builtin(
            DETACHED_CONTEXT_CLASS,
            TypeKind::Class,
            &[EXECUTION_CONTEXT_INTERFACE],
        );
        registry
    }

    fn insert_builtin(&mut self, name: &str, kind: TypeKind, parents: &[&str]) {
        self.types.insert(
            name.to_string(),
            TypeEntry {
                name: name.to_string(),
                kind,
                parents: parents.iter().map(|p| p.to_string()).collect(),
            },
        );
    }

    pub fn with_class<I, S>(self, name: impl Into<String>, parents: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_type(name.into(), TypeKind::Class, parents)
    }

    pub fn with_interface<I, S>(self, name: impl Into<String>, parents: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_type(name.into(), TypeKind::Interface, parents)
    }

    /// Register a message type from its static metadata.
    pub fn with_message<M: MessageType>(self) -> Result<Self> {
        self.with_type(
            M::TYPE_NAME.to_string(),
            M::KIND,
            M::parents().iter().copied(),
        )
    }

    /// Register an additional scalar name.
    pub fn with_scalar(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Err(BusError::TypeAlreadyRegistered(name));
        }

        trace!(scalar = %name, "registered scalar type");
        self.scalars.insert(name);
        Ok(self)
    }

    fn with_type<I, S>(mut self, name: String, kind: TypeKind, parents: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.types.contains_key(&name) || self.scalars.contains(&name) {
            return Err(BusError::TypeAlreadyRegistered(name));
        }

        let parents: Vec<String> = parents.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        let mut class_parents = 0;

        for parent in &parents {
            if !seen.insert(parent.as_str()) {
                return Err(BusError::InvalidHierarchy(format!(
                    "{kind} '{name}' lists parent '{parent}' more than once"
                )));
            }

            let entry = self.types.get(parent).ok_or_else(|| BusError::UnknownParentType {
                type_name: name.clone(),
                parent: parent.clone(),
            })?;

            match (kind, entry.kind) {
                (TypeKind::Interface, TypeKind::Class) => {
                    return Err(BusError::InvalidHierarchy(format!(
                        "interface '{name}' cannot extend class '{parent}'"
                    )));
                }
                (TypeKind::Class, TypeKind::Class) => class_parents += 1,
                _ => {}
            }
        }

        if class_parents > 1 {
            return Err(BusError::InvalidHierarchy(format!(
                "class '{name}' extends more than one class"
            )));
        }

        trace!(type_name = %name, %kind, parents = ?parents, "registered type");
        self.types.insert(
            name.clone(),
            TypeEntry {
                name,
                kind,
                parents,
            },
        );

        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&TypeEntry> {
        self.types.get(name)
    }

    /// Whether `name` is a registered class or interface.
    pub fn is_object_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn is_scalar(&self, name: &str) -> bool {
        self.scalars.contains(name)
    }

    /// Transitive closure of the declared parents of `name`, nearest first.
    ///
    /// Returns an empty list for unknown names and for roots.
    pub fn ancestors(&self, name: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        if let Some(entry) = self.types.get(name) {
            queue.extend(entry.parents.iter().map(String::as_str));
        }

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            result.push(current.to_string());
            if let Some(entry) = self.types.get(current) {
                queue.extend(entry.parents.iter().map(String::as_str));
            }
        }

        result
    }

    /// Nominal subtype check: `sub` equals `sup` or declares it as an ancestor.
    pub fn is_subtype_of(&self, sub: &str, sup: &str) -> bool {
        if !self.is_object_type(sub) {
            return false;
        }
        sub == sup || self.ancestors(sub).iter().any(|ancestor| ancestor == sup)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn list_types(&self) -> Vec<&str> {
        self.types.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.len())
            .field("scalars", &self.scalars.len())
            .finish()
    }
}
