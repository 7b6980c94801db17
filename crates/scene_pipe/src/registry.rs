use std::fmt;

use crate::error::{SceneError, SceneResult};

/// Opaque reference to a registered scene entity.
///
/// Handles are issued in creation order starting at 0 and are unique within
/// one registry. The reserved [`Handle::WORLD`] value refers to a fixed point
/// in the environment rather than a tracked entity and is accepted wherever a
/// body or joint reference is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub(crate) i32);

impl Handle {
    /// Sentinel meaning "the world" / "no entity".
    pub const WORLD: Handle = Handle(-1);

    /// Raw integer form used on the wire.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// True for the reserved world sentinel.
    pub fn is_world(self) -> bool {
        self == Handle::WORLD
    }

    fn index(self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of entity a handle denotes. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Body,
    Joint,
    Actuator,
    Sensor,
    Neuron,
    Synapse,
    Generic,
}

/// Append-only mapping from handle to category.
///
/// The registry is the authoritative source for handle validation: a handle is
/// valid iff it was issued by this registry, and every use of a handle in a
/// typed role is checked against the category it was registered under. There
/// is no deletion; handles are permanent for the session.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entries: Vec<Category>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next handle, tagged with `category`.
    pub fn register(&mut self, category: Category) -> Handle {
        let handle = Handle(self.entries.len() as i32);
        self.entries.push(category);
        handle
    }

    /// Number of handles issued so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The category `handle` was registered under, or None for the world
    /// sentinel and out-of-range values.
    pub fn category_of(&self, handle: Handle) -> Option<Category> {
        handle.index().and_then(|i| self.entries.get(i).copied())
    }

    /// Check that `handle` may stand in a role expecting `expected`.
    ///
    /// The world sentinel always passes regardless of the expected category.
    pub fn validate(
        &self,
        parameter: &'static str,
        handle: Handle,
        expected: Category,
    ) -> SceneResult<()> {
        if handle.is_world() {
            return Ok(());
        }
        match self.category_of(handle) {
            None => Err(SceneError::UnknownHandle(handle)),
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(SceneError::CategoryMismatch {
                parameter,
                handle,
                expected,
                actual,
            }),
        }
    }
}
