use thiserror::Error;

use crate::scene::{Named, SceneObject};

/// What a callback is attached to: a scene object or the name of one.
#[derive(Clone, Copy)]
pub enum Target<'a> {
    Object(&'a dyn Named),
    Name(&'a str),
}

/// Why a [`Target`] cannot be used as a registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("expected object to have a name property")]
    UnnamedObject,
    #[error("expected name to not be empty")]
    EmptyName,
    /// Only produced for loosely typed hosts, where null or a primitive can
    /// arrive in place of a target.
    #[error("expected an object or a string")]
    Unsupported,
}

impl<'a> Target<'a> {
    /// Extracts the registry key, rejecting unnamed objects and empty names.
    pub fn key(&self) -> Result<&'a str, TargetError> {
        match *self {
            Target::Object(object) => match object.name() {
                Some(name) if !name.is_empty() => Ok(name),
                _ => Err(TargetError::UnnamedObject),
            },
            Target::Name("") => Err(TargetError::EmptyName),
            Target::Name(name) => Ok(name),
        }
    }
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(name: &'a str) -> Self {
        Target::Name(name)
    }
}

impl<'a> From<&'a String> for Target<'a> {
    fn from(name: &'a String) -> Self {
        Target::Name(name.as_str())
    }
}

impl<'a> From<&'a SceneObject> for Target<'a> {
    fn from(object: &'a SceneObject) -> Self {
        Target::Object(object)
    }
}

impl<'a> From<&'a dyn Named> for Target<'a> {
    fn from(object: &'a dyn Named) -> Self {
        Target::Object(object)
    }
}

impl std::fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Object(object) => f.debug_tuple("Object").field(&object.name()).finish(),
            Target::Name(name) => f.debug_tuple("Name").field(name).finish(),
        }
    }
}
