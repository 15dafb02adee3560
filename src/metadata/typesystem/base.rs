use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::{
    metadata::{
        token::Token,
        typesystem::{PrimitiveKind, RuntimeType, RuntimeTypeRc},
    },
    Error, Result,
};

/// A vector that holds a list of `RuntimeTypeRef`
pub type RuntimeTypeRefList = Arc<boxcar::Vec<RuntimeTypeRef>>;

/// A smart reference to a `RuntimeType` that automatically handles weak references
/// to prevent circular reference memory leaks while providing a clean API.
///
/// The token and name of the target are captured at creation, so identity checks and
/// diagnostics work without upgrading the reference.
#[derive(Clone)]
pub struct RuntimeTypeRef {
    weak_ref: Weak<RuntimeType>,
    token: Token,
    name: Arc<str>,
}

impl RuntimeTypeRef {
    /// Create a new `RuntimeTypeRef` from a strong reference
    pub fn new(strong_ref: &RuntimeTypeRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
            token: strong_ref.token,
            name: Arc::from(strong_ref.name.as_str()),
        }
    }

    /// Get a strong reference to the type, returning None if the type has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<RuntimeTypeRc> {
        self.weak_ref.upgrade()
    }

    /// Get a strong reference to the type
    ///
    /// # Errors
    /// Returns [`Error::TypeDropped`] if the referenced type no longer exists.
    pub fn resolve(&self) -> Result<RuntimeTypeRc> {
        self.weak_ref
            .upgrade()
            .ok_or(Error::TypeDropped(self.token))
    }

    /// Check if the referenced type is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// The token of the referenced type
    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// The qualified name of the referenced type
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this reference points at `ty`
    #[must_use]
    pub fn is(&self, ty: &RuntimeType) -> bool {
        self.token == ty.token
    }
}

impl From<RuntimeTypeRc> for RuntimeTypeRef {
    fn from(strong_ref: RuntimeTypeRc) -> Self {
        Self::new(&strong_ref)
    }
}

impl From<&RuntimeTypeRc> for RuntimeTypeRef {
    fn from(strong_ref: &RuntimeTypeRc) -> Self {
        Self::new(strong_ref)
    }
}

impl fmt::Debug for RuntimeTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuntimeTypeRef({}, {})", self.name, self.token)
    }
}

/// The basic shape of a runtime type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    /// One of the built-in primitives
    Primitive(PrimitiveKind),
    /// A class (including the wrapper types and `java.lang.Object`)
    Class,
    /// An interface
    Interface,
}

impl TypeFlavor {
    /// Returns the primitive kind, if this is a primitive flavor
    #[must_use]
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            TypeFlavor::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Returns true for primitive flavors
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeFlavor::Primitive(_))
    }
}
