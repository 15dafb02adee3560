//! Runtime type system.
//!
//! This module models the types of a JVM-style runtime the way reflection sees them: every type
//! has a qualified binary name, a flavor (primitive, class or interface), an optional superclass,
//! a set of implemented interfaces and its declared methods, constructors and fields.
//!
//! # Key Components
//!
//! - [`RuntimeType`]: Core type representation
//! - [`RuntimeTypeRef`]: Weak, non-owning reference to a type
//! - [`TypeRegistry`]: Central registry and name-based lookup service for all types
//! - [`TypeBuilder`]: Builder pattern for declaring types and their members
//! - [`PrimitiveKind`]: Built-in primitive types and their wrapper mapping
//! - [`TypeSignature`]: Ordered parameter or argument type list
//!
//! # Examples
//!
//! ```rust
//! use reflectscope::TypeRegistry;
//!
//! let registry = TypeRegistry::new()?;
//! let integer = registry.find_type("java.lang.Integer", None)?;
//! assert_eq!(integer.base().map(|b| b.name.clone()).as_deref(), Some("java.lang.Number"));
//! # Ok::<(), reflectscope::Error>(())
//! ```

mod base;
mod builder;
mod primitives;
mod registry;
mod signature;

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

pub use base::{RuntimeTypeRef, RuntimeTypeRefList, TypeFlavor};
pub use builder::TypeBuilder;
pub use primitives::{PrimitiveKind, PROMOTION_ORDER};
pub use registry::{TypeLoader, TypeRegistry};
pub use signature::{TypeSignature, NULL_ENTRY};

use crate::{
    error::type_error,
    metadata::{
        member::{MemberKind, MemberList, MemberRc, Modifiers},
        token::Token,
    },
    Result,
};

/// Qualified name of the root of the class hierarchy
pub const OBJECT_TYPE: &str = "java.lang.Object";

/// Reference to a `RuntimeType`
pub type RuntimeTypeRc = Arc<RuntimeType>;

/// A type of the runtime as seen through reflection.
///
/// Types are created through a [`TypeRegistry`] (usually via [`TypeBuilder`]), which owns the
/// strong references. Superclass and interface links are weak and must be upgraded on access.
pub struct RuntimeType {
    /// Token
    pub token: Token,
    /// Qualified binary name, nested types separated by `$` (`com.example.Outer$Inner`)
    pub name: String,
    /// The `TypeFlavor`
    pub flavor: TypeFlavor,
    /// Type modifiers (visibility, `abstract`, `final`, `static` for nested types, `interface`)
    pub modifiers: Modifiers,
    /// The superclass, unset for `java.lang.Object`, interfaces and primitives
    base: OnceLock<RuntimeTypeRef>,
    /// Directly implemented (or, for interfaces, extended) interfaces
    pub interfaces: RuntimeTypeRefList,
    /// Declared methods
    pub methods: MemberList,
    /// Declared constructors
    pub constructors: MemberList,
    /// Declared fields
    pub fields: MemberList,
}

impl RuntimeType {
    /// Create a new instance of a `RuntimeType`
    ///
    /// ## Arguments
    /// * 'token'       - The token of this type
    /// * 'name'        - The qualified binary name
    /// * 'flavor'      - The basic shape of the type
    /// * 'modifiers'   - Type modifiers
    #[must_use]
    pub fn new(token: Token, name: String, flavor: TypeFlavor, modifiers: Modifiers) -> Self {
        let modifiers = match flavor {
            TypeFlavor::Interface => modifiers | Modifiers::INTERFACE | Modifiers::ABSTRACT,
            _ => modifiers,
        };

        RuntimeType {
            token,
            name,
            flavor,
            modifiers,
            base: OnceLock::new(),
            interfaces: Arc::new(boxcar::Vec::new()),
            methods: Arc::new(boxcar::Vec::new()),
            constructors: Arc::new(boxcar::Vec::new()),
            fields: Arc::new(boxcar::Vec::new()),
        }
    }

    /// Set the superclass of this type
    ///
    /// ## Arguments
    /// * 'base' - The superclass
    ///
    /// # Errors
    /// Returns an error if the superclass was already set, or if this type is a primitive or an
    /// interface and cannot have one.
    pub fn set_base(&self, base: &RuntimeTypeRc) -> Result<()> {
        if self.flavor != TypeFlavor::Class {
            return Err(type_error!("{} can not have a superclass", self.name));
        }
        if base.flavor != TypeFlavor::Class {
            return Err(type_error!(
                "{} can not extend non-class type {}",
                self.name,
                base.name
            ));
        }

        self.base
            .set(base.into())
            .map_err(|_| type_error!("Superclass of {} is already set", self.name))
    }

    /// Access the superclass of this type, if it has one and it is still alive
    pub fn base(&self) -> Option<RuntimeTypeRc> {
        self.base.get().and_then(RuntimeTypeRef::upgrade)
    }

    /// Add a directly implemented interface
    ///
    /// # Errors
    /// Returns an error if `interface` is not an interface or this type is a primitive.
    pub fn add_interface(&self, interface: &RuntimeTypeRc) -> Result<()> {
        if self.is_primitive() || interface.flavor != TypeFlavor::Interface {
            return Err(type_error!(
                "{} can not implement {}",
                self.name,
                interface.name
            ));
        }

        self.interfaces.push(interface.into());
        Ok(())
    }

    /// The directly implemented interfaces that are still alive
    pub fn interfaces(&self) -> Vec<RuntimeTypeRc> {
        self.interfaces
            .iter()
            .filter_map(|(_, interface)| interface.upgrade())
            .collect()
    }

    /// Returns the primitive kind, if this is a primitive type
    #[must_use]
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        self.flavor.primitive()
    }

    /// Returns true for primitive types
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.flavor.is_primitive()
    }

    /// Returns true for interfaces
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flavor == TypeFlavor::Interface
    }

    /// The part of the name after the package
    #[must_use]
    pub fn simple_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(pos) => &self.name[pos + 1..],
            None => &self.name,
        }
    }

    /// The package of this type, empty for the default package and primitives
    #[must_use]
    pub fn package(&self) -> &str {
        match self.name.rfind('.') {
            Some(pos) => &self.name[..pos],
            None => "",
        }
    }

    /// The declared members of the given kind
    #[must_use]
    pub fn members(&self, kind: MemberKind) -> &MemberList {
        match kind {
            MemberKind::Method => &self.methods,
            MemberKind::Constructor => &self.constructors,
            MemberKind::Field => &self.fields,
        }
    }

    pub(crate) fn add_member(&self, member: MemberRc) {
        self.members(member.kind).push(member);
    }
}

impl fmt::Debug for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeType")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("flavor", &self.flavor)
            .field("base", &self.base.get())
            .field("methods", &self.methods.count())
            .field("constructors", &self.constructors.count())
            .field("fields", &self.fields.count())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
