//! Central type registry and name-based type lookup.
//!
//! The [`TypeRegistry`] owns every [`RuntimeType`] created through it, hands out unique tokens
//! for types and members, and answers `find_type` queries by qualified name. Names that are not
//! registered locally are requested from [`TypeLoader`]s: first the loader hint given by the
//! caller, then the registry's default loaders in registration order. Every successful lookup is
//! cached by name, so each qualified name is loaded at most once per registry.
//!
//! # Bootstrap Types
//!
//! A new registry already contains:
//! - the primitives `boolean`, `byte`, `char`, `short`, `int`, `long`, `float`, `double`, `void`
//! - `java.lang.Object`, `java.lang.Number`, `java.lang.String`
//! - the wrappers `java.lang.Boolean` ... `java.lang.Double` and `java.lang.Void`
//! - the interfaces `java.io.Serializable`, `java.lang.Comparable`, `java.lang.CharSequence`
//!
//! with their usual hierarchy: numeric wrappers extend `Number`, which implements
//! `Serializable`; wrappers and `String` implement `Comparable` and `Serializable`; `String`
//! implements `CharSequence`.
//!
//! # Thread Safety
//!
//! All operations take `&self` and are safe to call concurrently. Types are stored in a
//! lock-free skip list, the name cache is a sharded [`DashMap`].
//!
//! # Examples
//!
//! ```rust
//! use reflectscope::TypeRegistry;
//!
//! let registry = TypeRegistry::new()?;
//! let string = registry.find_type("java.lang.String", None)?;
//! assert_eq!(string.interfaces().len(), 3);
//! assert!(registry.find_type("java.lang.Thread", None).is_err());
//! # Ok::<(), reflectscope::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::{mapref::entry::Entry, DashMap};
use strum::IntoEnumIterator;

use crate::{
    error::type_error,
    metadata::{
        member::{MemberBuilder, MemberKind, MemberRc, Modifiers},
        reflection::Reflection,
        token::Token,
        typesystem::{PrimitiveKind, RuntimeType, RuntimeTypeRc, TypeFlavor, OBJECT_TYPE},
    },
    Error, Result,
};

/// A source of types that are not (yet) known to a registry.
///
/// Loaders play the role of class loaders: a registry asks them for a qualified name it cannot
/// resolve locally and caches whatever they return.
pub trait TypeLoader: Send + Sync {
    /// Load the type with the given qualified binary name, `None` if unknown to this loader
    fn load_type(&self, name: &str) -> Option<RuntimeTypeRc>;
}

/// Central registry for all types of the reflective model.
///
/// See the [module documentation](self) for the bootstrap content and lookup order.
pub struct TypeRegistry {
    /// Primary storage of the types created by this registry, indexed by token
    types: SkipMap<Token, RuntimeTypeRc>,
    /// Name cache: every type found by `find_type`, including loader-provided ones
    types_by_name: DashMap<String, RuntimeTypeRc>,
    /// Default loaders, consulted in registration order after the caller's hint
    loaders: boxcar::Vec<Arc<dyn TypeLoader>>,
    /// Next row for type tokens
    next_type_row: AtomicU32,
    /// Next row for method and constructor tokens
    next_method_row: AtomicU32,
    /// Next row for field tokens
    next_field_row: AtomicU32,
}

impl TypeRegistry {
    /// Create a new type registry with the bootstrap types registered.
    ///
    /// # Errors
    ///
    /// This function will return an error if the bootstrap hierarchy can not be wired up,
    /// which indicates an internal inconsistency.
    pub fn new() -> Result<Self> {
        let registry = TypeRegistry {
            types: SkipMap::new(),
            types_by_name: DashMap::new(),
            loaders: boxcar::Vec::new(),
            next_type_row: AtomicU32::new(1),
            next_method_row: AtomicU32::new(1),
            next_field_row: AtomicU32::new(1),
        };

        registry.initialize_builtins()?;
        Ok(registry)
    }

    fn next_row(counter: &AtomicU32) -> u32 {
        let row = counter.fetch_add(1, Ordering::Relaxed);
        debug_assert!(row <= 0x00FF_FFFF, "Ran out of token rows");
        row
    }

    /// Get the next available type token
    fn next_type_token(&self) -> Token {
        Token::from_parts(Token::TYPE, Self::next_row(&self.next_type_row))
    }

    /// Get the next available token for a member of the given kind
    pub(crate) fn next_member_token(&self, kind: MemberKind) -> Token {
        match kind {
            MemberKind::Field => {
                Token::from_parts(Token::FIELD, Self::next_row(&self.next_field_row))
            }
            MemberKind::Method | MemberKind::Constructor => {
                Token::from_parts(Token::METHOD, Self::next_row(&self.next_method_row))
            }
        }
    }

    fn initialize_builtins(&self) -> Result<()> {
        let object = self.create_type(OBJECT_TYPE, TypeFlavor::Class, Modifiers::PUBLIC)?;

        for kind in PrimitiveKind::iter() {
            self.create_type(
                kind.name(),
                TypeFlavor::Primitive(kind),
                Modifiers::PUBLIC | Modifiers::FINAL | Modifiers::ABSTRACT,
            )?;
        }

        let serializable =
            self.create_type("java.io.Serializable", TypeFlavor::Interface, Modifiers::PUBLIC)?;
        let comparable =
            self.create_type("java.lang.Comparable", TypeFlavor::Interface, Modifiers::PUBLIC)?;
        let char_sequence = self.create_type(
            "java.lang.CharSequence",
            TypeFlavor::Interface,
            Modifiers::PUBLIC,
        )?;

        let number = self.create_type(
            "java.lang.Number",
            TypeFlavor::Class,
            Modifiers::PUBLIC | Modifiers::ABSTRACT,
        )?;
        number.set_base(&object)?;
        number.add_interface(&serializable)?;

        for kind in PrimitiveKind::iter() {
            let wrapper = self.create_type(
                kind.wrapper_name(),
                TypeFlavor::Class,
                Modifiers::PUBLIC | Modifiers::FINAL,
            )?;
            if kind.is_numeric() {
                wrapper.set_base(&number)?;
            } else {
                wrapper.set_base(&object)?;
            }
            if kind != PrimitiveKind::Void {
                wrapper.add_interface(&comparable)?;
                if !kind.is_numeric() {
                    wrapper.add_interface(&serializable)?;
                }
            }
        }

        let string = self.create_type(
            "java.lang.String",
            TypeFlavor::Class,
            Modifiers::PUBLIC | Modifiers::FINAL,
        )?;
        string.set_base(&object)?;
        string.add_interface(&serializable)?;
        string.add_interface(&comparable)?;
        string.add_interface(&char_sequence)?;

        Ok(())
    }

    /// Create and register a new, empty type.
    ///
    /// Classes do not get a superclass here; use [`RuntimeType::set_base`] or the
    /// [`crate::TypeBuilder`], which defaults it to `java.lang.Object`.
    ///
    /// ## Arguments
    /// * 'name'        - Qualified binary name, must be unique within this registry
    /// * 'flavor'      - The basic shape of the type
    /// * 'modifiers'   - Type modifiers
    ///
    /// # Errors
    /// Returns an error if a type with the same name is already registered or cached.
    pub fn create_type(
        &self,
        name: &str,
        flavor: TypeFlavor,
        modifiers: Modifiers,
    ) -> Result<RuntimeTypeRc> {
        match self.types_by_name.entry(name.to_string()) {
            Entry::Occupied(_) => Err(type_error!("Type {} is already registered", name)),
            Entry::Vacant(slot) => {
                let new_type = Arc::new(RuntimeType::new(
                    self.next_type_token(),
                    name.to_string(),
                    flavor,
                    modifiers,
                ));

                self.types.insert(new_type.token, new_type.clone());
                slot.insert(new_type.clone());
                Ok(new_type)
            }
        }
    }

    /// Declare a new member on a type of this registry.
    ///
    /// ## Arguments
    /// * 'declaring'   - The type to add the member to
    /// * 'builder'     - Description of the member
    ///
    /// # Errors
    /// Returns an error if `declaring` was not created by this registry, or if the member
    /// description is invalid (see [`MemberBuilder`]).
    pub fn define_member(
        &self,
        declaring: &RuntimeTypeRc,
        builder: MemberBuilder,
    ) -> Result<MemberRc> {
        if !self.types.contains_key(&declaring.token) {
            return Err(type_error!(
                "Type {} does not belong to this registry",
                declaring.name
            ));
        }

        let token = self.next_member_token(builder.kind());
        let member = Arc::new(builder.build(token, declaring)?);
        declaring.add_member(member.clone());
        Ok(member)
    }

    /// Register an additional default loader.
    ///
    /// Loaders are consulted in registration order for names that are neither registered nor
    /// cached.
    pub fn add_loader(&self, loader: Arc<dyn TypeLoader>) {
        self.loaders.push(loader);
    }

    /// Find a type by qualified name.
    ///
    /// Lookup order: the name cache, the `loader` hint, then the default loaders. A type
    /// provided by a loader is cached under the requested name.
    ///
    /// ## Arguments
    /// * 'name'    - The qualified binary name
    /// * 'loader'  - Optional loader to try before the defaults
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if no source knows the name.
    pub fn find_type(&self, name: &str, loader: Option<&dyn TypeLoader>) -> Result<RuntimeTypeRc> {
        if let Some(found) = self.types_by_name.get(name) {
            return Ok(found.value().clone());
        }

        let loaded = loader
            .and_then(|hint| hint.load_type(name))
            .or_else(|| {
                self.loaders
                    .iter()
                    .find_map(|(_, default)| default.load_type(name))
            });

        match loaded {
            Some(found) => {
                log::trace!("Loaded type {} ({})", name, found.token);
                let cached = self
                    .types_by_name
                    .entry(name.to_string())
                    .or_insert(found)
                    .value()
                    .clone();
                Ok(cached)
            }
            None => Err(Error::TypeNotFound(name.to_string())),
        }
    }

    /// The registered or cached type with this name, without consulting any loader
    pub fn get_by_name(&self, name: &str) -> Option<RuntimeTypeRc> {
        self.types_by_name.get(name).map(|entry| entry.value().clone())
    }

    /// The type created by this registry with this token
    pub fn get(&self, token: &Token) -> Option<RuntimeTypeRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// The type of a primitive kind
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if the bootstrap type is missing.
    pub fn primitive(&self, kind: PrimitiveKind) -> Result<RuntimeTypeRc> {
        self.find_type(kind.name(), None)
    }

    /// Number of types created by this registry
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the registry holds no types
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over the types created by this registry in token order
    pub fn iter(&self) -> impl Iterator<Item = RuntimeTypeRc> + '_ {
        self.types.iter().map(|entry| entry.value().clone())
    }
}

impl TypeLoader for TypeRegistry {
    fn load_type(&self, name: &str) -> Option<RuntimeTypeRc> {
        self.get_by_name(name)
    }
}

impl Reflection for TypeRegistry {
    fn find_type(&self, name: &str, loader: Option<&dyn TypeLoader>) -> Result<RuntimeTypeRc> {
        TypeRegistry::find_type(self, name, loader)
    }
}
