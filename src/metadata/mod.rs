//! Reflective metadata model.
//!
//! This module holds the in-memory model that member resolution operates on. Types are
//! identified by their qualified binary name (`com.example.Outer$Inner`) and a [`token::Token`],
//! members hang off their declaring type, and everything is shared through `Arc` handles so the
//! model can be queried from many threads at once.
//!
//! # Key Components
//!
//! - [`token`] - Identity handles for types and members
//! - [`typesystem`] - Runtime types, primitive kinds, signatures and the [`typesystem::TypeRegistry`]
//! - [`member`] - Methods, constructors and fields with their modifiers
//! - [`reflection`] - The capability trait the resolver consumes, implemented by the registry
//!
//! # Examples
//!
//! ```rust
//! use reflectscope::metadata::reflection::Reflection;
//! use reflectscope::TypeRegistry;
//!
//! let registry = TypeRegistry::new()?;
//! let integer = registry.find_type("java.lang.Integer", None)?;
//! let number = registry.find_type("java.lang.Number", None)?;
//! assert!(registry.is_assignable_from(&number, &integer));
//! # Ok::<(), reflectscope::Error>(())
//! ```

/// Methods, constructors and fields
pub mod member;
/// The reflective capability trait
pub mod reflection;
/// Commonly used identity token type
pub mod token;
/// Implementation of the runtime type system
pub mod typesystem;
