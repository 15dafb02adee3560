//! Member resolution engine.
//!
//! This module answers the question "which declared member does this request bind to":
//!
//! - [`assignability`] decides whether an argument type can be passed for a parameter type
//! - [`cost`] ranks competing overloads by how far the arguments must be converted
//! - [`resolver`] searches declaring type, superclasses and enclosing types per [`MatchPolicy`]
//! - [`cache`] memoizes successful resolutions
//! - [`enclosing`] recovers enclosing types and instances from nesting conventions
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use reflectscope::prelude::*;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let long = registry.find_type("long", None)?;
//! let int = registry.find_type("int", None)?;
//! let meter = TypeBuilder::class("app.Meter")
//!     .method(MemberBuilder::method("record").param(&long))
//!     .build(&registry)?;
//!
//! let resolver = MemberResolver::new(registry.clone());
//! let query = MemberQuery::method(&meter, "record")
//!     .with_parameters(TypeSignature::from_types([&int]));
//! assert_eq!(resolver.resolve(&query)?.to_string(), "app.Meter.record(long)");
//! # Ok::<(), reflectscope::Error>(())
//! ```

pub mod assignability;
pub mod cache;
pub mod config;
pub mod cost;
pub mod enclosing;
pub mod policy;
pub mod resolver;

pub use assignability::{is_assignable, is_signature_assignable};
pub use cache::{CacheKey, CacheStats, MemberCache, ResolutionCache};
pub use config::ResolverConfig;
pub use cost::{compare_signatures, parameter_cost, signature_cost};
pub use enclosing::{EnclosingWalker, NestingConvention};
pub use policy::MatchPolicy;
pub use resolver::{MemberQuery, MemberResolver};
