//! # reflectscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the reflectscope library. Import this module to get quick access to the essential
//! types for building a model, resolving members and invoking them.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all reflectscope operations
pub use crate::Error;

/// The result type used throughout reflectscope
pub use crate::Result;

// ================================================================================================
// Type Model
// ================================================================================================

/// Identifier of types and members
pub use crate::metadata::token::Token;

/// Core type system components
pub use crate::metadata::typesystem::{
    PrimitiveKind, RuntimeType, RuntimeTypeRc, RuntimeTypeRef, TypeBuilder, TypeFlavor,
    TypeLoader, TypeRegistry, TypeSignature,
};

/// Members and their builders
pub use crate::metadata::member::{Member, MemberBuilder, MemberKind, MemberRc, Modifiers};

/// The reflective capability consumed by the resolver
pub use crate::metadata::reflection::Reflection;

// ================================================================================================
// Resolution
// ================================================================================================

/// Resolver, request and policy
pub use crate::resolve::{MatchPolicy, MemberQuery, MemberResolver, ResolverConfig};

/// Caching of resolved members
pub use crate::resolve::{CacheKey, MemberCache, ResolutionCache};

/// Nested type support
pub use crate::resolve::{EnclosingWalker, NestingConvention};

// ================================================================================================
// Runtime
// ================================================================================================

/// Values, objects and invocation
pub use crate::runtime::{Instance, InstanceRc, Invoker, Value};

/// Hooking seam
pub use crate::bridge::{DispatchBackend, HookBackend, HookParam, MemberHook};
