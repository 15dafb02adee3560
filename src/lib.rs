// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # reflectscope
//!
//! Member resolution over a reflective, JVM-style type model. Given a type, a member name and
//! the runtime types of the arguments at hand, `reflectscope` finds the member that the call
//! should bind to: first by exact signature, then by assignability with overload ranking, walking
//! the superclass chain and, on request, the chain of enclosing (outer) types. Every successful
//! resolution is memoized in a shared, thread-safe cache.
//!
//! ## Features
//!
//! - **🔍 Three match policies** - [`MatchPolicy::Exact`], [`MatchPolicy::Best`] and [`MatchPolicy::Deep`]
//! - **⚖️ Overload ranking** - primitive widening, autoboxing and hierarchy distance costs
//! - **🧵 Concurrent caching** - one search per key, even under contention
//! - **🪆 Nested types** - enclosing type and enclosing instance discovery
//! - **📞 Invocation** - reflective calls with receiver resolution, argument checks and hooks
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use reflectscope::prelude::*;
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let int = registry.find_type("int", None)?;
//!
//! let counter = TypeBuilder::class("com.example.Counter")
//!     .method(MemberBuilder::method("add").param(&int).modifiers(Modifiers::PUBLIC))
//!     .build(&registry)?;
//!
//! let resolver = MemberResolver::new(registry.clone());
//! let integer = registry.find_type("java.lang.Integer", None)?;
//! let add = resolver.find_method(
//!     &counter,
//!     "add",
//!     MatchPolicy::Best,
//!     Some(&TypeSignature::from_types([&integer])),
//! )?;
//! assert_eq!(add.name, "add");
//! # Ok::<(), reflectscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - the reflective model: tokens, types, members, the [`TypeRegistry`] and the
//!   [`metadata::reflection::Reflection`] capability trait the resolver consumes
//! - [`resolve`] - assignability oracle, overload cost comparator, resolution cache, enclosing
//!   type walker and the [`MemberResolver`] itself
//! - [`runtime`] - values, instances and the [`runtime::Invoker`]
//! - [`bridge`] - hook attachment seam and the in-process dispatch backend

#[cfg(test)]
pub(crate) mod test;

mod error;

/// Convenient re-exports of the most commonly used types.
pub mod prelude;

/// Reflective type model: tokens, types, members and the type registry.
pub mod metadata;

/// Member resolution: assignability, overload costs, caching and enclosing-type walking.
pub mod resolve;

/// Runtime values, object instances and reflective invocation.
pub mod runtime;

/// Hooking seam for intercepting member invocations.
pub mod bridge;

/// `reflectscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `reflectscope` Error type
///
/// The main error type for all operations in this crate. See [`Error`] for the individual
/// failure modes.
pub use error::Error;

pub use metadata::typesystem::{TypeBuilder, TypeRegistry, TypeSignature};
pub use resolve::{MatchPolicy, MemberQuery, MemberResolver, ResolutionCache, ResolverConfig};
