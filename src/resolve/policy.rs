//! Match policies.
//!
//! A [`MatchPolicy`] decides how strictly a lookup compares parameter types and which scopes it
//! searches: the declaring type, its superclasses, and the enclosing types of nested classes.
//!
//! ```rust
//! use reflectscope::MatchPolicy;
//!
//! assert_eq!(MatchPolicy::default(), MatchPolicy::Best);
//! assert!(!MatchPolicy::Exact.walks_superclasses());
//! assert!(MatchPolicy::Deep.walks_enclosing());
//! assert_eq!(MatchPolicy::Deep.tag(), 'D');
//! ```

use std::fmt;

use strum::{EnumCount, EnumIter};

/// How strictly a member lookup matches parameter types and how far it searches.
///
/// The policies are nested: everything [`MatchPolicy::Exact`] finds is found by
/// [`MatchPolicy::Best`], and everything `Best` finds is found by [`MatchPolicy::Deep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumCount)]
pub enum MatchPolicy {
    /// Identical parameter types, declared on the requested type itself
    Exact,
    /// Exact match first, then the cheapest assignable overload, across the superclass chain
    #[default]
    Best,
    /// Like `Best`, then the same search on every enclosing type, innermost first
    Deep,
}

impl MatchPolicy {
    /// Single letter tag used in cache keys
    #[must_use]
    pub fn tag(self) -> char {
        match self {
            MatchPolicy::Exact => 'E',
            MatchPolicy::Best => 'B',
            MatchPolicy::Deep => 'D',
        }
    }

    /// Returns true if assignable (non-identical) parameter types are accepted
    #[must_use]
    pub fn allows_assignable(self) -> bool {
        self != MatchPolicy::Exact
    }

    /// Returns true if the superclass chain is searched
    #[must_use]
    pub fn walks_superclasses(self) -> bool {
        self != MatchPolicy::Exact
    }

    /// Returns true if enclosing types are searched
    #[must_use]
    pub fn walks_enclosing(self) -> bool {
        self == MatchPolicy::Deep
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::Exact => f.write_str("exact"),
            MatchPolicy::Best => f.write_str("best"),
            MatchPolicy::Deep => f.write_str("deep"),
        }
    }
}
