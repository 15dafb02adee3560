//! Resolver configuration
//!
//! This module provides the tunables of member resolution: whether boxing conversions take
//! part in overload matching, and how far the superclass and enclosing-type walks may go.

/// Configuration for a [`crate::MemberResolver`]
///
/// The depth limits protect against malformed models (very deep or cyclic hierarchies); they
/// are not part of the matching semantics. A walk that reaches a limit stops there and logs a
/// warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Allow boxing and unboxing when testing assignability of overload candidates
    pub allow_autoboxing: bool,

    /// Maximum number of types visited on one superclass chain (default: 64)
    pub max_hierarchy_depth: usize,

    /// Maximum number of enclosing types searched by a deep lookup (default: 16)
    pub max_enclosing_depth: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            allow_autoboxing: true,
            max_hierarchy_depth: 64,
            max_enclosing_depth: 16,
        }
    }
}

impl ResolverConfig {
    /// Creates a configuration without boxing conversions
    ///
    /// Overload candidates then only match through identity, primitive widening and the class
    /// hierarchy.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            allow_autoboxing: false,
            ..Self::default()
        }
    }

    /// Creates a configuration with small walk limits for shallow models
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            allow_autoboxing: true,
            max_hierarchy_depth: 8,
            max_enclosing_depth: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let default = ResolverConfig::default();
        assert!(default.allow_autoboxing);
        assert_eq!(default.max_hierarchy_depth, 64);

        let strict = ResolverConfig::strict();
        assert!(!strict.allow_autoboxing);
        assert_eq!(strict.max_enclosing_depth, default.max_enclosing_depth);

        let minimal = ResolverConfig::minimal();
        assert!(minimal.max_hierarchy_depth < default.max_hierarchy_depth);
    }
}
