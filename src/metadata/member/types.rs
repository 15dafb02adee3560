//! Member kinds and modifier flags.
//!
//! # Key Types
//! - [`MemberKind`]: Method, constructor or field
//! - [`Modifiers`]: Access and property flags shared by types and members, using the bit layout
//!   of the JVM class file format

use std::fmt;

use bitflags::bitflags;

/// Bitmask for access flag extraction
pub const ACCESS_MASK: u32 = 0x0007;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Modifiers of a type or member
    pub struct Modifiers: u32 {
        /// Accessible from everywhere
        const PUBLIC = 0x0001;
        /// Accessible only from the declaring type
        const PRIVATE = 0x0002;
        /// Accessible from subclasses and the same package
        const PROTECTED = 0x0004;
        /// Belongs to the type rather than an instance
        const STATIC = 0x0008;
        /// Can not be overridden, extended or reassigned
        const FINAL = 0x0010;
        /// Method holds the receiver's monitor while running
        const SYNCHRONIZED = 0x0020;
        /// Field is not cached thread-locally
        const VOLATILE = 0x0040;
        /// Field is not part of the persistent state
        const TRANSIENT = 0x0080;
        /// Method is implemented outside of the runtime
        const NATIVE = 0x0100;
        /// Type is an interface
        const INTERFACE = 0x0200;
        /// Type or method has no implementation
        const ABSTRACT = 0x0400;
        /// Strict floating point semantics
        const STRICT = 0x0800;
        /// Generated by the compiler, not present in source
        const SYNTHETIC = 0x1000;
    }
}

impl Modifiers {
    /// Extract the access flags from raw modifier bits
    #[must_use]
    pub fn from_access_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & ACCESS_MASK)
    }

    /// Returns true if none of `public`, `private` or `protected` is set
    #[must_use]
    pub fn is_package_private(self) -> bool {
        Self::from_access_flags(self.bits()).is_empty()
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const KEYWORDS: [(Modifiers, &str); 11] = [
            (Modifiers::PUBLIC, "public"),
            (Modifiers::PROTECTED, "protected"),
            (Modifiers::PRIVATE, "private"),
            (Modifiers::ABSTRACT, "abstract"),
            (Modifiers::STATIC, "static"),
            (Modifiers::FINAL, "final"),
            (Modifiers::TRANSIENT, "transient"),
            (Modifiers::VOLATILE, "volatile"),
            (Modifiers::SYNCHRONIZED, "synchronized"),
            (Modifiers::NATIVE, "native"),
            (Modifiers::STRICT, "strictfp"),
        ];

        let words: Vec<&str> = KEYWORDS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, word)| *word)
            .collect();
        f.write_str(&words.join(" "))
    }
}

/// The kind of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A method
    Method,
    /// A constructor, never inherited
    Constructor,
    /// A field
    Field,
}

impl MemberKind {
    /// Returns true if members of this kind carry a parameter list
    #[must_use]
    pub fn has_parameters(self) -> bool {
        !matches!(self, MemberKind::Field)
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Method => f.write_str("method"),
            MemberKind::Constructor => f.write_str("constructor"),
            MemberKind::Field => f.write_str("field"),
        }
    }
}
