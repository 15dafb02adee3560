use std::fmt;

use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// The built-in primitive types of the runtime.
///
/// Each primitive (except `void`) has a reference wrapper type in `java.lang` that it is boxed
/// to when passed where an object is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum PrimitiveKind {
    /// `boolean`
    Boolean,
    /// `byte`, 8-bit signed
    Byte,
    /// `char`, 16-bit unsigned code unit
    Char,
    /// `short`, 16-bit signed
    Short,
    /// `int`, 32-bit signed
    Int,
    /// `long`, 64-bit signed
    Long,
    /// `float`, 32-bit IEEE 754
    Float,
    /// `double`, 64-bit IEEE 754
    Double,
    /// `void`, only valid as a return type
    Void,
}

/// Order in which numeric primitives are promoted, used for the promotion cost of overloads.
pub const PROMOTION_ORDER: [PrimitiveKind; 7] = [
    PrimitiveKind::Byte,
    PrimitiveKind::Short,
    PrimitiveKind::Char,
    PrimitiveKind::Int,
    PrimitiveKind::Long,
    PrimitiveKind::Float,
    PrimitiveKind::Double,
];

impl PrimitiveKind {
    /// The keyword name of this primitive, which is also its qualified type name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Void => "void",
        }
    }

    /// Qualified name of the wrapper type
    #[must_use]
    pub fn wrapper_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Char => "java.lang.Character",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
            PrimitiveKind::Void => "java.lang.Void",
        }
    }

    /// Look up a primitive by its keyword name
    #[must_use]
    pub fn from_name(name: &str) -> Option<PrimitiveKind> {
        PrimitiveKind::iter().find(|kind| kind.name() == name)
    }

    /// Look up the primitive a wrapper type unboxes to.
    ///
    /// `java.lang.Void` is not unboxable and yields `None`.
    #[must_use]
    pub fn from_wrapper_name(name: &str) -> Option<PrimitiveKind> {
        PrimitiveKind::iter()
            .filter(|kind| *kind != PrimitiveKind::Void)
            .find(|kind| kind.wrapper_name() == name)
    }

    /// Returns true for the numeric kinds that extend `java.lang.Number` when boxed
    #[must_use]
    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            PrimitiveKind::Boolean | PrimitiveKind::Char | PrimitiveKind::Void
        )
    }

    /// The primitives this kind converts to by a widening conversion (identity excluded)
    #[must_use]
    pub fn widens_to(self) -> &'static [PrimitiveKind] {
        use PrimitiveKind::{Double, Float, Int, Long, Short};
        match self {
            PrimitiveKind::Int => &[Long, Float, Double],
            PrimitiveKind::Long => &[Float, Double],
            PrimitiveKind::Float => &[Double],
            PrimitiveKind::Char => &[Int, Long, Float, Double],
            PrimitiveKind::Short => &[Int, Long, Float, Double],
            PrimitiveKind::Byte => &[Short, Int, Long, Float, Double],
            PrimitiveKind::Boolean | PrimitiveKind::Double | PrimitiveKind::Void => &[],
        }
    }

    /// Returns true if a value of `self` can be passed where `target` is expected
    #[must_use]
    pub fn is_widenable_to(self, target: PrimitiveKind) -> bool {
        self == target || self.widens_to().contains(&target)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
