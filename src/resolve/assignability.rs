//! Type compatibility oracle.
//!
//! Decides whether an actual argument type may be passed where a declared parameter type is
//! expected, following the method invocation conversions of the runtime:
//!
//! - identity
//! - widening primitive conversion (`int` to `long`, `char` to `int`, ...)
//! - widening reference conversion (subclass to superclass or implemented interface)
//! - optionally boxing (`int` to `java.lang.Integer`) and unboxing (`java.lang.Integer` to
//!   `int`), each followed by the conversions above
//!
//! A null argument (`None`) is assignable to every reference type and to no primitive.
//!
//! # Examples
//!
//! ```rust
//! use reflectscope::{resolve::is_assignable, TypeRegistry};
//!
//! let registry = TypeRegistry::new()?;
//! let int = registry.find_type("int", None)?;
//! let long = registry.find_type("long", None)?;
//! let number = registry.find_type("java.lang.Number", None)?;
//!
//! assert!(is_assignable(&registry, Some(&int), &long, false));
//! assert!(!is_assignable(&registry, Some(&int), &number, false));
//! assert!(is_assignable(&registry, Some(&int), &number, true));
//! assert!(!is_assignable(&registry, None, &int, true));
//! # Ok::<(), reflectscope::Error>(())
//! ```

use crate::metadata::{
    reflection::Reflection,
    typesystem::{PrimitiveKind, RuntimeTypeRc, TypeSignature},
};

/// Returns true if a value of type `actual` can be passed as `candidate`.
///
/// ## Arguments
/// * 'reflection'  - Used to look up wrapper types and for the native is-a check
/// * 'actual'      - The actual argument type, `None` for a null argument
/// * 'candidate'   - The declared parameter type
/// * 'autoboxing'  - Whether boxing and unboxing conversions are allowed
pub fn is_assignable(
    reflection: &dyn Reflection,
    actual: Option<&RuntimeTypeRc>,
    candidate: &RuntimeTypeRc,
    autoboxing: bool,
) -> bool {
    let Some(actual) = actual else {
        return !candidate.is_primitive();
    };

    let mut actual = actual.clone();
    if autoboxing {
        if actual.is_primitive() && !candidate.is_primitive() {
            match boxed(reflection, &actual) {
                Some(wrapper) => actual = wrapper,
                None => return false,
            }
        }
        if candidate.is_primitive() && !actual.is_primitive() {
            match unboxed(reflection, &actual) {
                Some(primitive) => actual = primitive,
                None => return false,
            }
        }
    }

    if actual.token == candidate.token {
        return true;
    }

    match (actual.primitive(), candidate.primitive()) {
        (Some(from), Some(to)) => from.is_widenable_to(to),
        (Some(_), None) | (None, Some(_)) => false,
        (None, None) => reflection.is_assignable_from(candidate, &actual),
    }
}

/// Returns true if every entry of `actual` is assignable to the entry at the same position of
/// `candidate`.
///
/// Signatures of different length never match; two empty signatures always do.
pub fn is_signature_assignable(
    reflection: &dyn Reflection,
    actual: &TypeSignature,
    candidate: &TypeSignature,
    autoboxing: bool,
) -> bool {
    actual.len() == candidate.len()
        && actual
            .iter()
            .zip(candidate)
            .all(|(actual, candidate)| match candidate {
                Some(candidate) => is_assignable(reflection, actual.as_ref(), candidate, autoboxing),
                None => false,
            })
}

/// The wrapper type of a primitive type
pub(crate) fn boxed(reflection: &dyn Reflection, ty: &RuntimeTypeRc) -> Option<RuntimeTypeRc> {
    let kind = ty.primitive()?;
    if kind == PrimitiveKind::Void {
        return None;
    }
    reflection.find_type(kind.wrapper_name(), None).ok()
}

/// The primitive type of a wrapper type
pub(crate) fn unboxed(reflection: &dyn Reflection, ty: &RuntimeTypeRc) -> Option<RuntimeTypeRc> {
    let kind = PrimitiveKind::from_wrapper_name(&ty.name)?;
    reflection.find_type(kind.name(), None).ok()
}
