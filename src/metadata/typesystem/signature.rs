use std::{fmt, slice};

use crate::{
    metadata::{
        reflection::Reflection,
        typesystem::{RuntimeTypeRc, TypeLoader},
    },
    Result,
};

/// Placeholder used when rendering an unknown (null) entry of a signature
pub const NULL_ENTRY: &str = "NULL";

/// An ordered list of type descriptors.
///
/// A signature describes either the declared parameter types of a member or the runtime types of
/// the arguments at a call site. An entry of `None` stands for an argument whose type is unknown
/// because the value is null: it is assignable to every non-primitive type and to no primitive.
#[derive(Clone, Default)]
pub struct TypeSignature {
    entries: Vec<Option<RuntimeTypeRc>>,
}

impl TypeSignature {
    /// Create an empty signature
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a signature from known types
    pub fn from_types<'a, I>(types: I) -> Self
    where
        I: IntoIterator<Item = &'a RuntimeTypeRc>,
    {
        TypeSignature {
            entries: types.into_iter().map(|ty| Some(ty.clone())).collect(),
        }
    }

    /// Create a signature from entries that may be unknown
    #[must_use]
    pub fn from_entries(entries: Vec<Option<RuntimeTypeRc>>) -> Self {
        TypeSignature { entries }
    }

    /// Create a signature from qualified type names.
    ///
    /// Each name is resolved through [`Reflection::find_type`] with `loader` as the hint.
    /// [`NULL_ENTRY`] becomes an unknown (null) entry, so `names()` output reads back unchanged.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] for the first name that can not be resolved.
    pub fn from_names(
        reflection: &dyn Reflection,
        names: &[&str],
        loader: Option<&dyn TypeLoader>,
    ) -> Result<Self> {
        let entries = names
            .iter()
            .map(|name| match *name {
                NULL_ENTRY => Ok(None),
                name => reflection.find_type(name, loader).map(Some),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(TypeSignature { entries })
    }

    /// Append a known type
    #[must_use]
    pub fn with(mut self, ty: &RuntimeTypeRc) -> Self {
        self.entries.push(Some(ty.clone()));
        self
    }

    /// Append an unknown (null) entry
    #[must_use]
    pub fn with_null(mut self) -> Self {
        self.entries.push(None);
        self
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Access a single entry, `None` if out of range, `Some(None)` for a null entry
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Option<&RuntimeTypeRc>> {
        self.entries.get(index).map(Option::as_ref)
    }

    /// Iterate over the entries
    pub fn iter(&self) -> slice::Iter<'_, Option<RuntimeTypeRc>> {
        self.entries.iter()
    }

    /// The qualified names of the entries, [`NULL_ENTRY`] for unknown ones
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.as_ref().map_or(NULL_ENTRY, |ty| ty.name.as_str()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a TypeSignature {
    type Item = &'a Option<RuntimeTypeRc>;
    type IntoIter = slice::Iter<'a, Option<RuntimeTypeRc>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl PartialEq for TypeSignature {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(left, right)| match (left, right) {
                    (Some(left), Some(right)) => left.token == right.token,
                    (None, None) => true,
                    _ => false,
                })
    }
}

impl Eq for TypeSignature {}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.names().join(","))
    }
}

impl fmt::Debug for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeSignature{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test::TestWorld, Error};

    #[test]
    fn test_display_with_null() {
        let world = TestWorld::new();
        let sig = TypeSignature::new()
            .with(&world.int)
            .with_null()
            .with(&world.string);

        assert_eq!(sig.len(), 3);
        assert_eq!(sig.to_string(), "(int,NULL,java.lang.String)");
        assert!(sig.get(1).unwrap().is_none());
        assert!(sig.get(3).is_none());
    }

    #[test]
    fn test_equality_by_identity() {
        let world = TestWorld::new();
        let left = TypeSignature::from_types([&world.int, &world.string]);
        let right = TypeSignature::new().with(&world.int).with(&world.string);
        let other = TypeSignature::new().with(&world.int).with_null();

        assert_eq!(left, right);
        assert_ne!(left, other);
        assert_eq!(TypeSignature::new(), TypeSignature::default());
    }

    #[test]
    fn test_from_names() {
        let world = TestWorld::new();
        let sig = TypeSignature::from_names(
            world.registry.as_ref(),
            &["int", "NULL", "java.lang.String"],
            None,
        )
        .unwrap();
        assert_eq!(sig, TypeSignature::new().with(&world.int).with_null().with(&world.string));

        match TypeSignature::from_names(world.registry.as_ref(), &["int", "a.Missing"], None) {
            Err(Error::TypeNotFound(name)) => assert_eq!(name, "a.Missing"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_from_names_uses_loader() {
        let world = TestWorld::new();
        let elsewhere = TestWorld::new();
        let remote = elsewhere.class("b.Remote");

        assert!(
            TypeSignature::from_names(world.registry.as_ref(), &["b.Remote"], None).is_err()
        );
        let sig = TypeSignature::from_names(
            world.registry.as_ref(),
            &["b.Remote"],
            Some(elsewhere.registry.as_ref()),
        )
        .unwrap();
        assert_eq!(sig.get(0).unwrap().unwrap().token, remote.token);
    }
}
