//! Methods, constructors and fields.
//!
//! A [`Member`] is a single declared member of a [`crate::metadata::typesystem::RuntimeType`].
//! Members are created through [`MemberBuilder`] and registered with
//! [`crate::TypeRegistry::define_member`] or [`crate::TypeBuilder`]; afterwards they are shared
//! as [`MemberRc`]. Apart from the `accessible` flag and the static field value, members are
//! immutable.
//!
//! # Examples
//!
//! ```rust
//! use reflectscope::prelude::*;
//!
//! let registry = TypeRegistry::new()?;
//! let int = registry.find_type("int", None)?;
//! let point = TypeBuilder::class("geo.Point")
//!     .field(MemberBuilder::field("x", &int).modifiers(Modifiers::PRIVATE))
//!     .method(MemberBuilder::method("move").param(&int).param(&int))
//!     .build(&registry)?;
//!
//! let moved = point.methods.iter().next().map(|(_, m)| m.to_string());
//! assert_eq!(moved.as_deref(), Some("geo.Point.move(int,int)"));
//! # Ok::<(), reflectscope::Error>(())
//! ```

mod builder;
mod types;

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
};

pub use builder::{MemberBody, MemberBuilder};
pub use types::{MemberKind, Modifiers, ACCESS_MASK};

use crate::{
    metadata::{
        token::Token,
        typesystem::{RuntimeTypeRc, RuntimeTypeRef, TypeSignature, NULL_ENTRY},
    },
    runtime::Value,
    Error, Result,
};

/// Name given to every constructor
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// A vector that holds a list of `Member`
pub type MemberList = Arc<boxcar::Vec<MemberRc>>;
/// Reference to a `Member`
pub type MemberRc = Arc<Member>;

/// A declared method, constructor or field.
pub struct Member {
    /// Token
    pub token: Token,
    /// What kind of member this is
    pub kind: MemberKind,
    /// Member name, [`CONSTRUCTOR_NAME`] for constructors
    pub name: String,
    /// Modifiers
    pub modifiers: Modifiers,
    /// The type declaring this member
    pub declaring: RuntimeTypeRef,
    /// Declared parameter types (empty for fields)
    pub parameters: Vec<RuntimeTypeRef>,
    /// Field type, or method return type (`None` for `void` methods and constructors)
    pub value_type: Option<RuntimeTypeRef>,
    accessible: AtomicBool,
    body: Option<MemberBody>,
    static_value: RwLock<Value>,
}

impl Member {
    /// Returns true if this is a `static` member
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    /// Returns true if this member is declared `public`
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.modifiers.contains(Modifiers::PUBLIC)
    }

    /// Returns true if the member may be used regardless of its visibility
    #[must_use]
    pub fn is_accessible(&self) -> bool {
        self.is_public() || self.accessible.load(Ordering::Acquire)
    }

    /// Override the visibility check for this member
    pub fn set_accessible(&self, accessible: bool) {
        self.accessible.store(accessible, Ordering::Release);
    }

    /// The declaring type
    ///
    /// # Errors
    /// Returns [`Error::TypeDropped`] if the declaring type no longer exists.
    pub fn declaring_type(&self) -> Result<RuntimeTypeRc> {
        self.declaring.resolve()
    }

    /// The field type or method return type
    ///
    /// # Errors
    /// Returns [`Error::TypeDropped`] if the type no longer exists.
    pub fn value_type(&self) -> Result<Option<RuntimeTypeRc>> {
        self.value_type.as_ref().map(RuntimeTypeRef::resolve).transpose()
    }

    /// The declared parameter types as a signature
    ///
    /// # Errors
    /// Returns [`Error::TypeDropped`] if a parameter type no longer exists.
    pub fn signature(&self) -> Result<TypeSignature> {
        let entries = self
            .parameters
            .iter()
            .map(|param| param.resolve().map(Some))
            .collect::<Result<Vec<_>>>()?;
        Ok(TypeSignature::from_entries(entries))
    }

    /// Returns true if `name` and `parameters` identify this member exactly.
    ///
    /// The name is ignored for constructors, the parameters for fields. Unknown (null)
    /// entries never match.
    #[must_use]
    pub fn matches_exactly(&self, name: Option<&str>, parameters: &TypeSignature) -> bool {
        let name_matches = match self.kind {
            MemberKind::Constructor => true,
            MemberKind::Method | MemberKind::Field => name == Some(self.name.as_str()),
        };
        if !name_matches {
            return false;
        }
        if self.kind == MemberKind::Field {
            return true;
        }

        self.parameters.len() == parameters.len()
            && self
                .parameters
                .iter()
                .zip(parameters)
                .all(|(declared, actual)| {
                    actual
                        .as_ref()
                        .is_some_and(|actual| declared.token() == actual.token)
                })
    }

    /// The implementation of a method or constructor, if it has one
    #[must_use]
    pub fn body(&self) -> Option<&MemberBody> {
        self.body.as_ref()
    }

    /// Current value of a static field
    ///
    /// # Errors
    /// Returns [`Error::LockError`] if the value lock is poisoned.
    pub fn static_value(&self) -> Result<Value> {
        self.static_value
            .read()
            .map(|value| value.clone())
            .map_err(|_| Error::LockError)
    }

    /// Replace the value of a static field
    ///
    /// # Errors
    /// Returns [`Error::LockError`] if the value lock is poisoned.
    pub fn set_static_value(&self, value: Value) -> Result<()> {
        let mut slot = self.static_value.write().map_err(|_| Error::LockError)?;
        *slot = value;
        Ok(())
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MemberKind::Field => write!(f, "{}.{}", self.declaring.name(), self.name),
            MemberKind::Constructor | MemberKind::Method => {
                let params: Vec<&str> = self.parameters.iter().map(RuntimeTypeRef::name).collect();
                if self.kind == MemberKind::Constructor {
                    write!(f, "{}({})", self.declaring.name(), params.join(","))
                } else {
                    write!(
                        f,
                        "{}.{}({})",
                        self.declaring.name(),
                        self.name,
                        params.join(",")
                    )
                }
            }
        }
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("token", &self.token)
            .field("kind", &self.kind)
            .field("signature", &self.to_string())
            .field("modifiers", &self.modifiers)
            .field("accessible", &self.is_accessible())
            .finish_non_exhaustive()
    }
}

/// Render a lookup the way [`Member`]'s `Display` renders the member it is looking for.
///
/// Used for error messages when no member exists.
#[must_use]
pub fn describe_lookup(
    kind: MemberKind,
    declaring: &str,
    name: Option<&str>,
    parameters: &TypeSignature,
) -> String {
    let name = name.unwrap_or(NULL_ENTRY);
    match kind {
        MemberKind::Field => format!("{declaring}.{name}"),
        MemberKind::Constructor => format!("{declaring}{parameters}"),
        MemberKind::Method => format!("{declaring}.{name}{parameters}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestWorld;

    #[test]
    fn test_exact_match() {
        let world = TestWorld::new();
        let ty = world.class("a.Calc");
        let method = world
            .registry
            .define_member(
                &ty,
                MemberBuilder::method("add").param(&world.int).param(&world.long),
            )
            .unwrap();

        let exact = TypeSignature::from_types([&world.int, &world.long]);
        let wrong = TypeSignature::from_types([&world.long, &world.long]);
        let null = TypeSignature::new().with(&world.int).with_null();

        assert!(method.matches_exactly(Some("add"), &exact));
        assert!(!method.matches_exactly(Some("sub"), &exact));
        assert!(!method.matches_exactly(None, &exact));
        assert!(!method.matches_exactly(Some("add"), &wrong));
        assert!(!method.matches_exactly(Some("add"), &null));
        assert!(!method.matches_exactly(Some("add"), &TypeSignature::new()));
    }

    #[test]
    fn test_constructor_and_field_match() {
        let world = TestWorld::new();
        let ty = world.class("a.Box");
        let ctor = world
            .registry
            .define_member(&ty, MemberBuilder::constructor().param(&world.int))
            .unwrap();
        let field = world
            .registry
            .define_member(&ty, MemberBuilder::field("size", &world.int))
            .unwrap();

        let sig = TypeSignature::from_types([&world.int]);
        assert!(ctor.matches_exactly(None, &sig));
        assert!(ctor.matches_exactly(Some("ignored"), &sig));
        assert!(field.matches_exactly(Some("size"), &TypeSignature::new()));
        assert!(field.matches_exactly(Some("size"), &sig));
        assert!(!field.matches_exactly(None, &sig));
    }

    #[test]
    fn test_display() {
        let world = TestWorld::new();
        let ty = world.class("a.Box");
        let ctor = world
            .registry
            .define_member(
                &ty,
                MemberBuilder::constructor().param(&world.int).param(&world.string),
            )
            .unwrap();
        let field = world
            .registry
            .define_member(&ty, MemberBuilder::field("size", &world.int))
            .unwrap();

        assert_eq!(ctor.to_string(), "a.Box(int,java.lang.String)");
        assert_eq!(ctor.name, CONSTRUCTOR_NAME);
        assert_eq!(field.to_string(), "a.Box.size");
        assert_eq!(
            describe_lookup(
                MemberKind::Method,
                "a.Box",
                Some("f"),
                &TypeSignature::new().with_null()
            ),
            "a.Box.f(NULL)"
        );
    }

    #[test]
    fn test_accessible_flag() {
        let world = TestWorld::new();
        let ty = world.class("a.Box");
        let secret = world
            .registry
            .define_member(
                &ty,
                MemberBuilder::field("secret", &world.int).modifiers(Modifiers::PRIVATE),
            )
            .unwrap();
        let open = world
            .registry
            .define_member(&ty, MemberBuilder::method("open").modifiers(Modifiers::PUBLIC))
            .unwrap();

        assert!(!secret.is_accessible());
        secret.set_accessible(true);
        assert!(secret.is_accessible());
        assert!(open.is_accessible());
    }

    #[test]
    fn test_static_value() {
        let world = TestWorld::new();
        let ty = world.class("a.Config");
        let field = world
            .registry
            .define_member(
                &ty,
                MemberBuilder::field("limit", &world.int).modifiers(Modifiers::STATIC),
            )
            .unwrap();

        assert!(field.is_static());
        assert_eq!(field.static_value().unwrap(), Value::Int(0));
        field.set_static_value(Value::Int(9)).unwrap();
        assert_eq!(field.static_value().unwrap(), Value::Int(9));
    }
}
