//! The reflective capability consumed by member resolution.
//!
//! [`Reflection`] is the narrow interface between the resolver and whatever provides type
//! metadata. [`crate::TypeRegistry`] implements it over the in-memory model; the provided
//! methods answer from the model directly, so an implementation only has to supply
//! [`Reflection::find_type`]. Wrappers can intercept individual calls, which is how lookups are
//! counted in tests.

use std::collections::{HashSet, VecDeque};

use crate::{
    metadata::{
        member::{describe_lookup, Member, MemberKind, MemberRc},
        token::Token,
        typesystem::{RuntimeType, RuntimeTypeRc, TypeLoader, TypeSignature, OBJECT_TYPE},
    },
    Error, Result,
};

/// Reflective access to types and their declared members.
pub trait Reflection: Send + Sync {
    /// Find a type by qualified binary name.
    ///
    /// Implementations cache by name. A missing `loader` hint falls back to the default loaders.
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if the name can not be resolved.
    fn find_type(&self, name: &str, loader: Option<&dyn TypeLoader>) -> Result<RuntimeTypeRc>;

    /// The superclass of `ty`, `None` at the root of the hierarchy
    fn superclass_of(&self, ty: &RuntimeType) -> Option<RuntimeTypeRc> {
        ty.base()
    }

    /// The interfaces directly implemented by `ty`
    fn interfaces_of(&self, ty: &RuntimeType) -> Vec<RuntimeTypeRc> {
        ty.interfaces()
    }

    /// All members of `kind` declared by `ty` itself, in declaration order
    fn list_members(&self, ty: &RuntimeType, kind: MemberKind) -> Vec<MemberRc> {
        ty.members(kind)
            .iter()
            .map(|(_, member)| member.clone())
            .collect()
    }

    /// The member of `kind` declared by `ty` whose name and parameter types match exactly.
    ///
    /// # Errors
    /// Returns [`Error::NoSuchMember`] if `ty` declares no such member.
    fn declared_member(
        &self,
        ty: &RuntimeType,
        kind: MemberKind,
        name: Option<&str>,
        parameters: &TypeSignature,
    ) -> Result<MemberRc> {
        self.list_members(ty, kind)
            .into_iter()
            .find(|member| member.matches_exactly(name, parameters))
            .ok_or_else(|| Error::NoSuchMember {
                signature: describe_lookup(kind, &ty.name, name, parameters),
            })
    }

    /// Native is-a check: can a value of `source` be stored where `target` is expected.
    ///
    /// True for identical types, for superclasses and implemented interfaces (transitively),
    /// and for `java.lang.Object` with any reference type. Primitives are only assignable to
    /// themselves; conversions between primitives are not part of this check.
    fn is_assignable_from(&self, target: &RuntimeType, source: &RuntimeType) -> bool {
        if target.token == source.token {
            return true;
        }
        if target.is_primitive() || source.is_primitive() {
            return false;
        }
        if target.name == OBJECT_TYPE {
            return true;
        }

        let mut visited: HashSet<Token> = HashSet::new();
        let mut queue: VecDeque<RuntimeTypeRc> = VecDeque::new();
        queue.extend(self.superclass_of(source));
        queue.extend(self.interfaces_of(source));

        while let Some(current) = queue.pop_front() {
            if current.token == target.token {
                return true;
            }
            if !visited.insert(current.token) {
                continue;
            }

            queue.extend(self.superclass_of(&current));
            queue.extend(self.interfaces_of(&current));
        }

        false
    }

    /// Lift visibility checks for `member`
    fn make_accessible(&self, member: &Member) {
        member.set_accessible(true);
    }
}
