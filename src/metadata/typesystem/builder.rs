//! Fluent construction of runtime types.
//!
//! [`TypeBuilder`] collects the shape of a type (name, flavor, superclass, interfaces and
//! members) and registers it with a [`TypeRegistry`] in one step. Classes without an explicit
//! superclass extend `java.lang.Object`.
//!
//! Nested types follow the binary naming convention of the runtime: `inner_class(&outer, "Node")`
//! produces `Outer$Node` and declares the synthetic back-reference field to the enclosing
//! instance, `nested_class` does the same for a `static` nested type without that field.
//!
//! # Examples
//!
//! ```rust
//! use reflectscope::prelude::*;
//!
//! let registry = TypeRegistry::new()?;
//! let list = TypeBuilder::class("util.List").build(&registry)?;
//! let node = TypeBuilder::inner_class(&list, "Node").build(&registry)?;
//!
//! assert_eq!(node.name, "util.List$Node");
//! assert_eq!(node.fields.count(), 1);
//! # Ok::<(), reflectscope::Error>(())
//! ```

use crate::{
    metadata::{
        member::{MemberBuilder, Modifiers},
        typesystem::{RuntimeTypeRc, TypeFlavor, TypeRegistry, OBJECT_TYPE},
    },
    resolve::NestingConvention,
    Result,
};

/// Builder for a [`crate::metadata::typesystem::RuntimeType`]
pub struct TypeBuilder {
    name: String,
    flavor: TypeFlavor,
    modifiers: Modifiers,
    base: Option<RuntimeTypeRc>,
    interfaces: Vec<RuntimeTypeRc>,
    members: Vec<MemberBuilder>,
}

impl TypeBuilder {
    fn new(name: String, flavor: TypeFlavor) -> Self {
        TypeBuilder {
            name,
            flavor,
            modifiers: Modifiers::PUBLIC,
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Start a public class
    #[must_use]
    pub fn class(name: &str) -> Self {
        Self::new(name.to_string(), TypeFlavor::Class)
    }

    /// Start a public interface
    #[must_use]
    pub fn interface(name: &str) -> Self {
        Self::new(name.to_string(), TypeFlavor::Interface)
    }

    /// Start an inner (non-static) class of `outer`.
    ///
    /// The class is named `outer$simple_name` and receives the synthetic field holding the
    /// enclosing instance.
    #[must_use]
    pub fn inner_class(outer: &RuntimeTypeRc, simple_name: &str) -> Self {
        let convention = NestingConvention::default();
        let mut builder = Self::new(
            convention.nested_name(&outer.name, simple_name),
            TypeFlavor::Class,
        );
        builder.members.push(
            MemberBuilder::field(&convention.outer_instance_field, outer)
                .modifiers(Modifiers::FINAL | Modifiers::SYNTHETIC),
        );
        builder
    }

    /// Start a static nested class of `outer`, named `outer$simple_name`
    #[must_use]
    pub fn nested_class(outer: &RuntimeTypeRc, simple_name: &str) -> Self {
        let convention = NestingConvention::default();
        let mut builder = Self::new(
            convention.nested_name(&outer.name, simple_name),
            TypeFlavor::Class,
        );
        builder.modifiers |= Modifiers::STATIC;
        builder
    }

    /// Replace the modifiers.
    ///
    /// The `static` flag of a nested class is kept.
    #[must_use]
    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers | (self.modifiers & Modifiers::STATIC);
        self
    }

    /// Set the superclass
    #[must_use]
    pub fn extends(mut self, base: &RuntimeTypeRc) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Add an implemented interface
    #[must_use]
    pub fn implements(mut self, interface: &RuntimeTypeRc) -> Self {
        self.interfaces.push(interface.clone());
        self
    }

    /// Declare a method
    #[must_use]
    pub fn method(self, method: MemberBuilder) -> Self {
        self.member(method)
    }

    /// Declare a constructor
    #[must_use]
    pub fn constructor(self, constructor: MemberBuilder) -> Self {
        self.member(constructor)
    }

    /// Declare a field
    #[must_use]
    pub fn field(self, field: MemberBuilder) -> Self {
        self.member(field)
    }

    /// Declare a member of any kind
    #[must_use]
    pub fn member(mut self, member: MemberBuilder) -> Self {
        self.members.push(member);
        self
    }

    /// Register the type and all of its members with `registry`.
    ///
    /// # Errors
    /// Returns an error if the name is taken, the hierarchy is invalid (e.g. a class extending
    /// an interface) or a member description is invalid.
    pub fn build(self, registry: &TypeRegistry) -> Result<RuntimeTypeRc> {
        let new_type = registry.create_type(&self.name, self.flavor, self.modifiers)?;

        match (self.flavor, self.base) {
            (_, Some(base)) => new_type.set_base(&base)?,
            (TypeFlavor::Class, None) => {
                let object = registry.find_type(OBJECT_TYPE, None)?;
                new_type.set_base(&object)?;
            }
            _ => {}
        }

        for interface in &self.interfaces {
            new_type.add_interface(interface)?;
        }
        for member in self.members {
            registry.define_member(&new_type, member)?;
        }

        Ok(new_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::member::MemberKind, test::TestWorld};

    #[test]
    fn test_default_base() {
        let world = TestWorld::new();
        let ty = TypeBuilder::class("a.Plain").build(&world.registry).unwrap();
        assert_eq!(ty.base().unwrap().token, world.object.token);

        let iface = TypeBuilder::interface("a.Api").build(&world.registry).unwrap();
        assert!(iface.base().is_none());
        assert!(iface.is_interface());
    }

    #[test]
    fn test_inner_class_back_reference() {
        let world = TestWorld::new();
        let outer = world.class("a.Outer");
        let inner = TypeBuilder::inner_class(&outer, "Inner")
            .build(&world.registry)
            .unwrap();

        assert_eq!(inner.name, "a.Outer$Inner");
        let this0 = inner.fields.iter().next().unwrap().1.clone();
        assert_eq!(this0.name, "this$0");
        assert_eq!(this0.kind, MemberKind::Field);
        assert!(this0.modifiers.contains(Modifiers::SYNTHETIC));
        assert_eq!(this0.value_type().unwrap().unwrap().token, outer.token);
    }

    #[test]
    fn test_nested_class_static() {
        let world = TestWorld::new();
        let outer = world.class("a.Outer");
        let nested = TypeBuilder::nested_class(&outer, "Helper")
            .modifiers(Modifiers::PRIVATE)
            .build(&world.registry)
            .unwrap();

        assert_eq!(nested.name, "a.Outer$Helper");
        assert!(nested.modifiers.contains(Modifiers::STATIC));
        assert!(nested.modifiers.contains(Modifiers::PRIVATE));
        assert_eq!(nested.fields.count(), 0);
    }

    #[test]
    fn test_invalid_hierarchy() {
        let world = TestWorld::new();
        let result = TypeBuilder::class("a.Bad")
            .extends(&world.comparable)
            .build(&world.registry);
        assert!(result.is_err());

        let result = TypeBuilder::class("a.Bad2")
            .implements(&world.object)
            .build(&world.registry);
        assert!(result.is_err());
    }
}
