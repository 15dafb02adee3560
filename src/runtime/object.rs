use std::{fmt, sync::Arc};

use dashmap::DashMap;

use crate::{
    metadata::{
        member::{Member, MemberKind},
        reflection::Reflection,
        token::Token,
        typesystem::{RuntimeType, RuntimeTypeRc},
    },
    runtime::Value,
    Error, Result,
};

/// Reference to an `Instance`
pub type InstanceRc = Arc<Instance>;

/// An object of the runtime.
///
/// Instance field values are stored by field token. Fields that were never written read as
/// the zero value of their type.
pub struct Instance {
    ty: RuntimeTypeRc,
    fields: DashMap<Token, Value>,
}

impl Instance {
    /// Allocate a new object of type `ty` with all fields at their zero value
    #[must_use]
    pub fn new(ty: &RuntimeTypeRc) -> InstanceRc {
        Arc::new(Instance {
            ty: ty.clone(),
            fields: DashMap::new(),
        })
    }

    /// The exact type of this object
    #[must_use]
    pub fn runtime_type(&self) -> &RuntimeTypeRc {
        &self.ty
    }

    /// Returns true if this object can be used where `ty` is expected
    pub fn is_instance_of(&self, ty: &RuntimeType, reflection: &dyn Reflection) -> bool {
        reflection.is_assignable_from(ty, &self.ty)
    }

    /// Read an instance field
    ///
    /// # Errors
    /// Returns an error if `field` is not an instance field, or if its type was dropped.
    pub fn field_value(&self, field: &Member) -> Result<Value> {
        Self::check_field(field)?;
        if let Some(value) = self.fields.get(&field.token) {
            return Ok(value.value().clone());
        }

        Ok(field
            .value_type()?
            .map_or(Value::Null, |ty| Value::default_for(&ty)))
    }

    /// Write an instance field
    ///
    /// # Errors
    /// Returns an error if `field` is not an instance field.
    pub fn set_field_value(&self, field: &Member, value: Value) -> Result<()> {
        Self::check_field(field)?;
        self.fields.insert(field.token, value);
        Ok(())
    }

    fn check_field(field: &Member) -> Result<()> {
        if field.kind != MemberKind::Field || field.is_static() {
            return Err(Error::IllegalArgument(format!(
                "{field} is not an instance field"
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:p}", self.ty.name, self as *const Instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::member::{MemberBuilder, Modifiers},
        test::TestWorld,
        TypeBuilder,
    };

    #[test]
    fn test_field_values() {
        let world = TestWorld::new();
        let ty = TypeBuilder::class("a.Point")
            .field(MemberBuilder::field("x", &world.int))
            .field(MemberBuilder::field("label", &world.string))
            .build(&world.registry)
            .unwrap();
        let x = ty.fields.get(0).unwrap().clone();
        let label = ty.fields.get(1).unwrap().clone();

        let point = Instance::new(&ty);
        assert_eq!(point.field_value(&x).unwrap(), Value::Int(0));
        assert_eq!(point.field_value(&label).unwrap(), Value::Null);

        point.set_field_value(&x, Value::Int(3)).unwrap();
        point.set_field_value(&label, Value::from("origin")).unwrap();
        assert_eq!(point.field_value(&x).unwrap(), Value::Int(3));
        assert_eq!(point.field_value(&label).unwrap().as_str(), Some("origin"));
    }

    #[test]
    fn test_static_field_rejected() {
        let world = TestWorld::new();
        let ty = TypeBuilder::class("a.Counter")
            .field(MemberBuilder::field("total", &world.int).modifiers(Modifiers::STATIC))
            .build(&world.registry)
            .unwrap();
        let total = ty.fields.get(0).unwrap().clone();

        let counter = Instance::new(&ty);
        assert!(counter.field_value(&total).is_err());
        assert!(counter.set_field_value(&total, Value::Int(1)).is_err());
    }

    #[test]
    fn test_is_instance_of() {
        let world = TestWorld::new();
        let base = world.class("a.Base");
        let derived = TypeBuilder::class("a.Derived")
            .extends(&base)
            .build(&world.registry)
            .unwrap();

        let object = Instance::new(&derived);
        assert!(object.is_instance_of(&base, world.registry.as_ref()));
        assert!(object.is_instance_of(&world.object, world.registry.as_ref()));
        assert!(!object.is_instance_of(&world.string, world.registry.as_ref()));
    }
}
