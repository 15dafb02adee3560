//! Reflective invocation.
//!
//! [`Invoker`] calls resolved members the way reflective calls behave at runtime: the member
//! must be accessible, the arguments must fit the declared parameters, and an instance member
//! needs a receiver. For members of an enclosing type the receiver is found by following the
//! enclosing-instance chain of the supplied object, so a member resolved with
//! [`crate::MatchPolicy::Deep`] can be called with the nested object as receiver.
//!
//! Every failure is reported as [`Error::Invocation`] naming the member, with the concrete
//! reason as its source.

use std::sync::Arc;

use crate::{
    bridge::{run_hooked, HookBackend, HookParam, MemberHook},
    metadata::{
        member::{Member, MemberKind, MemberRc},
        reflection::Reflection,
        typesystem::RuntimeType,
    },
    resolve::{EnclosingWalker, NestingConvention},
    runtime::{Instance, InstanceRc, Value},
    Error, Result,
};

/// Calls methods and constructors and accesses fields.
#[derive(Clone)]
pub struct Invoker {
    reflection: Arc<dyn Reflection>,
    walker: EnclosingWalker,
    backend: Option<Arc<dyn HookBackend>>,
}

impl Invoker {
    /// Create an invoker without hook dispatch
    ///
    /// ## Arguments
    /// * 'reflection' - The reflective facility used for type checks
    pub fn new(reflection: Arc<dyn Reflection>) -> Self {
        Invoker {
            walker: EnclosingWalker::new(reflection.clone()),
            reflection,
            backend: None,
        }
    }

    /// Dispatch [`Invoker::invoke`] and [`Invoker::new_instance`] through `backend`
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn HookBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Replace the nesting convention used to find enclosing receivers
    #[must_use]
    pub fn with_convention(mut self, convention: NestingConvention) -> Self {
        self.walker = self.walker.with_convention(convention);
        self
    }

    /// Call a method, running any attached hooks
    ///
    /// ## Arguments
    /// * 'method'   - The method to call
    /// * 'receiver' - The receiver, ignored for static methods
    /// * 'args'     - The arguments
    ///
    /// # Errors
    /// Returns [`Error::Invocation`] if the call can not be made or the body fails.
    pub fn invoke(
        &self,
        method: &MemberRc,
        receiver: Option<&InstanceRc>,
        args: &[Value],
    ) -> Result<Value> {
        self.call_method(method, receiver, args, true)
            .map_err(|error| Self::wrap(method, error))
    }

    /// Call a method, bypassing any attached hooks
    ///
    /// # Errors
    /// Returns [`Error::Invocation`] if the call can not be made or the body fails.
    pub fn invoke_original(
        &self,
        method: &MemberRc,
        receiver: Option<&InstanceRc>,
        args: &[Value],
    ) -> Result<Value> {
        self.call_method(method, receiver, args, false)
            .map_err(|error| Self::wrap(method, error))
    }

    /// Allocate an object and run `constructor` on it
    ///
    /// A `before` hook that sets an object result replaces the allocated instance.
    ///
    /// # Errors
    /// Returns [`Error::Invocation`] if the constructor can not be called or fails.
    pub fn new_instance(&self, constructor: &MemberRc, args: &[Value]) -> Result<InstanceRc> {
        self.construct(constructor, args)
            .map_err(|error| Self::wrap(constructor, error))
    }

    /// Read a field
    ///
    /// # Errors
    /// Returns [`Error::Invocation`] if the field is not accessible or no receiver fits.
    pub fn get_field(&self, field: &Member, receiver: Option<&InstanceRc>) -> Result<Value> {
        self.read(field, receiver)
            .map_err(|error| Self::wrap(field, error))
    }

    /// Write a field
    ///
    /// # Errors
    /// Returns [`Error::Invocation`] if the field is not accessible, no receiver fits or the
    /// value does not fit the field type.
    pub fn set_field(
        &self,
        field: &Member,
        receiver: Option<&InstanceRc>,
        value: Value,
    ) -> Result<()> {
        self.write(field, receiver, value)
            .map_err(|error| Self::wrap(field, error))
    }

    fn wrap(member: &Member, error: Error) -> Error {
        Error::Invocation {
            member: member.to_string(),
            source: Box::new(error),
        }
    }

    fn call_method(
        &self,
        method: &MemberRc,
        receiver: Option<&InstanceRc>,
        args: &[Value],
        hooked: bool,
    ) -> Result<Value> {
        Self::expect_kind(method, MemberKind::Method)?;
        Self::check_access(method)?;
        let receiver = self.receiver(method, receiver)?;
        let args = self.convert_args(method, args)?;

        let original = |receiver: Option<&InstanceRc>, args: &[Value]| -> Result<Value> {
            match method.body() {
                Some(body) => body(receiver, args),
                None => Err(Error::Thrown(format!("{method} has no body"))),
            }
        };

        match self.hooks(method, hooked) {
            Some(hooks) => run_hooked(
                &hooks,
                HookParam::new(method.clone(), receiver, args),
                original,
            ),
            None => original(receiver.as_ref(), &args),
        }
    }

    fn construct(&self, constructor: &MemberRc, args: &[Value]) -> Result<InstanceRc> {
        Self::expect_kind(constructor, MemberKind::Constructor)?;
        Self::check_access(constructor)?;
        let args = self.convert_args(constructor, args)?;

        let declaring = constructor.declaring_type()?;
        if declaring.is_interface() {
            return Err(Error::IllegalArgument(format!(
                "can not instantiate interface {}",
                declaring.name
            )));
        }
        let instance = Instance::new(&declaring);

        let original = |receiver: Option<&InstanceRc>, args: &[Value]| -> Result<Value> {
            if let Some(body) = constructor.body() {
                body(receiver, args)?;
            }
            Ok(receiver.map_or(Value::Null, |r| Value::Object(r.clone())))
        };

        let outcome = match self.hooks(constructor, true) {
            Some(hooks) => run_hooked(
                &hooks,
                HookParam::new(constructor.clone(), Some(instance.clone()), args),
                original,
            )?,
            None => original(Some(&instance), &args)?,
        };

        match outcome {
            Value::Object(replaced) => Ok(replaced),
            _ => Ok(instance),
        }
    }

    fn read(&self, field: &Member, receiver: Option<&InstanceRc>) -> Result<Value> {
        Self::expect_kind(field, MemberKind::Field)?;
        Self::check_access(field)?;

        match self.receiver(field, receiver)? {
            Some(instance) => instance.field_value(field),
            None => field.static_value(),
        }
    }

    fn write(&self, field: &Member, receiver: Option<&InstanceRc>, value: Value) -> Result<()> {
        Self::expect_kind(field, MemberKind::Field)?;
        Self::check_access(field)?;

        let field_type = field.value_type()?;
        let value = match field_type {
            Some(ty) => self.convert(field, &ty, value)?,
            None => value,
        };

        match self.receiver(field, receiver)? {
            Some(instance) => instance.set_field_value(field, value),
            None => field.set_static_value(value),
        }
    }

    fn hooks(&self, member: &Member, hooked: bool) -> Option<Vec<Arc<dyn MemberHook>>> {
        if !hooked {
            return None;
        }
        let hooks = self.backend.as_ref()?.hooks_for(member);
        (!hooks.is_empty()).then_some(hooks)
    }

    fn expect_kind(member: &Member, kind: MemberKind) -> Result<()> {
        if member.kind == kind {
            Ok(())
        } else {
            Err(Error::IllegalArgument(format!(
                "{member} is a {}, not a {kind}",
                member.kind
            )))
        }
    }

    fn check_access(member: &Member) -> Result<()> {
        if member.is_accessible() {
            Ok(())
        } else {
            Err(Error::IllegalAccess(format!("{member} is not accessible")))
        }
    }

    fn receiver(
        &self,
        member: &Member,
        receiver: Option<&InstanceRc>,
    ) -> Result<Option<InstanceRc>> {
        if member.is_static() {
            return Ok(None);
        }

        let Some(instance) = receiver else {
            return Err(Error::MissingReceiver(format!("{member} needs a receiver")));
        };

        let declaring = member.declaring_type()?;
        let resolved = self.walker.receiver_for(&declaring, instance);
        if resolved.is_instance_of(&declaring, self.reflection.as_ref()) {
            Ok(Some(resolved))
        } else {
            Err(Error::MissingReceiver(format!(
                "no instance of {} reachable from {:?}",
                declaring.name, instance
            )))
        }
    }

    fn convert_args(&self, member: &Member, args: &[Value]) -> Result<Vec<Value>> {
        if args.len() != member.parameters.len() {
            return Err(Error::IllegalArgument(format!(
                "{member} takes {} arguments, got {}",
                member.parameters.len(),
                args.len()
            )));
        }

        member
            .parameters
            .iter()
            .zip(args)
            .map(|(parameter, arg)| {
                let parameter = parameter.resolve()?;
                self.convert(member, &parameter, arg.clone())
            })
            .collect()
    }

    fn convert(
        &self,
        member: &Member,
        target: &RuntimeType,
        value: Value,
    ) -> Result<Value> {
        if let Some(kind) = target.primitive() {
            return value.widen_to(kind).ok_or_else(|| {
                Error::IllegalArgument(format!(
                    "{value:?} can not be passed as {} to {member}",
                    target.name
                ))
            });
        }

        match value.runtime_type(self.reflection.as_ref())? {
            None => Ok(value),
            Some(actual) if self.reflection.is_assignable_from(target, &actual) => Ok(value),
            Some(actual) => Err(Error::IllegalArgument(format!(
                "{} can not be passed as {} to {member}",
                actual.name, target.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bridge::DispatchBackend,
        metadata::member::{MemberBuilder, Modifiers},
        test::TestWorld,
        MatchPolicy, MemberResolver, TypeBuilder,
    };

    fn invoker(world: &TestWorld) -> Invoker {
        Invoker::new(world.registry.clone())
    }

    fn cause(error: Error) -> Error {
        match error {
            Error::Invocation { source, .. } => *source,
            other => panic!("expected invocation error, got {other:?}"),
        }
    }

    #[test]
    fn test_static_call_widens_arguments() {
        let world = TestWorld::new();
        let math = TypeBuilder::class("a.Math")
            .method(
                MemberBuilder::method("twice")
                    .modifiers(Modifiers::PUBLIC | Modifiers::STATIC)
                    .param(&world.long)
                    .returns(&world.long)
                    .body(|_, args| match args {
                        [Value::Long(v)] => Ok(Value::Long(v * 2)),
                        other => Err(Error::Thrown(format!("unexpected {other:?}"))),
                    }),
            )
            .build(&world.registry)
            .unwrap();
        let twice = math.methods.get(0).unwrap().clone();

        let invoker = invoker(&world);
        assert_eq!(
            invoker.invoke(&twice, None, &[Value::Int(21)]).unwrap(),
            Value::Long(42)
        );
        assert!(matches!(
            cause(invoker.invoke(&twice, None, &[Value::Double(1.0)]).unwrap_err()),
            Error::IllegalArgument(_)
        ));
        assert!(matches!(
            cause(invoker.invoke(&twice, None, &[Value::Null]).unwrap_err()),
            Error::IllegalArgument(_)
        ));
        assert!(matches!(
            cause(invoker.invoke(&twice, None, &[]).unwrap_err()),
            Error::IllegalArgument(_)
        ));
    }

    #[test]
    fn test_reference_arguments() {
        let world = TestWorld::new();
        let sink = TypeBuilder::class("a.Sink")
            .method(
                MemberBuilder::method("take")
                    .modifiers(Modifiers::PUBLIC | Modifiers::STATIC)
                    .param(&world.number)
                    .body(|_, args| Ok(args[0].clone())),
            )
            .build(&world.registry)
            .unwrap();
        let take = sink.methods.get(0).unwrap().clone();

        let invoker = invoker(&world);
        assert_eq!(invoker.invoke(&take, None, &[Value::Int(3)]).unwrap(), Value::Int(3));
        assert_eq!(invoker.invoke(&take, None, &[Value::Null]).unwrap(), Value::Null);
        assert!(invoker.invoke(&take, None, &[Value::from("3")]).is_err());
    }

    #[test]
    fn test_access_and_receiver_checks() {
        let world = TestWorld::new();
        let ty = TypeBuilder::class("a.Box")
            .method(
                MemberBuilder::method("secret")
                    .modifiers(Modifiers::PRIVATE)
                    .body(|_, _| Ok(Value::Int(7))),
            )
            .build(&world.registry)
            .unwrap();
        let secret = ty.methods.get(0).unwrap().clone();
        let obj = Instance::new(&ty);

        let invoker = invoker(&world);
        assert!(matches!(
            cause(invoker.invoke(&secret, Some(&obj), &[]).unwrap_err()),
            Error::IllegalAccess(_)
        ));

        secret.set_accessible(true);
        assert!(matches!(
            cause(invoker.invoke(&secret, None, &[]).unwrap_err()),
            Error::MissingReceiver(_)
        ));
        let stranger = Instance::new(&world.object);
        assert!(matches!(
            cause(invoker.invoke(&secret, Some(&stranger), &[]).unwrap_err()),
            Error::MissingReceiver(_)
        ));
        assert_eq!(invoker.invoke(&secret, Some(&obj), &[]).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_enclosing_receiver() {
        let world = TestWorld::new();
        let outer = TypeBuilder::class("a.Outer")
            .field(MemberBuilder::field("x", &world.int))
            .build(&world.registry)
            .unwrap();
        let inner = TypeBuilder::inner_class(&outer, "Inner")
            .build(&world.registry)
            .unwrap();
        let this0 = inner.fields.get(0).unwrap().clone();

        let outer_obj = Instance::new(&outer);
        let inner_obj = Instance::new(&inner);
        inner_obj
            .set_field_value(&this0, Value::Object(outer_obj.clone()))
            .unwrap();

        let resolver = MemberResolver::new(world.registry.clone());
        let x = resolver.find_field(&inner, "x", MatchPolicy::Deep).unwrap();

        let invoker = invoker(&world);
        invoker.set_field(&x, Some(&inner_obj), Value::Int(9)).unwrap();
        assert_eq!(invoker.get_field(&x, Some(&inner_obj)).unwrap(), Value::Int(9));
        assert_eq!(outer_obj.field_value(&x).unwrap(), Value::Int(9));
    }

    #[test]
    fn test_static_fields() {
        let world = TestWorld::new();
        let ty = TypeBuilder::class("a.Config")
            .field(
                MemberBuilder::field("limit", &world.long)
                    .modifiers(Modifiers::PUBLIC | Modifiers::STATIC)
                    .initial_value(Value::Long(10)),
            )
            .build(&world.registry)
            .unwrap();
        let limit = ty.fields.get(0).unwrap().clone();

        let invoker = invoker(&world);
        assert_eq!(invoker.get_field(&limit, None).unwrap(), Value::Long(10));
        invoker.set_field(&limit, None, Value::Int(11)).unwrap();
        assert_eq!(invoker.get_field(&limit, None).unwrap(), Value::Long(11));
        assert!(invoker.set_field(&limit, None, Value::from("x")).is_err());
    }

    #[test]
    fn test_new_instance() {
        let world = TestWorld::new();
        let ty = TypeBuilder::class("a.Point")
            .field(MemberBuilder::field("x", &world.int))
            .build(&world.registry)
            .unwrap();
        let x = ty.fields.get(0).unwrap().clone();
        let field = x.clone();
        let ctor = world
            .registry
            .define_member(
                &ty,
                MemberBuilder::constructor()
                    .param(&world.int)
                    .body(move |this, args| {
                        if let Some(this) = this {
                            this.set_field_value(&field, args[0].clone())?;
                        }
                        Ok(Value::Null)
                    }),
            )
            .unwrap();

        let invoker = invoker(&world);
        let point = invoker.new_instance(&ctor, &[Value::Int(4)]).unwrap();
        assert_eq!(point.runtime_type().token, ty.token);
        assert_eq!(point.field_value(&x).unwrap(), Value::Int(4));

        let method_err = invoker.invoke(&ctor, None, &[Value::Int(1)]).unwrap_err();
        assert!(matches!(cause(method_err), Error::IllegalArgument(_)));
    }

    #[test]
    fn test_body_errors_are_wrapped() {
        let world = TestWorld::new();
        let ty = TypeBuilder::class("a.Fails")
            .method(
                MemberBuilder::method("boom")
                    .modifiers(Modifiers::PUBLIC | Modifiers::STATIC)
                    .body(|_, _| Err(Error::Thrown("java.lang.IllegalStateException".into()))),
            )
            .method(MemberBuilder::method("empty").modifiers(Modifiers::PUBLIC | Modifiers::STATIC))
            .build(&world.registry)
            .unwrap();

        let invoker = invoker(&world);
        let err = invoker
            .invoke(ty.methods.get(0).unwrap(), None, &[])
            .unwrap_err();
        assert!(err.to_string().contains("a.Fails.boom()"));
        assert!(matches!(err.root_cause(), Error::Thrown(_)));

        let err = invoker
            .invoke(ty.methods.get(1).unwrap(), None, &[])
            .unwrap_err();
        assert!(matches!(cause(err), Error::Thrown(_)));
    }

    #[test]
    fn test_hooks_only_on_invoke() {
        struct Fixed;
        impl MemberHook for Fixed {
            fn before(&self, param: &mut HookParam) -> Result<()> {
                param.set_result(Value::Int(0));
                Ok(())
            }
        }

        let world = TestWorld::new();
        let ty = TypeBuilder::class("a.Hooked")
            .method(
                MemberBuilder::method("value")
                    .modifiers(Modifiers::PUBLIC | Modifiers::STATIC)
                    .body(|_, _| Ok(Value::Int(1))),
            )
            .build(&world.registry)
            .unwrap();
        let value = ty.methods.get(0).unwrap().clone();

        let backend = Arc::new(DispatchBackend::new());
        backend.attach(&value, Arc::new(Fixed)).unwrap();

        let invoker = invoker(&world).with_backend(backend);
        assert_eq!(invoker.invoke(&value, None, &[]).unwrap(), Value::Int(0));
        assert_eq!(invoker.invoke_original(&value, None, &[]).unwrap(), Value::Int(1));
    }
}
