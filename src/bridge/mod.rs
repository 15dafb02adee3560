//! Hook bridge.
//!
//! A [`HookBackend`] attaches [`MemberHook`]s to methods and constructors. When a hooked member
//! is invoked through [`crate::runtime::Invoker::invoke`], every attached hook sees the call
//! before and after the original body runs and may rewrite arguments or the outcome:
//!
//! - hooks run their `before` callback in attach order
//! - a `before` callback that sets a result (or error) on the [`HookParam`] skips the original
//!   body and the remaining `before` callbacks
//! - the `after` callbacks of every hook whose `before` ran are called in reverse order and see
//!   the outcome of the call
//!
//! A hook callback that fails is logged and otherwise ignored, so a broken hook can not take
//! the hooked member down with it.
//!
//! [`DispatchBackend`] is the in-process implementation. [`inject`] hooks all overloads of a
//! member in one go.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use reflectscope::prelude::*;
//! use reflectscope::bridge::{inject, DispatchBackend, HookParam, MemberHook};
//!
//! struct Shout;
//!
//! impl MemberHook for Shout {
//!     fn after(&self, param: &mut HookParam) -> reflectscope::Result<()> {
//!         if let Some(Value::String(text)) = param.result() {
//!             let loud = text.to_uppercase();
//!             param.set_result(Value::from(loud.as_str()));
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let registry = Arc::new(TypeRegistry::new()?);
//! let string = registry.find_type("java.lang.String", None)?;
//! let greeter = TypeBuilder::class("app.Greeter")
//!     .method(
//!         MemberBuilder::method("greet")
//!             .modifiers(Modifiers::PUBLIC | Modifiers::STATIC)
//!             .returns(&string)
//!             .body(|_, _| Ok(Value::from("hello"))),
//!     )
//!     .build(&registry)?;
//!
//! let backend = Arc::new(DispatchBackend::new());
//! let handles = inject(registry.as_ref(), backend.as_ref(), &greeter, Some("greet"), Arc::new(Shout))?;
//! assert_eq!(handles.len(), 1);
//!
//! let invoker = Invoker::new(registry.clone()).with_backend(backend.clone());
//! let greet = MemberResolver::new(registry.clone()).find_method(&greeter, "greet", MatchPolicy::Exact, None)?;
//! assert_eq!(invoker.invoke(&greet, None, &[])?.as_str(), Some("HELLO"));
//! assert_eq!(invoker.invoke_original(&greet, None, &[])?.as_str(), Some("hello"));
//! # Ok::<(), reflectscope::Error>(())
//! ```

mod dispatch;

pub use dispatch::DispatchBackend;

use std::sync::Arc;

use crate::{
    metadata::{
        member::{Member, MemberKind, MemberRc},
        reflection::Reflection,
        token::Token,
        typesystem::RuntimeType,
    },
    runtime::{InstanceRc, Value},
    Error, Result,
};

/// Identifies one attached hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle {
    /// Token of the hooked member
    pub member: Token,
    /// Backend specific id of the attachment
    pub id: u64,
}

/// The state of one hooked call, shared by all hooks of the call.
pub struct HookParam {
    /// The invoked member
    pub member: MemberRc,
    /// The receiver, `None` for static members
    pub receiver: Option<InstanceRc>,
    /// The arguments passed to the original body; hooks may rewrite them in `before`
    pub args: Vec<Value>,
    outcome: Option<Result<Value>>,
}

impl HookParam {
    /// Create the state for a call that has not run yet
    pub fn new(member: MemberRc, receiver: Option<InstanceRc>, args: Vec<Value>) -> Self {
        HookParam {
            member,
            receiver,
            args,
            outcome: None,
        }
    }

    /// The result value, if the call produced (or a hook set) one
    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Some(Ok(value)) => Some(value),
            _ => None,
        }
    }

    /// The error, if the call raised (or a hook set) one
    #[must_use]
    pub fn throwable(&self) -> Option<&Error> {
        match &self.outcome {
            Some(Err(error)) => Some(error),
            _ => None,
        }
    }

    /// Returns true once a result or error is present
    #[must_use]
    pub fn has_outcome(&self) -> bool {
        self.outcome.is_some()
    }

    /// Set the result; in `before` this skips the original body
    pub fn set_result(&mut self, value: Value) {
        self.outcome = Some(Ok(value));
    }

    /// Set an error; in `before` this skips the original body
    pub fn set_throwable(&mut self, error: Error) {
        self.outcome = Some(Err(error));
    }

    fn into_outcome(self) -> Result<Value> {
        self.outcome.unwrap_or(Ok(Value::Null))
    }
}

/// Callbacks around a hooked member
pub trait MemberHook: Send + Sync {
    /// Called before the original body
    ///
    /// # Errors
    /// A returned error is logged and the hook is treated as if it did nothing.
    fn before(&self, _param: &mut HookParam) -> Result<()> {
        Ok(())
    }

    /// Called after the original body, or after a `before` callback set the outcome
    ///
    /// # Errors
    /// A returned error is logged and the hook is treated as if it did nothing.
    fn after(&self, _param: &mut HookParam) -> Result<()> {
        Ok(())
    }
}

/// Attaches hooks to members
pub trait HookBackend: Send + Sync {
    /// Attach `hook` to `member`
    ///
    /// # Errors
    /// Returns [`Error::HookError`] if `member` can not be hooked.
    fn attach(&self, member: &MemberRc, hook: Arc<dyn MemberHook>) -> Result<HookHandle>;

    /// Remove an attached hook
    ///
    /// # Errors
    /// Returns [`Error::HookError`] if `handle` is not attached.
    fn detach(&self, handle: &HookHandle) -> Result<()>;

    /// The hooks attached to `member`, in attach order
    fn hooks_for(&self, member: &Member) -> Vec<Arc<dyn MemberHook>>;
}

/// Attach `hook` to every method of `ty` named `name`, or to every constructor if `name` is
/// `None`. Inherited members are not hooked.
///
/// Returns one handle per hooked member; no matching member is not an error.
///
/// # Errors
/// Returns the first error of [`HookBackend::attach`].
pub fn inject(
    reflection: &dyn Reflection,
    backend: &dyn HookBackend,
    ty: &RuntimeType,
    name: Option<&str>,
    hook: Arc<dyn MemberHook>,
) -> Result<Vec<HookHandle>> {
    let (kind, name) = match name {
        Some(name) => (MemberKind::Method, Some(name)),
        None => (MemberKind::Constructor, None),
    };

    let handles = reflection
        .list_members(ty, kind)
        .iter()
        .filter(|member| name.map_or(true, |name| member.name == name))
        .map(|member| backend.attach(member, hook.clone()))
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "Injected hook into {} {} of {}",
        handles.len(),
        name.unwrap_or("constructors"),
        ty.name
    );
    Ok(handles)
}

/// Run `original` wrapped by `hooks`.
pub(crate) fn run_hooked<F>(
    hooks: &[Arc<dyn MemberHook>],
    mut param: HookParam,
    original: F,
) -> Result<Value>
where
    F: FnOnce(Option<&InstanceRc>, &[Value]) -> Result<Value>,
{
    let mut entered = 0;
    for hook in hooks {
        entered += 1;
        if let Err(error) = hook.before(&mut param) {
            log::warn!("Hook before {} failed: {}", param.member, error);
        }
        if param.has_outcome() {
            break;
        }
    }

    if !param.has_outcome() {
        param.outcome = Some(original(param.receiver.as_ref(), &param.args));
    }

    for hook in hooks[..entered].iter().rev() {
        if let Err(error) = hook.after(&mut param) {
            log::warn!("Hook after {} failed: {}", param.member, error);
        }
    }

    param.into_outcome()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::member::{MemberBuilder, Modifiers},
        test::TestWorld,
        TypeBuilder,
    };
    use std::sync::Mutex;

    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        replace: Option<i32>,
    }

    impl MemberHook for Recorder {
        fn before(&self, param: &mut HookParam) -> Result<()> {
            self.log.lock().unwrap().push(format!("before {}", self.label));
            if let Some(value) = self.replace {
                param.set_result(Value::Int(value));
            }
            Ok(())
        }

        fn after(&self, _param: &mut HookParam) -> Result<()> {
            self.log.lock().unwrap().push(format!("after {}", self.label));
            Ok(())
        }
    }

    struct Broken;

    impl MemberHook for Broken {
        fn before(&self, _param: &mut HookParam) -> Result<()> {
            Err(Error::HookError("broken".to_string()))
        }
    }

    fn member(world: &TestWorld) -> MemberRc {
        let ty = world.class("a.Hooked");
        world
            .registry
            .define_member(
                &ty,
                MemberBuilder::method("f").modifiers(Modifiers::PUBLIC | Modifiers::STATIC),
            )
            .unwrap()
    }

    #[test]
    fn test_order_and_skip() {
        let world = TestWorld::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let hook = |label, replace| -> Arc<dyn MemberHook> {
            Arc::new(Recorder {
                label,
                log: log.clone(),
                replace,
            })
        };
        let hooks = vec![hook("a", None), hook("b", Some(5)), hook("c", None)];

        let param = HookParam::new(member(&world), None, vec![]);
        let result = run_hooked(&hooks, param, |_, _| {
            panic!("original must be skipped");
        })
        .unwrap();

        assert_eq!(result, Value::Int(5));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["before a", "before b", "after b", "after a"]
        );
    }

    #[test]
    fn test_original_sees_rewritten_args() {
        struct Double;
        impl MemberHook for Double {
            fn before(&self, param: &mut HookParam) -> Result<()> {
                for arg in &mut param.args {
                    if let Value::Int(v) = arg {
                        *v *= 2;
                    }
                }
                Ok(())
            }
        }

        let world = TestWorld::new();
        let hooks: Vec<Arc<dyn MemberHook>> = vec![Arc::new(Broken), Arc::new(Double)];
        let param = HookParam::new(member(&world), None, vec![Value::Int(21)]);
        let result = run_hooked(&hooks, param, |_, args| Ok(args[0].clone())).unwrap();
        assert_eq!(result, Value::Int(42));
    }

    #[test]
    fn test_after_can_replace_error() {
        struct Recover;
        impl MemberHook for Recover {
            fn after(&self, param: &mut HookParam) -> Result<()> {
                if param.throwable().is_some() {
                    param.set_result(Value::Int(-1));
                }
                Ok(())
            }
        }

        let world = TestWorld::new();
        let hooks: Vec<Arc<dyn MemberHook>> = vec![Arc::new(Recover)];
        let param = HookParam::new(member(&world), None, vec![]);
        let result =
            run_hooked(&hooks, param, |_, _| Err(Error::Thrown("boom".to_string()))).unwrap();
        assert_eq!(result, Value::Int(-1));
    }

    #[test]
    fn test_inject_overloads_and_constructors() {
        let world = TestWorld::new();
        let ty = TypeBuilder::class("a.Target")
            .method(MemberBuilder::method("f"))
            .method(MemberBuilder::method("f").param(&world.int))
            .method(MemberBuilder::method("g"))
            .constructor(MemberBuilder::constructor())
            .build(&world.registry)
            .unwrap();

        let backend = DispatchBackend::new();
        let hook: Arc<dyn MemberHook> = Arc::new(Broken);
        let methods = inject(world.registry.as_ref(), &backend, &ty, Some("f"), hook.clone()).unwrap();
        assert_eq!(methods.len(), 2);
        let ctors = inject(world.registry.as_ref(), &backend, &ty, None, hook.clone()).unwrap();
        assert_eq!(ctors.len(), 1);
        let none = inject(world.registry.as_ref(), &backend, &ty, Some("zzz"), hook).unwrap();
        assert!(none.is_empty());

        let g = ty.methods.get(2).unwrap();
        assert!(backend.hooks_for(g).is_empty());
        assert_eq!(backend.hooks_for(ty.methods.get(0).unwrap()).len(), 1);
    }
}
