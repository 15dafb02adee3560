//! Integration tests for resolving and invoking members, with and without hooks.

use reflectscope::{bridge::inject, prelude::*, Result};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Builds `app.Account` with a balance field, a deposit method and an inner `Audit` class
fn account_model(registry: &TypeRegistry) -> Result<(RuntimeTypeRc, RuntimeTypeRc)> {
    let long = registry.find_type("long", None)?;
    let account = TypeBuilder::class("app.Account")
        .field(MemberBuilder::field("balance", &long).modifiers(Modifiers::PRIVATE))
        .constructor(MemberBuilder::constructor())
        .build(registry)?;
    let balance = account.fields.get(0).cloned();

    registry.define_member(
        &account,
        MemberBuilder::method("deposit")
            .param(&long)
            .returns(&long)
            .body(move |this, args| {
                let (Some(this), Some(balance)) = (this, balance.as_ref()) else {
                    return Err(Error::Thrown("java.lang.NullPointerException".to_string()));
                };
                let current = this.field_value(balance)?.as_long().unwrap_or(0);
                let amount = args.first().and_then(Value::as_long).unwrap_or(0);
                this.set_field_value(balance, Value::Long(current + amount))?;
                Ok(Value::Long(current + amount))
            }),
    )?;

    let audit = TypeBuilder::inner_class(&account, "Audit").build(registry)?;
    Ok((account, audit))
}

#[test]
fn test_deep_call_uses_enclosing_receiver() -> Result<()> {
    let registry = Arc::new(TypeRegistry::new()?);
    let (account, audit) = account_model(&registry)?;
    let int = registry.find_type("int", None)?;

    let resolver = MemberResolver::new(registry.clone());
    let invoker = Invoker::new(registry.clone());

    let account_obj = invoker.new_instance(
        &resolver.find_constructor(&account, MatchPolicy::Exact, None)?,
        &[],
    )?;
    let audit_obj = Instance::new(&audit);
    let this0 = resolver.find_field(&audit, "this$0", MatchPolicy::Exact)?;
    invoker.set_field(&this0, Some(&audit_obj), Value::Object(account_obj.clone()))?;

    let deposit = resolver.find_method(
        &audit,
        "deposit",
        MatchPolicy::Deep,
        Some(&TypeSignature::from_types([&int])),
    )?;
    assert_eq!(
        invoker.invoke(&deposit, Some(&audit_obj), &[Value::Int(5)])?,
        Value::Long(5)
    );
    assert_eq!(
        invoker.invoke(&deposit, Some(&audit_obj), &[Value::Int(7)])?,
        Value::Long(12)
    );

    // Resolution made the private field accessible
    let balance = resolver.find_field(&audit, "balance", MatchPolicy::Deep)?;
    assert_eq!(invoker.get_field(&balance, Some(&audit_obj))?, Value::Long(12));
    Ok(())
}

#[test]
fn test_private_field_needs_resolution() -> Result<()> {
    let registry = Arc::new(TypeRegistry::new()?);
    let (account, _) = account_model(&registry)?;
    let invoker = Invoker::new(registry.clone());
    let obj = Instance::new(&account);

    let raw = account.fields.get(0).cloned().ok_or_else(|| {
        Error::TypeError("balance field missing".to_string())
    })?;
    match invoker.get_field(&raw, Some(&obj)) {
        Err(Error::Invocation { source, .. }) => {
            assert!(matches!(*source, Error::IllegalAccess(_)));
        }
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}

struct CountCalls(AtomicUsize);

impl MemberHook for CountCalls {
    fn before(&self, _param: &mut HookParam) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Limit;

impl MemberHook for Limit {
    fn before(&self, param: &mut HookParam) -> Result<()> {
        if param.args.first().and_then(Value::as_long) > Some(100) {
            param.set_throwable(Error::Thrown(
                "java.lang.IllegalArgumentException".to_string(),
            ));
        }
        Ok(())
    }
}

#[test]
fn test_injected_hooks() -> Result<()> {
    let registry = Arc::new(TypeRegistry::new()?);
    let (account, _) = account_model(&registry)?;
    let long = registry.find_type("long", None)?;

    let backend = Arc::new(DispatchBackend::new());
    let counter = Arc::new(CountCalls(AtomicUsize::new(0)));
    let handles = inject(
        registry.as_ref(),
        backend.as_ref(),
        &account,
        Some("deposit"),
        counter.clone(),
    )?;
    inject(registry.as_ref(), backend.as_ref(), &account, Some("deposit"), Arc::new(Limit))?;

    let resolver = MemberResolver::new(registry.clone());
    let invoker = Invoker::new(registry.clone()).with_backend(backend.clone());
    let deposit = resolver.find_method(
        &account,
        "deposit",
        MatchPolicy::Exact,
        Some(&TypeSignature::from_types([&long])),
    )?;
    let obj = Instance::new(&account);

    assert_eq!(invoker.invoke(&deposit, Some(&obj), &[Value::Long(10)])?, Value::Long(10));
    let refused = invoker.invoke(&deposit, Some(&obj), &[Value::Long(1000)]);
    assert!(matches!(refused.unwrap_err().root_cause(), Error::Thrown(_)));
    assert_eq!(counter.0.load(Ordering::SeqCst), 2);

    for handle in &handles {
        backend.detach(handle)?;
    }
    invoker.invoke(&deposit, Some(&obj), &[Value::Long(1)])?;
    assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    assert_eq!(
        invoker.invoke_original(&deposit, Some(&obj), &[Value::Long(1000)])?,
        Value::Long(1011)
    );
    Ok(())
}
