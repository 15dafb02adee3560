//! Shared fixtures for unit tests
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use crate::{
    metadata::{
        member::{MemberKind, MemberRc},
        reflection::Reflection,
        typesystem::{RuntimeType, RuntimeTypeRc, TypeLoader, TypeSignature},
    },
    Result, TypeBuilder, TypeRegistry,
};

/// A bootstrapped registry plus handles to the builtin types most tests need
pub struct TestWorld {
    pub registry: Arc<TypeRegistry>,
    pub int: RuntimeTypeRc,
    pub long: RuntimeTypeRc,
    pub short: RuntimeTypeRc,
    pub byte: RuntimeTypeRc,
    pub char_: RuntimeTypeRc,
    pub float: RuntimeTypeRc,
    pub double: RuntimeTypeRc,
    pub boolean: RuntimeTypeRc,
    pub integer: RuntimeTypeRc,
    pub long_wrapper: RuntimeTypeRc,
    pub number: RuntimeTypeRc,
    pub object: RuntimeTypeRc,
    pub string: RuntimeTypeRc,
    pub comparable: RuntimeTypeRc,
    pub serializable: RuntimeTypeRc,
    pub char_sequence: RuntimeTypeRc,
}

impl TestWorld {
    pub fn new() -> Self {
        let registry = Arc::new(TypeRegistry::new().unwrap());
        let get = |name: &str| registry.find_type(name, None).unwrap();

        TestWorld {
            int: get("int"),
            long: get("long"),
            short: get("short"),
            byte: get("byte"),
            char_: get("char"),
            float: get("float"),
            double: get("double"),
            boolean: get("boolean"),
            integer: get("java.lang.Integer"),
            long_wrapper: get("java.lang.Long"),
            number: get("java.lang.Number"),
            object: get("java.lang.Object"),
            string: get("java.lang.String"),
            comparable: get("java.lang.Comparable"),
            serializable: get("java.io.Serializable"),
            char_sequence: get("java.lang.CharSequence"),
            registry,
        }
    }

    // Helper function to create an empty class extending java.lang.Object
    pub fn class(&self, name: &str) -> RuntimeTypeRc {
        TypeBuilder::class(name).build(&self.registry).unwrap()
    }
}

/// Forwards to a registry and counts native declared-member lookups
pub struct CountingReflection {
    inner: Arc<TypeRegistry>,
    declared: AtomicUsize,
}

impl CountingReflection {
    pub fn new(inner: Arc<TypeRegistry>) -> Self {
        CountingReflection {
            inner,
            declared: AtomicUsize::new(0),
        }
    }

    pub fn declared_lookups(&self) -> usize {
        self.declared.load(Ordering::SeqCst)
    }
}

impl Reflection for CountingReflection {
    fn find_type(&self, name: &str, loader: Option<&dyn TypeLoader>) -> Result<RuntimeTypeRc> {
        self.inner.find_type(name, loader)
    }

    fn declared_member(
        &self,
        ty: &RuntimeType,
        kind: MemberKind,
        name: Option<&str>,
        parameters: &TypeSignature,
    ) -> Result<MemberRc> {
        self.declared.fetch_add(1, Ordering::SeqCst);
        self.inner.declared_member(ty, kind, name, parameters)
    }
}
