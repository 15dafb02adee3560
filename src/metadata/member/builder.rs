use std::sync::{atomic::AtomicBool, Arc, RwLock};

use crate::{
    error::type_error,
    metadata::{
        member::{Member, MemberKind, Modifiers, CONSTRUCTOR_NAME},
        token::Token,
        typesystem::{RuntimeTypeRc, RuntimeTypeRef},
    },
    runtime::{InstanceRc, Value},
    Result,
};

/// The implementation of a method or constructor.
///
/// Called with the resolved receiver (`None` for static members) and the already checked and
/// converted arguments. For constructors the receiver is the freshly allocated instance and the
/// return value is ignored.
pub type MemberBody = Arc<dyn Fn(Option<&InstanceRc>, &[Value]) -> Result<Value> + Send + Sync>;

/// Builder for a [`Member`].
///
/// The builder is consumed by [`crate::TypeRegistry::define_member`] or by
/// [`crate::TypeBuilder`], which assign the token and declaring type.
pub struct MemberBuilder {
    kind: MemberKind,
    name: String,
    modifiers: Modifiers,
    parameters: Vec<RuntimeTypeRef>,
    value_type: Option<RuntimeTypeRef>,
    body: Option<MemberBody>,
    initial: Option<Value>,
}

impl MemberBuilder {
    fn new(kind: MemberKind, name: String) -> Self {
        MemberBuilder {
            kind,
            name,
            modifiers: Modifiers::PUBLIC,
            parameters: Vec::new(),
            value_type: None,
            body: None,
            initial: None,
        }
    }

    /// Start a method named `name` (public, no parameters, returns `void`)
    #[must_use]
    pub fn method(name: &str) -> Self {
        Self::new(MemberKind::Method, name.to_string())
    }

    /// Start a constructor (public, no parameters)
    #[must_use]
    pub fn constructor() -> Self {
        Self::new(MemberKind::Constructor, CONSTRUCTOR_NAME.to_string())
    }

    /// Start a field named `name` of type `ty` (public)
    #[must_use]
    pub fn field(name: &str, ty: &RuntimeTypeRc) -> Self {
        let mut builder = Self::new(MemberKind::Field, name.to_string());
        builder.value_type = Some(ty.into());
        builder
    }

    /// The kind of member being built
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Replace the modifiers (default: `public`)
    #[must_use]
    pub fn modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Append a parameter
    #[must_use]
    pub fn param(mut self, ty: &RuntimeTypeRc) -> Self {
        self.parameters.push(ty.into());
        self
    }

    /// Set the return type of a method
    #[must_use]
    pub fn returns(mut self, ty: &RuntimeTypeRc) -> Self {
        self.value_type = Some(ty.into());
        self
    }

    /// Set the implementation of a method or constructor
    #[must_use]
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(Option<&InstanceRc>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    /// Initial value of a static field (default: the zero value of the field type)
    #[must_use]
    pub fn initial_value(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    pub(crate) fn build(self, token: Token, declaring: &RuntimeTypeRc) -> Result<Member> {
        match self.kind {
            MemberKind::Field => {
                if !self.parameters.is_empty() || self.body.is_some() {
                    return Err(type_error!(
                        "Field {}.{} can not have parameters or a body",
                        declaring.name,
                        self.name
                    ));
                }
            }
            MemberKind::Constructor => {
                if self.modifiers.contains(Modifiers::STATIC) || self.value_type.is_some() {
                    return Err(type_error!(
                        "Constructor of {} can not be static or return a value",
                        declaring.name
                    ));
                }
            }
            MemberKind::Method => {
                if self.initial.is_some() {
                    return Err(type_error!(
                        "Method {}.{} can not have an initial value",
                        declaring.name,
                        self.name
                    ));
                }
            }
        }
        if declaring.is_primitive() {
            return Err(type_error!(
                "Primitive {} can not declare members",
                declaring.name
            ));
        }

        let initial = match (self.initial, &self.value_type) {
            (Some(value), _) => value,
            (None, Some(ty)) if self.kind == MemberKind::Field => {
                let field_type = ty.resolve()?;
                Value::default_for(field_type.as_ref())
            }
            (None, _) => Value::Null,
        };

        Ok(Member {
            token,
            kind: self.kind,
            name: self.name,
            modifiers: self.modifiers,
            declaring: declaring.into(),
            parameters: self.parameters,
            value_type: self.value_type,
            accessible: AtomicBool::new(false),
            body: self.body,
            static_value: RwLock::new(initial),
        })
    }
}
