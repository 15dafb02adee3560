//! Enclosing type and enclosing instance discovery.
//!
//! Nested types are not linked to their outer type in the model. The relation is recovered
//! from two compiler conventions, both captured by [`NestingConvention`]:
//!
//! - the binary name of a nested type is the outer type's name, a separator and the simple name
//!   (`com.example.Outer$Inner`)
//! - an inner (non-static) type stores its enclosing instance in a synthetic field (`this$0`)
//!
//! [`EnclosingWalker`] applies them. All lookups fail soft: a type without a separator, an
//! outer name that can not be loaded or an instance without the back-reference simply has no
//! enclosing type or instance.

use std::{collections::HashSet, sync::Arc};

use crate::{
    metadata::{
        member::MemberKind,
        reflection::Reflection,
        typesystem::{RuntimeType, RuntimeTypeRc, TypeSignature},
    },
    runtime::{Instance, InstanceRc, Value},
};

/// Naming conventions for nested types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestingConvention {
    /// Separator between outer and nested name in binary type names
    pub separator: char,
    /// Name of the synthetic field holding the enclosing instance
    pub outer_instance_field: String,
}

impl NestingConvention {
    /// The conventions of the JVM: `Outer$Inner` and `this$0`
    #[must_use]
    pub fn jvm() -> Self {
        NestingConvention {
            separator: '$',
            outer_instance_field: "this$0".to_string(),
        }
    }

    /// Binary name of a type nested in `outer`
    #[must_use]
    pub fn nested_name(&self, outer: &str, simple_name: &str) -> String {
        format!("{outer}{}{simple_name}", self.separator)
    }

    /// Binary name of the enclosing type, `None` for top-level names.
    ///
    /// A separator at the first position is not a nesting boundary.
    #[must_use]
    pub fn enclosing_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        match name.rfind(self.separator) {
            Some(pos) if pos > 0 => Some(&name[..pos]),
            _ => None,
        }
    }
}

impl Default for NestingConvention {
    fn default() -> Self {
        Self::jvm()
    }
}

/// Walks from nested types and instances to their enclosing ones.
#[derive(Clone)]
pub struct EnclosingWalker {
    reflection: Arc<dyn Reflection>,
    convention: NestingConvention,
}

impl EnclosingWalker {
    /// Create a walker using the default [`NestingConvention`]
    pub fn new(reflection: Arc<dyn Reflection>) -> Self {
        EnclosingWalker {
            reflection,
            convention: NestingConvention::default(),
        }
    }

    /// Replace the nesting convention
    #[must_use]
    pub fn with_convention(mut self, convention: NestingConvention) -> Self {
        self.convention = convention;
        self
    }

    /// The active nesting convention
    #[must_use]
    pub fn convention(&self) -> &NestingConvention {
        &self.convention
    }

    /// The type `ty` is nested in, if any
    pub fn enclosing_type(&self, ty: &RuntimeType) -> Option<RuntimeTypeRc> {
        let outer = self.convention.enclosing_name(&ty.name)?;
        match self.reflection.find_type(outer, None) {
            Ok(found) => Some(found),
            Err(error) => {
                log::trace!("No enclosing type for {}: {}", ty.name, error);
                None
            }
        }
    }

    /// The chain of enclosing types of `ty`, innermost first
    pub fn enclosing_types(&self, ty: &RuntimeType) -> Vec<RuntimeTypeRc> {
        let mut chain = Vec::new();
        let mut current = self.enclosing_type(ty);
        while let Some(outer) = current {
            current = self.enclosing_type(&outer);
            chain.push(outer);
        }
        chain
    }

    /// The enclosing instance stored in the back-reference field of `instance`, if any
    pub fn enclosing_instance(&self, instance: &Instance) -> Option<InstanceRc> {
        let field = self
            .reflection
            .declared_member(
                instance.runtime_type(),
                MemberKind::Field,
                Some(&self.convention.outer_instance_field),
                &TypeSignature::new(),
            )
            .ok()?;

        match instance.field_value(&field) {
            Ok(Value::Object(outer)) => Some(outer),
            _ => None,
        }
    }

    /// The receiver to use for a member declared on `declaring`.
    ///
    /// Returns `instance` if it already is a `declaring`, otherwise the innermost enclosing
    /// instance that is. If no enclosing instance qualifies, `instance` is returned unchanged
    /// and the caller's own checks decide.
    pub fn receiver_for(&self, declaring: &RuntimeType, instance: &InstanceRc) -> InstanceRc {
        let mut visited = HashSet::new();
        let mut current = Some(instance.clone());
        while let Some(candidate) = current {
            if !visited.insert(Arc::as_ptr(&candidate)) {
                break;
            }
            if candidate.is_instance_of(declaring, self.reflection.as_ref()) {
                return candidate;
            }
            current = self.enclosing_instance(&candidate);
        }

        instance.clone()
    }
}
