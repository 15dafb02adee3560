use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        reflection::Reflection,
        typesystem::{PrimitiveKind, RuntimeType, RuntimeTypeRc, TypeSignature},
    },
    runtime::InstanceRc,
    Result,
};

/// Qualified name of the runtime string type
pub const STRING_TYPE: &str = "java.lang.String";

/// A runtime value as passed to and returned from members.
///
/// Primitive variants are the boxed form of the value: their runtime type is the wrapper
/// type, exactly like arguments of a reflective call. The primitive they hold is only
/// relevant once they are converted for a primitive parameter.
#[derive(Clone, Default)]
pub enum Value {
    /// The null reference
    #[default]
    Null,
    /// `java.lang.Boolean`
    Boolean(bool),
    /// `java.lang.Byte`
    Byte(i8),
    /// `java.lang.Character`
    Char(char),
    /// `java.lang.Short`
    Short(i16),
    /// `java.lang.Integer`
    Int(i32),
    /// `java.lang.Long`
    Long(i64),
    /// `java.lang.Float`
    Float(f32),
    /// `java.lang.Double`
    Double(f64),
    /// `java.lang.String`
    String(Arc<str>),
    /// Any other object
    Object(InstanceRc),
}

impl Value {
    /// The zero value of a field or local of type `ty`
    #[must_use]
    pub fn default_for(ty: &RuntimeType) -> Value {
        match ty.primitive() {
            Some(PrimitiveKind::Boolean) => Value::Boolean(false),
            Some(PrimitiveKind::Byte) => Value::Byte(0),
            Some(PrimitiveKind::Char) => Value::Char('\0'),
            Some(PrimitiveKind::Short) => Value::Short(0),
            Some(PrimitiveKind::Int) => Value::Int(0),
            Some(PrimitiveKind::Long) => Value::Long(0),
            Some(PrimitiveKind::Float) => Value::Float(0.0),
            Some(PrimitiveKind::Double) => Value::Double(0.0),
            Some(PrimitiveKind::Void) | None => Value::Null,
        }
    }

    /// Returns true for [`Value::Null`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The primitive kind behind a boxed primitive value
    #[must_use]
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Value::Boolean(_) => Some(PrimitiveKind::Boolean),
            Value::Byte(_) => Some(PrimitiveKind::Byte),
            Value::Char(_) => Some(PrimitiveKind::Char),
            Value::Short(_) => Some(PrimitiveKind::Short),
            Value::Int(_) => Some(PrimitiveKind::Int),
            Value::Long(_) => Some(PrimitiveKind::Long),
            Value::Float(_) => Some(PrimitiveKind::Float),
            Value::Double(_) => Some(PrimitiveKind::Double),
            Value::Null | Value::String(_) | Value::Object(_) => None,
        }
    }

    /// The runtime type of this value, `None` for null.
    ///
    /// Primitive values report their wrapper type.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if the wrapper or string type is unknown to
    /// `reflection`.
    pub fn runtime_type(&self, reflection: &dyn Reflection) -> Result<Option<RuntimeTypeRc>> {
        match self {
            Value::Null => Ok(None),
            Value::String(_) => reflection.find_type(STRING_TYPE, None).map(Some),
            Value::Object(instance) => Ok(Some(instance.runtime_type().clone())),
            primitive => match primitive.primitive_kind() {
                Some(kind) => reflection.find_type(kind.wrapper_name(), None).map(Some),
                None => Ok(None),
            },
        }
    }

    /// The signature formed by the runtime types of `values`
    ///
    /// # Errors
    /// Returns an error if the runtime type of a value can not be determined.
    pub fn signature_of(reflection: &dyn Reflection, values: &[Value]) -> Result<TypeSignature> {
        let entries = values
            .iter()
            .map(|value| value.runtime_type(reflection))
            .collect::<Result<Vec<_>>>()?;
        Ok(TypeSignature::from_entries(entries))
    }

    /// Convert a boxed primitive to `target` by unboxing and widening.
    ///
    /// Returns `None` if this is not a primitive value or its kind does not widen to `target`.
    #[must_use]
    pub fn widen_to(&self, target: PrimitiveKind) -> Option<Value> {
        let source = self.primitive_kind()?;
        if !source.is_widenable_to(target) {
            return None;
        }
        if source == target {
            return Some(self.clone());
        }

        match target {
            PrimitiveKind::Short => self.as_long().map(|v| Value::Short(v as i16)),
            PrimitiveKind::Int => self.as_long().map(|v| Value::Int(v as i32)),
            PrimitiveKind::Long => self.as_long().map(Value::Long),
            PrimitiveKind::Float => self.as_double().map(|v| Value::Float(v as f32)),
            PrimitiveKind::Double => self.as_double().map(Value::Double),
            _ => None,
        }
    }

    /// Integral content of `byte`, `char`, `short`, `int` and `long` values
    #[must_use]
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Char(v) => Some(i64::from(u32::from(*v))),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric content of any numeric value
    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            other => other.as_long().map(|v| v as f64),
        }
    }

    /// Content of an `int` value
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Content of a `boolean` value
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Content of a string value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// The instance behind an object value
    #[must_use]
    pub fn as_object(&self) -> Option<&InstanceRc> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "(byte){v}"),
            Value::Char(v) => write!(f, "{v:?}"),
            Value::Short(v) => write!(f, "(short){v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}L"),
            Value::Float(v) => write!(f, "{v}f"),
            Value::Double(v) => write!(f, "{v}d"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Object(instance) => write!(f, "{instance:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<InstanceRc> for Value {
    fn from(value: InstanceRc) -> Self {
        Value::Object(value)
    }
}
