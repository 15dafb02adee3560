use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! type_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::TypeError($msg.to_string())
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::TypeError(format!($fmt, $($arg)*))
    };
}

pub(crate) use type_error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Lookup Errors
/// - [`Error::TypeNotFound`] - A qualified type name could not be loaded
/// - [`Error::NoSuchMember`] - A single declared-member lookup on one type failed
/// - [`Error::MemberNotFound`] - Every scope of a resolution was exhausted
/// - [`Error::InvalidQuery`] - The resolution request itself was malformed
///
/// ## Invocation Errors
/// - [`Error::Invocation`] - A reflective call failed, wrapping the cause
/// - [`Error::IllegalArgument`] - Argument count or types do not fit the member
/// - [`Error::IllegalAccess`] - The member is not visible and was not made accessible
/// - [`Error::MissingReceiver`] - An instance member was called without a usable receiver
/// - [`Error::Thrown`] - The member body itself raised an error
///
/// ## Model Errors
/// - [`Error::TypeError`] - Inconsistent type model
/// - [`Error::TypeDropped`] - A weak type reference outlived its type
/// - [`Error::LockError`] - Thread synchronization failure
/// - [`Error::HookError`] - Misuse of the hook bridge
///
/// # Examples
///
/// ```rust
/// use reflectscope::{Error, TypeRegistry};
///
/// let registry = TypeRegistry::new()?;
/// match registry.find_type("com.example.Missing", None) {
///     Err(Error::TypeNotFound(name)) => assert_eq!(name, "com.example.Missing"),
///     other => panic!("unexpected {:?}", other.map(|t| t.name.clone())),
/// }
/// # Ok::<(), reflectscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The requested type could not be found by name.
    ///
    /// Neither the registry nor any of the consulted loaders knows the qualified name.
    #[error("Type not found - {0}")]
    TypeNotFound(String),

    /// A declared member with this exact signature does not exist on a single type.
    ///
    /// This is the error produced by one native lookup; the resolver keeps the first one it
    /// encounters as the cause of [`Error::MemberNotFound`].
    #[error("No such member - {signature}")]
    NoSuchMember {
        /// Human readable signature of the lookup, e.g. `com.example.A.f(int)`
        signature: String,
    },

    /// Member resolution exhausted every scope without a match.
    #[error("Could not find member {signature}")]
    MemberNotFound {
        /// Human readable signature of the failed resolution
        signature: String,
        /// The first (innermost) lookup failure
        #[source]
        source: Box<Error>,
    },

    /// The resolution request is malformed, e.g. a method lookup without a name.
    #[error("Invalid query - {0}")]
    InvalidQuery(String),

    /// A reflective invocation, field read or field write failed.
    #[error("Failed to invoke {member}")]
    Invocation {
        /// Display form of the member that was invoked
        member: String,
        /// The underlying cause
        #[source]
        source: Box<Error>,
    },

    /// The arguments do not match the parameter list of the invoked member.
    #[error("Illegal argument - {0}")]
    IllegalArgument(String),

    /// The member is not public and has not been made accessible.
    #[error("Illegal access - {0}")]
    IllegalAccess(String),

    /// An instance member was used without a receiver of the declaring type.
    #[error("Missing receiver - {0}")]
    MissingReceiver(String),

    /// An error raised from inside a member body or a hook.
    #[error("Thrown - {0}")]
    Thrown(String),

    /// General error during type model operations.
    #[error("{0}")]
    TypeError(String),

    /// A weak reference was followed after the referenced type was dropped.
    #[error("Type reference {0} is no longer valid")]
    TypeDropped(Token),

    /// Failed to lock target.
    ///
    /// This error occurs when a poisoned lock is encountered while reading or writing shared
    /// state.
    #[error("Failed to lock target")]
    LockError,

    /// Invalid use of the hook bridge.
    #[error("Hook error - {0}")]
    HookError(String),
}

impl Error {
    /// Walks the `source` chain and returns the innermost error.
    ///
    /// For [`Error::MemberNotFound`] this is the first native lookup failure, for
    /// [`Error::Invocation`] the actual cause of the failed call.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::MemberNotFound { source, .. } | Error::Invocation { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}
