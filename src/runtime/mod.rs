//! Runtime objects and reflective invocation.
//!
//! The model types in [`crate::metadata`] describe what a program declares; this module holds
//! what it works with while running: [`Value`]s, heap [`Instance`]s and the [`Invoker`] that
//! calls resolved members on them.

mod invoke;
mod object;
mod value;

pub use invoke::Invoker;
pub use object::{Instance, InstanceRc};
pub use value::{Value, STRING_TYPE};
