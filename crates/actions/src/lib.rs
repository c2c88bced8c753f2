//! Provisioning actions for CloudCraft.
//!
//! The hosted agent calls one action per function invocation. This crate
//! turns that invocation into exactly one remote provisioning call:
//!
//! - [`handlers`]: the five action handlers, one remote call each
//! - [`Dispatcher`]: typed routing from [`Action`](cloudcraft_core::Action)
//!   to handler, plus the untyped platform adapter
//! - [`schema`]: the action schema registered with the agent platform
//! - [`placeholder`]: the embedded "hello world" function package

pub mod dispatcher;
pub mod handlers;
pub mod placeholder;
pub mod schema;

#[cfg(test)]
mod test_helpers;

pub use dispatcher::Dispatcher;
pub use schema::action_schema;
