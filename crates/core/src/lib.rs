//! # CloudCraft Core
//!
//! Domain types, service traits, and error definitions for the CloudCraft
//! agent backend. This crate has **no SDK or framework dependencies**; it
//! defines the model that every other crate implements against.
//!
//! ## Layout
//!
//! - [`action`]: the closed set of provisioning actions and their parsing
//!   from the agent platform's untyped event
//! - [`envelope`]: the function-call response shape the platform expects
//! - [`cloud`]: traits over the managed services (object storage, functions,
//!   identity, agent hosting)
//! - [`upload`]: the continue-on-error upload fold used by the relay
//!
//! Implementations of the [`cloud`] traits live in `cloudcraft-aws`; tests
//! across the workspace substitute in-memory mocks.

pub mod action;
pub mod cloud;
pub mod envelope;
pub mod error;
pub mod upload;

// Re-export key types at crate root for ergonomics
pub use action::{Action, ActionKind, ActionOutcome, ActionParameter, ActionRequest};
pub use cloud::{AgentCatalog, AgentRuntime, FunctionService, IdentityService, ObjectStore};
pub use envelope::ResponseEnvelope;
pub use error::{ActionError, CloudError};
pub use upload::{UploadBatch, UploadFile, UploadReport};
