//! Stratus declaration core
//!
//! Typed declaration model for a static-site edge stack: a private object
//! storage bucket, an origin access identity, a CDN distribution fronting
//! the bucket, and an asset deployment step. A stack is declared once, in
//! code, and rendered into a deterministic JSON document that a cloud
//! provider implementation can plan and apply.
//!
//! ```text
//! website_stack() ──► Stack ──► synth::render() ──► declaration JSON
//!                       │
//!                       └────► StackProvider (stratus-cloud) plan/apply
//! ```

pub mod error;
pub mod model;
pub mod stack;
pub mod synth;
pub mod website;

// Re-exports
pub use error::{CoreError, Result};
pub use stack::{Output, Resource, ResourceKind, ResourceSpec, Stack};
pub use website::website_stack;
