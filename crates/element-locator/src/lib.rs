//! Self-healing element resolution.
//!
//! A requested target (selector or description) expands into an
//! ordered list of candidate handles, from the literal selector down
//! to an OCR-located pixel coordinate. Failure to resolve is a
//! step-level condition for the caller, never a fault here.

pub mod resolver;
pub mod strategies;
pub mod types;

pub use resolver::ElementResolver;
pub use types::{ResolutionAttempt, ResolveStrategy};
