//! Privacy shield.
//!
//! Every screenshot passes through here before it reaches an oracle,
//! the caller, or storage. Sensitive text regions found by OCR are
//! blurred in the image; sensitive values are masked before they are
//! persisted.

pub mod errors;
pub mod mask;
pub mod patterns;
pub mod redactor;
pub mod regions;

pub use errors::ShieldError;
pub use mask::{mask_for_storage, sanitize_text, FieldType};
pub use patterns::is_sensitive_field;
pub use redactor::{RedactionMode, Redactor};
pub use regions::Region;
