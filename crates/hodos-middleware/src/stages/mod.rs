//! Built-in middleware stages.
//!
//! - [`validation`] - body and query schema checks placed in front of an action
//! - [`error_envelope`] - renders errors as `{success: false, ...}`
//! - [`success_envelope`] - wraps JSON bodies as `{success: true, ...}`

pub mod error_envelope;
pub mod success_envelope;
pub mod validation;

pub use error_envelope::{EnvelopeTransform, ErrorEnvelope};
pub use success_envelope::SuccessEnvelope;
pub use validation::{ValidateBody, ValidateQuery, BODY_REQUIRED_MESSAGE};
