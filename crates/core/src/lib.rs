//! homeval-core: property input model and validation rules.
//!
//! # Public API
//!
//! - [`PropertyInput`] -- the two attributes a user enters
//! - [`Field`] -- names one of those attributes
//! - [`FieldErrors`] -- field-level messages from one validation pass
//! - [`validate()`] -- the pure validation function
//!
//! Validation never touches the network and is deterministic, so callers
//! run it synchronously before any request is issued.

pub mod input;
pub mod validate;

pub use input::{Field, FieldErrors, PropertyInput};
pub use validate::{
    validate, Validation, MAX_BEDROOMS, MAX_SQUARE_FOOTAGE, MIN_BEDROOMS, MIN_SQUARE_FOOTAGE,
};
