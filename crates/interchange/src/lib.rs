//! homeval-interchange: wire types for the estimation service.
//!
//! Provides typed structs for the two endpoints the client consumes
//! (`POST /predict` and `GET /history`) and decoding entry points that
//! turn raw response bodies into those structs:
//!
//! - [`decode_receipt`] -- body of a successful `POST /predict`
//! - [`decode_history`] -- body of a successful `GET /history`
//!
//! Every other crate in the workspace shares these types, so the JSON
//! field names (`squareFootage`, `predictedPrice`, ...) live in exactly
//! one place.

pub mod deserialize;
pub mod types;

pub use deserialize::{decode_history, decode_receipt, InterchangeError};
pub use types::*;
