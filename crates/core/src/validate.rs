//! Form validation: two-sided range checks on each field.
//!
//! Each field is checked low bound first, then high bound, so a field
//! carries at most one message per pass. The result always replaces the
//! caller's previous error map wholesale.

use crate::input::{Field, FieldErrors, PropertyInput};

pub const MIN_SQUARE_FOOTAGE: f64 = 100.0;
pub const MAX_SQUARE_FOOTAGE: f64 = 100_000.0;
pub const MIN_BEDROOMS: u32 = 1;
pub const MAX_BEDROOMS: u32 = 20;

/// Outcome of one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    pub errors: FieldErrors,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a property input against the form's bounds.
///
/// Bounds are inclusive: 100 and 100000 square feet, 1 and 20 bedrooms
/// are all accepted. A NaN square footage is reported as too small.
pub fn validate(input: &PropertyInput) -> Validation {
    let mut errors = FieldErrors::new();

    let sqft = input.square_footage;
    if sqft.is_nan() || sqft < MIN_SQUARE_FOOTAGE {
        errors.insert(
            Field::SquareFootage,
            format!("Square footage must be at least {}", MIN_SQUARE_FOOTAGE),
        );
    } else if sqft > MAX_SQUARE_FOOTAGE {
        errors.insert(
            Field::SquareFootage,
            format!("Square footage must be less than {}", MAX_SQUARE_FOOTAGE),
        );
    }

    if input.bedrooms < MIN_BEDROOMS {
        errors.insert(
            Field::Bedrooms,
            format!("Must have at least {} bedroom", MIN_BEDROOMS),
        );
    } else if input.bedrooms > MAX_BEDROOMS {
        errors.insert(
            Field::Bedrooms,
            format!("Must have less than {} bedrooms", MAX_BEDROOMS),
        );
    }

    Validation { errors }
}
