use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A user-editable attribute of the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    SquareFootage,
    Bedrooms,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::SquareFootage, Field::Bedrooms];

    /// Wire name of the field (`squareFootage`, `bedrooms`).
    pub fn name(self) -> &'static str {
        match self {
            Field::SquareFootage => "squareFootage",
            Field::Bedrooms => "bedrooms",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The two attributes collected by the form.
///
/// Zero means "unset"; an unset field never passes validation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInput {
    pub square_footage: f64,
    pub bedrooms: u32,
}

impl PropertyInput {
    pub fn new(square_footage: f64, bedrooms: u32) -> Self {
        Self {
            square_footage,
            bedrooms,
        }
    }
}

/// Field-level messages produced by one validation pass.
///
/// A field is present only when it is invalid. An empty map means the
/// input is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate in field order (`squareFootage` before `bedrooms`).
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_input_is_unset() {
        let input = PropertyInput::default();
        assert_eq!(input.square_footage, 0.0);
        assert_eq!(input.bedrooms, 0);
    }

    #[test]
    fn field_errors_serialize_as_wire_keyed_map() {
        let mut errors = FieldErrors::new();
        errors.insert(Field::Bedrooms, "Must have at least 1 bedroom");
        errors.insert(Field::SquareFootage, "Square footage must be at least 100");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "squareFootage": "Square footage must be at least 100",
                "bedrooms": "Must have at least 1 bedroom",
            })
        );
    }

    #[test]
    fn field_errors_iterate_in_field_order() {
        let mut errors = FieldErrors::new();
        errors.insert(Field::Bedrooms, "b");
        errors.insert(Field::SquareFootage, "s");
        let fields: Vec<Field> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, Field::ALL.to_vec());
    }
}
