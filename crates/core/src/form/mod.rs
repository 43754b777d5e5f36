pub mod builder;
pub mod fields;

pub use builder::{build_request, FieldValue, FormField, PredictionRequest, RawForm, ValidationError};
pub use fields::{EnterpriseSize, FieldDefinition, FieldKey, NumericKind, FIELDS};
