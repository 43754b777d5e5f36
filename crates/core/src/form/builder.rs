use crate::form::fields::{
    EnterpriseSize, FieldDefinition, FieldKey, NumericKind, UnknownField, FIELDS,
    FORM_INPUT_COUNT, SIZE_FIELD_LABEL,
};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Unvalidated text entered by the operator, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawForm {
    values: BTreeMap<FieldKey, String>,
}

impl RawForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) -> &mut Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn with(mut self, key: FieldKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a value addressed by stable key or business label.
    pub fn set_labeled(&mut self, key: &str, value: impl Into<String>) -> Result<(), UnknownField> {
        let key = key.parse::<FieldKey>()?;
        self.set(key, value);
        Ok(())
    }

    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }
}

impl<V: Into<String>> FromIterator<(FieldKey, V)> for RawForm {
    fn from_iter<I: IntoIterator<Item = (FieldKey, V)>>(iter: I) -> Self {
        let mut form = RawForm::new();
        for (key, value) in iter {
            form.set(key, value);
        }
        form
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
}

impl FieldValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FieldValue::Float(v) => v,
            FieldValue::Integer(v) => v as f64,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            FieldValue::Float(v) => serializer.serialize_f64(v),
            FieldValue::Integer(v) => serializer.serialize_i64(v),
        }
    }
}

/// Which form input a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Numeric(FieldKey),
    Size,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Numeric(key) => key.definition().label,
            FormField::Size => SIZE_FIELD_LABEL,
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            FormField::Numeric(key) => key.definition().display_label,
            FormField::Size => "Enterprise Size",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: FormField },
    #[error("{field} must be a number (got {value:?})")]
    NotANumber { field: FormField, value: String },
    #[error("{field} must be a whole number (got {value:?})")]
    NotWholeNumber { field: FormField, value: String },
    #[error("{field} must be a finite number (got {value:?})")]
    NotFinite { field: FormField, value: String },
    #[error("{field} is out of range (got {value:?})")]
    OutOfRange { field: FormField, value: String },
    #[error("Enterprise Size must be Small, Medium or Large (got {value:?})")]
    UnknownSize { value: String },
}

impl ValidationError {
    pub fn field(&self) -> FormField {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotANumber { field, .. }
            | ValidationError::NotWholeNumber { field, .. }
            | ValidationError::NotFinite { field, .. }
            | ValidationError::OutOfRange { field, .. } => *field,
            ValidationError::UnknownSize { .. } => FormField::Size,
        }
    }
}

/// A complete, typed prediction request. Only [`build_request`] creates one,
/// so every catalog field is present with a finite value.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    values: BTreeMap<FieldKey, FieldValue>,
    size: EnterpriseSize,
}

impl PredictionRequest {
    pub fn get(&self, key: FieldKey) -> Option<FieldValue> {
        self.values.get(&key).copied()
    }

    pub fn size(&self) -> EnterpriseSize {
        self.size
    }
}

impl Serialize for PredictionRequest {
    /// The prediction service keys its input by the business labels.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FORM_INPUT_COUNT))?;
        for def in FIELDS.iter() {
            if let Some(value) = self.values.get(&def.key) {
                map.serialize_entry(def.label, value)?;
            }
        }
        map.serialize_entry(SIZE_FIELD_LABEL, self.size.as_str())?;
        map.end()
    }
}

/// Validate every field of the raw form in catalog order, then the size.
/// Returns all problems at once; a request exists only when there are none.
pub fn build_request(
    raw: &RawForm,
    size_category: &str,
) -> Result<PredictionRequest, Vec<ValidationError>> {
    let mut values = BTreeMap::new();
    let mut errors = Vec::new();

    for def in FIELDS.iter() {
        match coerce(def, raw.get(def.key)) {
            Ok(value) => {
                values.insert(def.key, value);
            }
            Err(err) => errors.push(err),
        }
    }

    let size = match parse_size(size_category) {
        Ok(size) => Some(size),
        Err(err) => {
            errors.push(err);
            None
        }
    };

    match size {
        Some(size) if errors.is_empty() => Ok(PredictionRequest { values, size }),
        _ => Err(errors),
    }
}

fn coerce(def: &FieldDefinition, raw: Option<&str>) -> Result<FieldValue, ValidationError> {
    let field = FormField::Numeric(def.key);
    let text = raw.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(ValidationError::Missing { field });
    }

    match def.kind {
        NumericKind::Float => match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(FieldValue::Float(v)),
            Ok(_) => Err(ValidationError::NotFinite {
                field,
                value: text.to_string(),
            }),
            Err(_) => Err(ValidationError::NotANumber {
                field,
                value: text.to_string(),
            }),
        },
        NumericKind::Integer => {
            if let Ok(v) = text.parse::<i64>() {
                return Ok(FieldValue::Integer(v));
            }
            let value = text.to_string();
            match text.parse::<f64>() {
                Ok(v) if !v.is_finite() => Err(ValidationError::NotFinite { field, value }),
                Ok(v) if v.fract() != 0.0 => Err(ValidationError::NotWholeNumber { field, value }),
                // i64::MAX as f64 rounds up to 2^63, which is already out of range.
                Ok(v) if v < i64::MIN as f64 || v >= i64::MAX as f64 => {
                    Err(ValidationError::OutOfRange { field, value })
                }
                Ok(v) => Ok(FieldValue::Integer(v as i64)),
                Err(_) => Err(ValidationError::NotANumber { field, value }),
            }
        }
    }
}

fn parse_size(raw: &str) -> Result<EnterpriseSize, ValidationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationError::Missing {
            field: FormField::Size,
        });
    }
    text.parse::<EnterpriseSize>()
        .map_err(|()| ValidationError::UnknownSize {
            value: text.to_string(),
        })
}
