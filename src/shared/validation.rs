//! Validation Utilities
//!
//! The [`Schema`] trait is the opaque payload check consumed by the
//! validation interceptor. Two implementations ship with the crate:
//!
//! - [`JsonSchema`]: a compiled JSON Schema document
//! - [`TypedSchema`]: deserialization into a `validator::Validate` struct
//!
//! Either way only the first violation reaches the client.

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationErrors};

use super::error::AppError;

/// First violation reported by a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Offending field, when the schema library reports one
    pub field: Option<String>,
    pub message: String,
}

impl SchemaViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl From<SchemaViolation> for AppError {
    fn from(violation: SchemaViolation) -> Self {
        AppError::Validation(violation.message)
    }
}

/// Description of the required shape of a request payload
#[async_trait]
pub trait Schema: Send + Sync {
    /// Check `payload`, returning the first violation on failure.
    async fn validate(&self, payload: &Value) -> Result<(), SchemaViolation>;
}

/// Compiled JSON Schema document
pub struct JsonSchema {
    validator: jsonschema::Validator,
}

impl JsonSchema {
    /// Compile a schema document.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the document is not a valid schema.
    pub fn compile(schema: &Value) -> Result<Self, AppError> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| AppError::Internal(format!("Invalid JSON schema: {}", e)))?;
        Ok(Self { validator })
    }
}

impl fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema").finish_non_exhaustive()
    }
}

#[async_trait]
impl Schema for JsonSchema {
    async fn validate(&self, payload: &Value) -> Result<(), SchemaViolation> {
        match self.validator.iter_errors(payload).next() {
            Some(first) => Err(SchemaViolation::new(first.to_string())),
            None => Ok(()),
        }
    }
}

/// Schema backed by a typed request struct
pub struct TypedSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Schema for TypedSchema<T>
where
    T: DeserializeOwned + Validate,
{
    async fn validate(&self, payload: &Value) -> Result<(), SchemaViolation> {
        let typed = T::deserialize(payload).map_err(|e| SchemaViolation::new(e.to_string()))?;
        typed.validate().map_err(|e| first_violation(&e))
    }
}

/// Pick the first field violation out of `validator` errors.
///
/// Fields are visited in name order so the choice is stable.
pub fn first_violation(errors: &ValidationErrors) -> SchemaViolation {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid ({})", field, e.code));
                SchemaViolation::for_field(field.to_string(), message)
            })
        })
        .unwrap_or_else(|| SchemaViolation::new("Validation failed"))
}

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    first_violation(&errors).into()
}
