// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request validation for `POST /api/v1/users`

use serde_json::Value;

use crate::api::errors::ApiError;

pub const QUERY_FIELD_NAME: &str = "query";
pub const OBJECT_FIELD_NAME: &str = "object";

pub const MISSING_QUERY: &str = "Query parameter 'query' is required";
pub const MISSING_OBJECT: &str = "Field 'object' not found in the query";
pub const OBJECT_NOT_STRING: &str = "Field 'object' is not a string";
pub const OBJECT_WHITE_SPACE: &str = "Field 'object' is white space";
pub const INVALID_JSON: &str = "Request body must be valid JSON";

/// A validated detection query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionQuery {
    /// Trimmed, non-empty object label
    pub object: String,
}

impl DetectionQuery {
    /// Validate a request body of the form `{"query": {"object": "<label>"}}`
    ///
    /// Checks run in order and the first failure wins.
    pub fn from_body(body: &Value) -> Result<Self, ApiError> {
        let query = body
            .as_object()
            .and_then(|map| map.get(QUERY_FIELD_NAME))
            .ok_or_else(|| ApiError::ValidationError(MISSING_QUERY.to_string()))?;

        let object = query
            .as_object()
            .and_then(|map| map.get(OBJECT_FIELD_NAME))
            .filter(|value| is_truthy(value))
            .ok_or_else(|| ApiError::ValidationError(MISSING_OBJECT.to_string()))?;

        if is_blank(object)? {
            return Err(ApiError::ValidationError(OBJECT_WHITE_SPACE.to_string()));
        }

        // is_blank accepted it, so it is a string
        let object = object.as_str().unwrap_or_default().trim().to_string();
        Ok(Self { object })
    }
}

/// Whether `value` is a string made only of whitespace
///
/// Non-string values are rejected.
pub fn is_blank(value: &Value) -> Result<bool, ApiError> {
    match value {
        Value::String(s) => Ok(s.trim().is_empty()),
        _ => Err(ApiError::ValidationError(OBJECT_NOT_STRING.to_string())),
    }
}

/// JSON truthiness: null, false, 0, "", [] and {} are falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
