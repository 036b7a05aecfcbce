//! Small helpers for pulling typed values out of the loosely-typed
//! attribute maps the reference service and bootstrap loader accept.

use serde_json::{Map, Value};
use std::str::FromStr;

use crate::domain::Code;
use crate::error::{CatalogError, Result};

/// A JSON object of attributes, as received from the HTTP layer.
pub type Attrs = Map<String, Value>;

/// Pull a required, non-empty, trimmed string field.
pub fn required_string(attrs: &Attrs, field: &str) -> Result<String> {
    let value = attrs
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| CatalogError::argument(format!("missing required field {field:?}")))?
        .trim();
    if value.is_empty() {
        return Err(CatalogError::argument(format!("field {field:?} must not be empty")));
    }
    Ok(value.to_string())
}

/// Pull an optional, trimmed string field.
pub fn optional_string(attrs: &Attrs, field: &str) -> Option<String> {
    attrs
        .get(field)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Pull a required field that names another entity's code.
pub fn required_code(attrs: &Attrs, field: &str) -> Result<Code> {
    let raw = attrs
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| CatalogError::argument(format!("missing required field {field:?}")))?;
    Code::from_str(raw)
        .map_err(|_| CatalogError::argument(format!("field {field:?} is not a valid code: {raw:?}")))
}

/// Pull an optional field that names another entity's code.
pub fn optional_code(attrs: &Attrs, field: &str) -> Result<Option<Code>> {
    match attrs.get(field).and_then(Value::as_str) {
        None => Ok(None),
        Some(raw) => Code::from_str(raw)
            .map(Some)
            .map_err(|_| CatalogError::argument(format!("field {field:?} is not a valid code: {raw:?}"))),
    }
}

/// Pull a required positive `u32`.
pub fn required_positive_u32(attrs: &Attrs, field: &str) -> Result<u32> {
    let value = attrs
        .get(field)
        .and_then(Value::as_u64)
        .ok_or_else(|| CatalogError::argument(format!("missing required field {field:?}")))?;
    let value = u32::try_from(value)
        .map_err(|_| CatalogError::argument(format!("field {field:?} is out of range")))?;
    if value == 0 {
        return Err(CatalogError::argument(format!("field {field:?} must be positive")));
    }
    Ok(value)
}
