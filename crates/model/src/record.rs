//! Conversion between value objects and loosely-typed JSON.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ModelError, Result};

/// A value object that can be parsed from and written back to a JSON map.
///
/// Implemented for every record in this crate. `from_value(to_value(x))`
/// yields a record equal to `x`.
pub trait JsonRecord: Serialize + DeserializeOwned {
    /// Builds the record from a decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DeserializationFailed`] if required fields are
    /// missing or have the wrong shape.
    fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(ModelError::DeserializationFailed)
    }

    /// Serializes the record into the JSON shape the API uses.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::SerializationFailed`] if serialization fails.
    fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(ModelError::SerializationFailed)
    }

    /// Builds a list of records from a JSON array.
    ///
    /// # Errors
    ///
    /// Fails if the value is not an array or any element is malformed.
    fn list_from_value(value: Value) -> Result<Vec<Self>> {
        serde_json::from_value(value).map_err(ModelError::DeserializationFailed)
    }
}
