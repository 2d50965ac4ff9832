use std::collections::HashMap;
use serde::de::DeserializeOwned;
use crate::core::http::Request;
use crate::core::error::QuechoError;

/// Trait for extracting data from HTTP requests
pub trait FromRequest: Sized {
    fn from_request(req: &Request) -> Result<Self, QuechoError>;
}

/// Extract query parameters. Values are always handed to serde as strings.
#[derive(Debug)]
pub struct Query<T>(pub T);

impl<T> FromRequest for Query<T>
where
    T: DeserializeOwned,
{
    fn from_request(req: &Request) -> Result<Self, QuechoError> {
        from_string_map(&req.query_params)
            .map(Query)
            .map_err(|e| QuechoError::bad_request(format!("Failed to extract query params: {}", e)))
    }
}

fn from_string_map<T: DeserializeOwned>(params: &HashMap<String, String>) -> Result<T, serde_json::Error> {
    let object = params
        .iter()
        .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
        .collect();
    serde_json::from_value(serde_json::Value::Object(object))
}
