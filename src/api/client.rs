use serde_json::Value;

use super::error::HttpError;

/// Capability for talking to the streaming service's REST API.
///
/// Paths are relative to the service base URL (`tracks/trending?limit=6`,
/// `albums/{id}/tracks`, ...). Implementations attach auth headers and map
/// transport/status failures into [`HttpError`]; callers only ever see JSON
/// bodies.
pub trait ApiClient {
    fn get(&self, path: &str) -> Result<Value, HttpError>;
    fn post(&self, path: &str, body: &Value) -> Result<Value, HttpError>;
    fn put(&self, path: &str, body: &Value) -> Result<Value, HttpError>;
    fn delete(&self, path: &str) -> Result<Value, HttpError>;
}

impl<C: ApiClient + ?Sized> ApiClient for &C {
    fn get(&self, path: &str) -> Result<Value, HttpError> {
        (**self).get(path)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, HttpError> {
        (**self).post(path, body)
    }

    fn put(&self, path: &str, body: &Value) -> Result<Value, HttpError> {
        (**self).put(path, body)
    }

    fn delete(&self, path: &str) -> Result<Value, HttpError> {
        (**self).delete(path)
    }
}
