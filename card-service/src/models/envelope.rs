use serde::Serialize;
use serde_json::Value;

/// Uniform wrapper for every `/extract-card` reply.
///
/// Fields are private and the two constructors are the only way to build
/// one, so `success == true` always comes with `data` and never with
/// `error`, and vice versa.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ResponseEnvelope {
    pub fn success(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}
