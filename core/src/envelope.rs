//! The `{success, message, data}` envelope and the one function that turns an
//! `HttpResponse` into either an envelope or an `ApiError`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, MSG_FORMAT_MISMATCH};
use crate::http::HttpResponse;

/// Uniform wrapper returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl Envelope<Value> {
    /// Deserialize the required `data` payload.
    ///
    /// Missing or `null` data is a `FormatMismatch`, as is data of the wrong
    /// shape.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let data = self
            .data
            .ok_or_else(|| ApiError::FormatMismatch(MSG_FORMAT_MISMATCH.to_string()))?;
        serde_json::from_value(data)
            .map_err(|e| ApiError::FormatMismatch(format!("{MSG_FORMAT_MISMATCH} ({e})")))
    }
}

/// Interpret a raw response.
///
/// Non-2xx statuses map through `ApiError::from_status` using the body's
/// `message` when the body is a JSON object carrying one; an unparseable body
/// on an error status still yields the status error. On 2xx the body must be
/// JSON (`Parse` otherwise) with `success: true` (`FormatMismatch`
/// otherwise). `null` data is normalized to absent.
pub fn interpret_response(response: &HttpResponse) -> Result<Envelope, ApiError> {
    let parsed = serde_json::from_slice::<Value>(&response.body);

    if !response.is_success() {
        let message = parsed
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string));
        return Err(ApiError::from_status(response.status, message));
    }

    let body = parsed.map_err(|e| ApiError::Parse(e.to_string()))?;
    let Value::Object(mut fields) = body else {
        return Err(ApiError::FormatMismatch(MSG_FORMAT_MISMATCH.to_string()));
    };

    let message = fields
        .remove("message")
        .and_then(|m| m.as_str().map(str::to_string));
    if fields.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(ApiError::FormatMismatch(
            message.unwrap_or_else(|| MSG_FORMAT_MISMATCH.to_string()),
        ));
    }

    let data = fields.remove("data").filter(|d| !d.is_null());
    Ok(Envelope {
        success: true,
        message,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MSG_NOT_FOUND, MSG_SESSION_EXPIRED};

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn success_envelope_with_data() {
        let env = interpret_response(&response(200, r#"{"success":true,"message":"ok","data":[1,2]}"#)).unwrap();
        assert!(env.success);
        assert_eq!(env.message.as_deref(), Some("ok"));
        assert_eq!(env.data, Some(serde_json::json!([1, 2])));
    }

    #[test]
    fn success_false_on_2xx_is_format_mismatch() {
        let err = interpret_response(&response(200, r#"{"success":false,"message":"nope"}"#)).unwrap_err();
        assert_eq!(err, ApiError::FormatMismatch("nope".into()));
    }

    #[test]
    fn missing_success_flag_is_format_mismatch() {
        let err = interpret_response(&response(200, r#"{"data":{}}"#)).unwrap_err();
        assert!(matches!(err, ApiError::FormatMismatch(_)));

        let err = interpret_response(&response(201, "[]")).unwrap_err();
        assert!(matches!(err, ApiError::FormatMismatch(_)));
    }

    #[test]
    fn non_json_success_body_is_parse_error() {
        let err = interpret_response(&response(200, "<html>")).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn error_status_uses_server_message() {
        let err = interpret_response(&response(404, r#"{"success":false,"message":"Gym owner not found."}"#)).unwrap_err();
        assert_eq!(err, ApiError::NotFound("Gym owner not found.".into()));
    }

    #[test]
    fn error_status_with_unparseable_body_uses_fallback() {
        let err = interpret_response(&response(401, "Unauthorized")).unwrap_err();
        assert_eq!(err, ApiError::SessionExpired(MSG_SESSION_EXPIRED.into()));

        let err = interpret_response(&response(404, "")).unwrap_err();
        assert_eq!(err, ApiError::NotFound(MSG_NOT_FOUND.into()));
    }

    #[test]
    fn non_utf8_body_maps_status_first() {
        let raw = |status| HttpResponse {
            status,
            headers: Vec::new(),
            body: vec![0xff, 0xfe],
        };
        let err = interpret_response(&raw(401)).unwrap_err();
        assert_eq!(err, ApiError::SessionExpired(MSG_SESSION_EXPIRED.into()));

        let err = interpret_response(&raw(200)).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn null_data_is_absent() {
        let env = interpret_response(&response(200, r#"{"success":true,"data":null}"#)).unwrap();
        assert!(env.data.is_none());
        assert!(matches!(env.into_data::<Vec<u8>>(), Err(ApiError::FormatMismatch(_))));
    }

    #[test]
    fn into_data_rejects_wrong_shape() {
        let env = interpret_response(&response(200, r#"{"success":true,"data":"text"}"#)).unwrap();
        assert!(matches!(env.into_data::<Vec<u8>>(), Err(ApiError::FormatMismatch(_))));
    }
}
