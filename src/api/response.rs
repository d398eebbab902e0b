// API response writer module

use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Method, Response, StatusCode};
use serde::Serialize;

use super::error::CODE_NOT_IMPLEMENTED;
use super::{ApiError, Envelope};

/// Response type produced for every request
pub type ApiResponse = Response<Full<Bytes>>;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Last-resort body, written without going through the serializer
pub const INTERNAL_ERROR_BODY: &str = r#"{"error_code":2,"error_message":"Internal server error"}"#;

/// Write an envelope returned by a capability.
///
/// The status line comes from the envelope (200 unless the resource set
/// another). A serialization failure is answered with the static
/// internal-error body.
pub fn success_response(envelope: &Envelope) -> ApiResponse {
    encode(envelope.status, envelope)
}

/// Write an error envelope with the given status, code and message
pub fn error_response(status: StatusCode, error_code: u32, message: &str) -> ApiResponse {
    encode(status, &Envelope::error(status, error_code, message))
}

pub fn api_error_response(err: &ApiError) -> ApiResponse {
    encode(err.status(), &err.to_envelope())
}

/// 404 for paths no endpoint was registered under
pub fn not_found() -> ApiResponse {
    error_response(StatusCode::NOT_FOUND, 0, "Not Found")
}

/// 405 for a path registered only under other methods
pub fn method_not_allowed(allowed: &[Method]) -> ApiResponse {
    let mut response = error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        CODE_NOT_IMPLEMENTED,
        super::error::NOT_IMPLEMENTED_MESSAGE,
    );
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match HeaderValue::from_str(&allow) {
        Ok(value) => {
            response.headers_mut().insert(ALLOW, value);
        }
        Err(e) => logger::log_error(&format!("Invalid Allow header '{allow}': {e}")),
    }
    response
}

/// Serialize `body` as the JSON response for `status`
pub(crate) fn encode<T: Serialize>(status: StatusCode, body: &T) -> ApiResponse {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return internal_error_response();
        }
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build {status} response: {e}"));
            internal_error_response()
        })
}

/// 500 with the precomputed body; cannot fail
pub fn internal_error_response() -> ApiResponse {
    let mut response = Response::new(Full::new(Bytes::from_static(
        INTERNAL_ERROR_BODY.as_bytes(),
    )));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    async fn body_text(response: ApiResponse) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_success_response_writes_json_200() {
        let response = success_response(&Envelope::ok(json!({ "id": "42" })));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(body_text(response).await, r#"{"data":{"id":"42"}}"#);
    }

    #[tokio::test]
    async fn test_success_response_uses_envelope_status() {
        let envelope = Envelope::error(StatusCode::NOT_FOUND, 7, "no widget 9");
        let response = success_response(&envelope);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let value: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(value, json!({ "error_code": 7, "error_message": "no widget 9" }));
    }

    #[tokio::test]
    async fn test_serialization_failure_uses_static_body() {
        let response = encode(StatusCode::OK, &Unserializable);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(body_text(response).await, INTERNAL_ERROR_BODY);
    }

    #[test]
    fn test_static_body_is_an_internal_error_envelope() {
        let value: Value = serde_json::from_str(INTERNAL_ERROR_BODY).unwrap();
        assert_eq!(value["error_code"], json!(2));
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let response = api_error_response(&ApiError::BadRequest("EOF while parsing".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(value, json!({ "error_code": 3, "error_message": "EOF while parsing" }));
    }

    #[tokio::test]
    async fn test_not_found_omits_error_code() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, r#"{"error_message":"Not Found"}"#);
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let response = method_not_allowed(&[Method::GET, Method::POST]);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, POST");
    }
}
