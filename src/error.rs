// Copyright 2018 Dmitry Tantsur <divius.inside@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error and Result implementations.
//!
//! Errors are reported using the error type of the session layer. This module adds
//! parsing of error bodies that the session layer does not recognize.

use std::fmt;

use osauth::services::ServiceType;
use osauth::ServiceRequestBuilder;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use osauth::{Error, ErrorKind};

/// Result of an OpenStack call.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Error of kind InvalidResponse for a malformed body.
pub(crate) fn invalid_response<D: fmt::Display>(details: D) -> Error {
    Error::new(
        ErrorKind::InvalidResponse,
        format!("Malformed response: {}", details),
    )
}

fn message_from_value(value: &Value, recursive: bool) -> Option<String> {
    let obj = value.as_object()?;
    for key in ["message", "faultstring"] {
        if let Some(msg) = obj.get(key).and_then(Value::as_str) {
            return Some(msg.to_string());
        }
    }

    if recursive {
        // Legacy Ironic format: JSON inside JSON.
        if let Some(inner) = obj.get("error_message") {
            let parsed = match inner {
                Value::String(s) => serde_json::from_str(s).ok(),
                other => Some(other.clone()),
            };
            if let Some(msg) = parsed.and_then(|v| message_from_value(&v, false)) {
                return Some(msg);
            }
        }

        if let Some(msg) = obj
            .values()
            .filter(|v| v.is_object())
            .find_map(|v| message_from_value(v, false))
        {
            return Some(msg);
        }
    }

    obj.get("title").and_then(Value::as_str).map(String::from)
}

fn extract_message(text: String) -> String {
    serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| message_from_value(&body, true))
        .unwrap_or(text)
}

/// Check for OpenStack errors in the response.
///
/// Unlike the session layer, understands Heat error bodies where the message is
/// nested next to other top-level fields.
pub(crate) async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let message = extract_message(response.text().await?);
        trace!("HTTP request returned {}; error: {}", status, message);
        Err(Error::new(status.into(), message).with_status(status))
    } else {
        trace!(
            "HTTP request to {} returned {}",
            response.url(),
            response.status()
        );
        Ok(response)
    }
}

/// Send the request and check the response with [check](fn.check.html).
pub(crate) async fn send_checked<S>(request: ServiceRequestBuilder<S>) -> Result<Response>
where
    S: ServiceType + Send,
{
    check(request.send_unchecked().await?).await
}

/// Send the request, check the response and receive JSON.
pub(crate) async fn fetch_checked<S, T>(request: ServiceRequestBuilder<S>) -> Result<T>
where
    S: ServiceType + Send,
    T: DeserializeOwned + Send,
{
    send_checked(request)
        .await?
        .json::<T>()
        .await
        .map_err(Error::from)
}

#[cfg(test)]
mod test {
    use reqwest::StatusCode;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{check, extract_message, invalid_response};
    use crate::ErrorKind;

    #[test]
    fn test_plain() {
        let msg = "<html><body>I failed</body></html>";
        let result = extract_message(msg.to_string());
        assert_eq!(result, msg);
    }

    #[test]
    fn test_simple_message() {
        let msg = r#"{"message": "I failed"}"#;
        let result = extract_message(msg.to_string());
        assert_eq!(result, "I failed");
    }

    #[test]
    fn test_nested_message() {
        let msg = r#"{"SomethingFailed": {"message": "I failed"}}"#;
        let result = extract_message(msg.to_string());
        assert_eq!(result, "I failed");
    }

    #[test]
    fn test_heat_message() {
        let msg = r#"{"code": 400, "title": "Bad Request", "error": {"message": "I failed", "type": "StackValidationFailed"}}"#;
        let result = extract_message(msg.to_string());
        assert_eq!(result, "I failed");
    }

    #[test]
    fn test_octavia_message() {
        let msg = r#"{"faultcode": "Client", "faultstring": "I failed", "debuginfo": null}"#;
        let result = extract_message(msg.to_string());
        assert_eq!(result, "I failed");
    }

    #[test]
    fn test_ironic_legacy() {
        let msg = r#"{"error_message": "{\"faultstring\": \"I failed\"}"}"#;
        let result = extract_message(msg.to_string());
        assert_eq!(result, "I failed");
    }

    #[test]
    fn test_invalid_response() {
        let err = invalid_response("no items");
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        assert!(err.to_string().contains("Malformed response: no items"));
    }

    #[tokio::test]
    async fn test_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fail"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "code": 409,
                "title": "Conflict",
                "explanation": "There was a conflict when trying to complete your request.",
                "error": {"message": "Stack in progress", "type": "ActionInProgress"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/fail", server.uri()))
            .send()
            .await
            .unwrap();
        let err = check(response).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("Stack in progress"));

        let response = client
            .get(format!("{}/ok", server.uri()))
            .send()
            .await
            .unwrap();
        assert_eq!(
            check(response).await.unwrap().status(),
            StatusCode::NO_CONTENT
        );
    }
}
