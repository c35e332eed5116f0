//! The `/ask` request/response exchange.
//!
//! The widget sends exactly one JSON request per user message and expects either
//! `{"response": "..."}` or `{"error": "..."}` back. [`AskClient`] is the seam the
//! controller is driven through; [`HttpAskClient`] is the real implementation
//! (reqwest, which uses `fetch` on wasm32).

use std::cell::RefCell;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::controller::{ChatController, PendingAsk};
use super::host::WidgetHost;

/// Route the widget posts to, relative to the page origin.
pub const ASK_ROUTE: &str = "/ask";

/// Request body for `POST /ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    /// The user's message, trimmed.
    pub message: String,
}

/// Response body from `POST /ask`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    /// Generated answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Application-level failure reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AskResponse {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            response: None,
            error: Some(message.into()),
        }
    }

    /// Interpret the body. A non-empty `error` wins over any `response`.
    pub fn into_result(self) -> Result<String, AskError> {
        match (self.response, self.error) {
            (_, Some(error)) if !error.is_empty() => Err(AskError::Backend(error)),
            (Some(response), _) => Ok(response),
            (None, _) => Err(AskError::MissingResponse),
        }
    }
}

/// Why an exchange failed. Every variant is shown to the user the same way.
#[derive(Error, Debug)]
pub enum AskError {
    /// The request never completed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The body was not valid JSON of the expected shape.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backend reported an error field.
    #[error("backend error: {0}")]
    Backend(String),

    /// Neither `response` nor `error` was present.
    #[error("response body had no answer")]
    MissingResponse,

    /// Endpoint URL could not be built.
    #[error("invalid endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Something that can answer a chat message.
///
/// Futures are not required to be `Send`: the widget runs on the browser's single
/// event loop.
#[async_trait(?Send)]
pub trait AskClient {
    async fn ask(&self, message: &str) -> Result<String, AskError>;
}

/// `POST /ask` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAskClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpAskClient {
    /// Client for the `/ask` route of the given origin (e.g. `http://localhost:3000`).
    pub fn new(origin: impl AsRef<str>) -> Result<Self, AskError> {
        Self::with_client(origin, reqwest::Client::new())
    }

    pub fn with_client(origin: impl AsRef<str>, http: reqwest::Client) -> Result<Self, AskError> {
        let endpoint = Url::parse(origin.as_ref())?.join(ASK_ROUTE)?;
        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl AskClient for HttpAskClient {
    async fn ask(&self, message: &str) -> Result<String, AskError> {
        let request = AskRequest {
            message: message.to_string(),
        };
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!(name: "widget.ask.received", bytes = body.len(), "Answer received");
        serde_json::from_str::<AskResponse>(&body)?.into_result()
    }
}

/// Run the network half of a send and hand the outcome back to the controller.
///
/// The controller is only borrowed before and after the request, never across
/// the await, so UI events keep flowing while the answer is pending.
pub async fn exchange<H, C>(controller: &RefCell<ChatController<H>>, client: &C, pending: PendingAsk)
where
    H: WidgetHost,
    C: AskClient + ?Sized,
{
    let outcome = client.ask(pending.message()).await;
    controller.borrow_mut().finish_send(pending, outcome);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(AskRequest {
            message: "hello".into(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "message": "hello" }));
    }

    #[test]
    fn test_response_with_answer() {
        let parsed: AskResponse = serde_json::from_str(r#"{"response":"hi"}"#).unwrap();
        assert_eq!(parsed.into_result().unwrap(), "hi");
    }

    #[test]
    fn test_response_with_error_field() {
        let parsed: AskResponse = serde_json::from_str(r#"{"error":"x"}"#).unwrap();
        assert!(matches!(parsed.into_result(), Err(AskError::Backend(e)) if e == "x"));
    }

    #[test]
    fn test_error_field_wins_over_response() {
        let parsed: AskResponse =
            serde_json::from_str(r#"{"response":"hi","error":"quota"}"#).unwrap();
        assert!(matches!(parsed.into_result(), Err(AskError::Backend(_))));
    }

    #[test]
    fn test_empty_error_field_is_ignored() {
        let parsed: AskResponse = serde_json::from_str(r#"{"response":"hi","error":""}"#).unwrap();
        assert_eq!(parsed.into_result().unwrap(), "hi");
    }

    #[test]
    fn test_empty_body_is_missing_response() {
        let parsed: AskResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(parsed.into_result(), Err(AskError::MissingResponse)));
    }

    #[test]
    fn test_endpoint_join() {
        let client = HttpAskClient::new("http://localhost:3000/some/page").unwrap();
        assert_eq!(client.endpoint().as_str(), "http://localhost:3000/ask");
        assert!(HttpAskClient::new("not a url").is_err());
    }
}
