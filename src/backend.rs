use reqwest::header::SET_COOKIE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::chat::{ChatMessage, ChatRole};
use crate::plan::{PlanRequest, TripPlan};
use crate::session::SessionStore;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Any transport-level failure: connection refused, a non-success status,
/// or a body that does not parse. Callers never branch on the cause.
#[derive(Debug, Error)]
#[error("backend request failed: {0}")]
pub struct TransportError(#[from] reqwest::Error);

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    session_id: &'a str,
    messages: Vec<WireMessage<'a>>,
    previous_response_id: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub response_id: String,
    #[serde(default)]
    pub tokens_used: i64,
    #[serde(default)]
    pub tokens_remaining: i64,
}

#[derive(Deserialize)]
struct LocationsResponse {
    locations: Vec<String>,
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl BackendClient {
    pub fn new(base_url: &str, session: SessionStore) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    /// One chat turn: a single round trip, no internal retries. The batch
    /// is whatever the conversation decided to transmit for this turn.
    pub async fn chat(
        &self,
        session_id: &str,
        batch: &[ChatMessage],
        previous_response_id: Option<&str>,
    ) -> Result<ChatReply, TransportError> {
        let url = format!("{}/chat", self.base_url);
        let request = ChatRequest {
            session_id,
            messages: batch.iter().map(to_wire).collect(),
            previous_response_id,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        self.refresh_session(&response);
        let response = response.error_for_status()?;
        let reply: ChatReply = response.json().await?;
        debug!(
            tokens_used = reply.tokens_used,
            tokens_remaining = reply.tokens_remaining,
            "chat reply received"
        );
        Ok(reply)
    }

    /// Place-name suggestions for the planner form.
    pub async fn locations(&self, query: &str) -> Result<Vec<String>, TransportError> {
        let url = format!("{}/locations", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .send()
            .await?;
        self.refresh_session(&response);
        let response = response.error_for_status()?;
        let body: LocationsResponse = response.json().await?;
        Ok(body.locations)
    }

    /// Generate a full itinerary from the structured form.
    pub async fn plan(&self, request: &PlanRequest) -> Result<TripPlan, TransportError> {
        let url = format!("{}/plan", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        self.refresh_session(&response);
        let response = response.error_for_status()?;
        let plan: TripPlan = response.json().await?;
        Ok(plan)
    }

    // The backend refreshes the session cookie on every response, like the
    // browser jar would. Persist the raw cookie string; resolve() pattern-
    // matches the id back out of it.
    fn refresh_session(&self, response: &reqwest::Response) {
        for value in response.headers().get_all(SET_COOKIE) {
            if let Ok(raw) = value.to_str() {
                if raw.trim_start().starts_with("session_id=") {
                    self.session.store_cookie(raw);
                }
            }
        }
    }
}

fn to_wire(message: &ChatMessage) -> WireMessage<'_> {
    let role = match message.role {
        ChatRole::System => "system",
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    };
    WireMessage {
        role,
        content: &message.content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_wire_shape() {
        let batch = vec![
            ChatMessage {
                role: ChatRole::System,
                content: "be helpful".to_string(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: "hi".to_string(),
            },
        ];
        let request = ChatRequest {
            session_id: "s1",
            messages: batch.iter().map(to_wire).collect(),
            previous_response_id: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "session_id": "s1",
                "messages": [
                    {"role": "system", "content": "be helpful"},
                    {"role": "user", "content": "hi"},
                ],
                "previous_response_id": null,
            })
        );
    }

    #[test]
    fn chat_request_carries_previous_response_id() {
        let request = ChatRequest {
            session_id: "",
            messages: vec![],
            previous_response_id: Some("r42"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["previous_response_id"], "r42");
    }

    #[test]
    fn chat_reply_parses_backend_body() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"reply":"Sure!","response_id":"r1","tokens_used":120,"tokens_remaining":9880}"#,
        )
        .unwrap();
        assert_eq!(reply.reply, "Sure!");
        assert_eq!(reply.response_id, "r1");
        assert_eq!(reply.tokens_used, 120);
        assert_eq!(reply.tokens_remaining, 9880);
    }

    #[test]
    fn chat_reply_tolerates_missing_token_counts() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"reply":"ok","response_id":""}"#).unwrap();
        assert_eq!(reply.response_id, "");
        assert_eq!(reply.tokens_used, 0);
    }

    #[test]
    fn locations_response_parses() {
        let body: LocationsResponse =
            serde_json::from_str(r#"{"locations":["Kyoto, Japan","Kyötö"]}"#).unwrap();
        assert_eq!(body.locations.len(), 2);
    }
}
