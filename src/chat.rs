use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::backend::{BackendClient, ChatReply, TransportError};

pub const SYSTEM_PROMPT: &str =
    "You are Wanderlust, a friendly travel assistant helping users plan amazing trips.";
pub const GREETING: &str = "Hey there! Ready to plan your next adventure? 🗺️";
pub const FALLBACK_REPLY: &str = "Oops, something went wrong.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Rejected input: nothing left after trimming. Not surfaced in the chat
/// log; the caller simply keeps whatever was typed.
#[derive(Debug, Error)]
#[error("message is empty after trimming")]
pub struct EmptyInputError;

/// The message log plus the backend's linkage id for the last acknowledged
/// turn. The log is the full record shown to the user; what actually goes
/// over the wire per turn is derived by [`Conversation::outbound_batch`].
pub struct Conversation {
    session_id: String,
    log: Vec<ChatMessage>,
    response_id: Option<String>,
}

impl Conversation {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            log: vec![
                ChatMessage::new(ChatRole::System, SYSTEM_PROMPT),
                ChatMessage::new(ChatRole::Assistant, GREETING),
            ],
            response_id: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn log(&self) -> &[ChatMessage] {
        &self.log
    }

    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }

    pub fn append_user(&mut self, text: &str) -> Result<(), EmptyInputError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EmptyInputError);
        }
        self.log.push(ChatMessage::new(ChatRole::User, text));
        Ok(())
    }

    /// What to transmit on the next turn. Before the first acknowledged
    /// turn the entire log goes out, system prompt and greeting included;
    /// once the backend has issued a response id, only the newest user
    /// message is sent and the backend recalls the rest from that id.
    pub fn outbound_batch(&self) -> Vec<ChatMessage> {
        if self.response_id.is_none() {
            return self.log.clone();
        }
        self.log
            .iter()
            .rev()
            .find(|message| message.role == ChatRole::User)
            .cloned()
            .into_iter()
            .collect()
    }

    /// Record an acknowledged turn. The response id always replaces the
    /// stored one; the backend sends an empty id when it declined to link
    /// the turn (e.g. the session token budget ran out), which drops the
    /// linkage and puts the next turn back in full-context mode.
    pub fn record_reply(&mut self, content: &str, response_id: &str) {
        self.log.push(ChatMessage::new(ChatRole::Assistant, content));
        self.response_id = if response_id.is_empty() {
            None
        } else {
            Some(response_id.to_string())
        };
    }

    /// Record a failed turn as a regular assistant entry. The response id
    /// is left untouched: the failed turn was never acknowledged, so the
    /// last good linkage stays in place.
    pub fn record_failure(&mut self, fallback: &str) {
        self.log.push(ChatMessage::new(ChatRole::Assistant, fallback));
    }
}

type InFlightTurn = JoinHandle<Result<ChatReply, TransportError>>;

/// Drives one conversation against the backend. At most one turn is in
/// flight at a time; `send` starts one and `poll` reaps it from the event
/// loop. Dropping the controller discards any in-flight result, which is
/// what navigating away from the chat screen does.
pub struct ChatController {
    conversation: Conversation,
    client: BackendClient,
    in_flight: Option<InFlightTurn>,
    usage: Option<(i64, i64)>,
}

impl ChatController {
    pub fn new(client: BackendClient, session_id: String) -> Self {
        Self {
            conversation: Conversation::new(session_id),
            client,
            in_flight: None,
            usage: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.log()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Tokens used/remaining as reported by the last successful turn.
    pub fn usage(&self) -> Option<(i64, i64)> {
        self.usage
    }

    /// Start a turn. Returns false without touching the log when a turn is
    /// already in flight or the input trims to nothing.
    pub fn send(&mut self, text: &str) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        if self.conversation.append_user(text).is_err() {
            return false;
        }

        let batch = self.conversation.outbound_batch();
        let session_id = self.conversation.session_id().to_string();
        let response_id = self.conversation.response_id().map(str::to_string);
        let client = self.client.clone();

        debug!(
            batch_len = batch.len(),
            linked = response_id.is_some(),
            "chat turn started"
        );
        self.in_flight = Some(tokio::spawn(async move {
            client.chat(&session_id, &batch, response_id.as_deref()).await
        }));
        true
    }

    /// Reap a finished turn, if any. Cheap to call on every pass of the
    /// event loop; does nothing while the turn is still running.
    pub async fn poll(&mut self) {
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.in_flight.take() else {
            return;
        };

        match task.await {
            Ok(Ok(reply)) => {
                self.usage = Some((reply.tokens_used, reply.tokens_remaining));
                self.conversation.record_reply(&reply.reply, &reply.response_id);
            }
            Ok(Err(err)) => {
                warn!(error = %err, "chat turn failed");
                self.conversation.record_failure(FALLBACK_REPLY);
            }
            Err(err) => {
                warn!(error = %err, "chat task aborted");
                self.conversation.record_failure(FALLBACK_REPLY);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;

    fn test_client() -> BackendClient {
        // Discard port: connections are refused immediately, so failure
        // paths complete without a live backend.
        let dir = tempfile::tempdir().unwrap();
        BackendClient::new("http://127.0.0.1:9", SessionStore::at(dir.path().join("cookies")))
    }

    #[test]
    fn fresh_conversation_sends_full_log() {
        let mut conversation = Conversation::new(String::new());
        conversation.append_user("Plan me a trip to Kyoto").unwrap();

        let batch = conversation.outbound_batch();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].role, ChatRole::System);
        assert_eq!(batch[1].role, ChatRole::Assistant);
        assert_eq!(batch[2].content, "Plan me a trip to Kyoto");
    }

    #[test]
    fn linked_conversation_sends_only_latest_user_message() {
        let mut conversation = Conversation::new("s1".to_string());
        conversation.append_user("Plan me a trip to Kyoto").unwrap();
        conversation.record_reply("Sure!", "r1");

        assert_eq!(conversation.log().len(), 4);
        assert_eq!(conversation.response_id(), Some("r1"));

        conversation.append_user("3 days").unwrap();
        let batch = conversation.outbound_batch();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].role, ChatRole::User);
        assert_eq!(batch[0].content, "3 days");
    }

    #[test]
    fn reply_replaces_response_id() {
        let mut conversation = Conversation::new(String::new());
        conversation.append_user("hi").unwrap();
        conversation.record_reply("hello", "r1");
        conversation.append_user("more").unwrap();
        conversation.record_reply("sure", "r2");

        assert_eq!(conversation.response_id(), Some("r2"));
    }

    #[test]
    fn empty_response_id_reverts_to_full_context() {
        let mut conversation = Conversation::new(String::new());
        conversation.append_user("hi").unwrap();
        conversation.record_reply("hello", "r1");
        conversation.append_user("keep going").unwrap();
        conversation.record_reply("budget exhausted", "");

        assert_eq!(conversation.response_id(), None);
        conversation.append_user("still there?").unwrap();
        // Back to sending everything, as if no turn had been linked.
        assert_eq!(conversation.outbound_batch().len(), conversation.log().len());
    }

    #[test]
    fn failure_appends_one_message_and_keeps_response_id() {
        let mut conversation = Conversation::new(String::new());
        conversation.append_user("hi").unwrap();
        conversation.record_reply("hello", "r1");
        conversation.append_user("flaky network").unwrap();
        let len_before = conversation.log().len();

        conversation.record_failure(FALLBACK_REPLY);

        assert_eq!(conversation.log().len(), len_before + 1);
        let last = conversation.log().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, FALLBACK_REPLY);
        assert_eq!(conversation.response_id(), Some("r1"));
    }

    #[test]
    fn blank_input_is_rejected_and_log_untouched() {
        let mut conversation = Conversation::new(String::new());
        assert!(conversation.append_user("").is_err());
        assert!(conversation.append_user("   \t  ").is_err());
        assert_eq!(conversation.log().len(), 2);
    }

    #[test]
    fn user_input_is_trimmed() {
        let mut conversation = Conversation::new(String::new());
        conversation.append_user("  Kyoto in spring  ").unwrap();
        assert_eq!(conversation.log().last().unwrap().content, "Kyoto in spring");
    }

    #[tokio::test]
    async fn send_rejects_blank_input() {
        let mut controller = ChatController::new(test_client(), String::new());
        assert!(!controller.send("   "));
        assert!(!controller.is_busy());
        assert_eq!(controller.messages().len(), 2);
    }

    #[tokio::test]
    async fn send_while_busy_is_a_no_op() {
        let mut controller = ChatController::new(test_client(), String::new());
        assert!(controller.send("Plan me a trip to Kyoto"));
        assert!(controller.is_busy());
        let len_after_first = controller.messages().len();

        assert!(!controller.send("3 days"));
        assert_eq!(controller.messages().len(), len_after_first);
    }

    #[tokio::test]
    async fn failed_turn_appends_fallback_and_goes_idle() {
        let mut controller = ChatController::new(test_client(), String::new());
        assert!(controller.send("Plan me a trip to Kyoto"));

        tokio::time::timeout(std::time::Duration::from_secs(10), async {
            while controller.is_busy() {
                controller.poll().await;
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("turn should settle");

        let last = controller.messages().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, FALLBACK_REPLY);
        // User message then fallback, on top of the seeded pair.
        assert_eq!(controller.messages().len(), 4);
        assert!(!controller.is_busy());
    }
}
