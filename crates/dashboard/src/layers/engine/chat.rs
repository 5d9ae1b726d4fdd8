use gemini_client::{Content, GenerateContentRequest, GeminiError, ModelBackend};
use protocol::ChatMessage;
use std::sync::Arc;

use crate::content::ASSISTANT_GREETING;

pub(crate) const SEND_APOLOGY: &str =
    "Sorry, I encountered an error connecting to the SIH Assistant.";
pub(crate) const CONNECT_APOLOGY: &str =
    "I'm having trouble connecting right now. Please check your connection or API key.";
pub(crate) const EMPTY_REPLY: &str = "I couldn't generate a response. Please try again.";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ChatError {
    #[error("chat session could not be initialized: {0}")]
    SessionUnavailable(#[source] GeminiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChatReply {
    Answer(String),
    Apology,
}

/// One remote conversation: the fixed system instruction plus the turns
/// the model has already answered. A user turn is only committed together
/// with its reply, so the history always alternates user/model.
pub(crate) struct ChatSession {
    instruction: Content,
    history: Vec<Content>,
}

impl ChatSession {
    fn new(instruction: &str) -> Self {
        Self {
            instruction: Content::instruction(instruction),
            history: Vec::new(),
        }
    }

    fn request_for(&self, text: &str) -> GenerateContentRequest {
        let mut contents = self.history.clone();
        contents.push(Content::user(text));
        GenerateContentRequest {
            contents,
            system_instruction: Some(self.instruction.clone()),
            generation_config: None,
        }
    }

    fn commit(&mut self, user_text: &str, model_text: &str) {
        self.history.push(Content::user(user_text));
        self.history.push(Content::model(model_text));
    }

    pub(crate) fn answered_turns(&self) -> usize {
        self.history.len() / 2
    }
}

pub(crate) struct ChatSessionClient {
    backend: Arc<dyn ModelBackend>,
    instruction: String,
    session: Option<ChatSession>,
}

impl ChatSessionClient {
    pub(crate) fn new(backend: Arc<dyn ModelBackend>, instruction: String) -> Self {
        Self {
            backend,
            instruction,
            session: None,
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    pub(crate) async fn send(&mut self, text: &str) -> Result<ChatReply, ChatError> {
        let request = self.ensure_session()?.request_for(text);
        match self.backend.generate_content(&request).await {
            Ok(response) => {
                let Some(answer) = response.text() else {
                    tracing::warn!(event = "chat_empty_reply");
                    return Ok(ChatReply::Answer(EMPTY_REPLY.to_string()));
                };
                if let Some(session) = &mut self.session {
                    session.commit(text, &answer);
                    tracing::info!(
                        event = "chat_reply",
                        turns = session.answered_turns(),
                        reply_len = answer.len(),
                    );
                }
                Ok(ChatReply::Answer(answer))
            }
            Err(err) => {
                if err.is_session_fatal() {
                    tracing::warn!(
                        event = "chat_session_discarded",
                        error = %err,
                        "session will be recreated on the next message"
                    );
                    self.session = None;
                } else {
                    tracing::warn!(
                        event = "chat_send_failed",
                        error = %err,
                        timeout = err.is_timeout()
                    );
                }
                Ok(ChatReply::Apology)
            }
        }
    }

    fn ensure_session(&mut self) -> Result<&mut ChatSession, ChatError> {
        if self.session.is_none() {
            self.backend.ensure_credentials().map_err(|err| {
                tracing::error!(event = "chat_session_failed", error = %err);
                ChatError::SessionUnavailable(err)
            })?;
            tracing::info!(
                event = "chat_session_created",
                instruction_len = self.instruction.len()
            );
        }
        let instruction = &self.instruction;
        Ok(self
            .session
            .get_or_insert_with(|| ChatSession::new(instruction)))
    }
}

pub(crate) fn reply_message(outcome: Result<ChatReply, ChatError>) -> ChatMessage {
    let id = new_message_id();
    match outcome {
        Ok(ChatReply::Answer(text)) => ChatMessage::assistant(id, text),
        Ok(ChatReply::Apology) => ChatMessage::assistant_error(id, SEND_APOLOGY),
        Err(_) => ChatMessage::assistant_error(id, CONNECT_APOLOGY),
    }
}

pub(crate) fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone)]
pub(crate) struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::assistant("init", ASSISTANT_GREETING)],
        }
    }
}

impl Transcript {
    pub(crate) fn push_user(&mut self, text: &str) -> &ChatMessage {
        self.push(ChatMessage::user(new_message_id(), text));
        &self.messages[self.messages.len() - 1]
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub(crate) fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::engine::testing::ScriptedBackend;
    use gemini_client::{GenerateContentResponse, Role};
    use protocol::ChatRole;

    fn answer(text: &str) -> Result<GenerateContentResponse, GeminiError> {
        Ok(GenerateContentResponse::from_text(text))
    }

    fn status(code: u16) -> Result<GenerateContentResponse, GeminiError> {
        Err(GeminiError::Status {
            status: code,
            body: String::new(),
        })
    }

    fn client(backend: &Arc<ScriptedBackend>) -> ChatSessionClient {
        ChatSessionClient::new(backend.clone(), "stay on topic".to_string())
    }

    #[tokio::test]
    async fn session_is_created_lazily_on_first_send() {
        let backend = ScriptedBackend::new(vec![answer("Stipend is Rs 5,000.")]);
        let mut chat = client(&backend);
        assert!(!chat.is_ready());

        let reply = chat.send("What is the stipend?").await.expect("send");
        assert_eq!(reply, ChatReply::Answer("Stipend is Rs 5,000.".to_string()));
        assert!(chat.is_ready());

        let sent = backend.requests();
        let instruction = sent[0].system_instruction.as_ref().expect("instruction");
        assert_eq!(instruction.joined_text(), "stay on topic");
        assert_eq!(instruction.role, None);
    }

    #[tokio::test]
    async fn ready_session_is_reused_for_later_turns() {
        let backend = ScriptedBackend::new(vec![answer("first"), answer("second")]);
        let mut chat = client(&backend);

        chat.send("one").await.expect("send");
        chat.send("two").await.expect("send");

        assert_eq!(chat.session().map(ChatSession::answered_turns), Some(2));
        let sent = backend.requests();
        assert_eq!(sent[1].contents.len(), 3);
        assert_eq!(sent[1].contents[1].joined_text(), "first");
        let instruction = sent[1].system_instruction.as_ref().expect("instruction");
        assert_eq!(instruction.joined_text(), "stay on topic");
    }

    #[tokio::test]
    async fn creation_failure_leaves_client_uninitialized() {
        let backend = ScriptedBackend::without_credentials();
        backend.push(answer("ok now"));
        let mut chat = client(&backend);

        let err = chat.send("hello").await.expect_err("no credentials");
        assert!(matches!(err, ChatError::SessionUnavailable(GeminiError::MissingApiKey { .. })));
        assert!(!chat.is_ready());
        assert!(backend.requests().is_empty());

        backend.set_credentials(true);
        let reply = chat.send("hello again").await.expect("send");
        assert_eq!(reply, ChatReply::Answer("ok now".to_string()));
        assert!(chat.is_ready());
    }

    #[tokio::test]
    async fn transient_failure_apologizes_and_keeps_session() {
        let backend = ScriptedBackend::new(vec![answer("first"), status(503), answer("third")]);
        let mut chat = client(&backend);

        chat.send("one").await.expect("send");
        assert_eq!(chat.send("two").await.expect("send"), ChatReply::Apology);
        assert!(chat.is_ready());
        assert_eq!(chat.session().map(ChatSession::answered_turns), Some(1));

        chat.send("three").await.expect("send");
        let sent = backend.requests();
        let roles: Vec<Option<Role>> = sent[2].contents.iter().map(|c| c.role).collect();
        assert_eq!(roles, vec![Some(Role::User), Some(Role::Model), Some(Role::User)]);
        assert_eq!(sent[2].contents[0].joined_text(), "one");
        assert_eq!(sent[2].contents[2].joined_text(), "three");
        assert_eq!(chat.session().map(ChatSession::answered_turns), Some(2));
    }

    #[tokio::test]
    async fn fatal_failure_discards_session_for_recreation() {
        let backend = ScriptedBackend::new(vec![answer("first"), status(401), answer("fresh")]);
        let mut chat = client(&backend);

        chat.send("one").await.expect("send");
        assert_eq!(chat.send("two").await.expect("send"), ChatReply::Apology);
        assert!(!chat.is_ready());

        chat.send("three").await.expect("send");
        assert!(chat.is_ready());
        let sent = backend.requests();
        assert_eq!(sent[2].contents.len(), 1, "fresh session starts without history");
    }

    #[tokio::test]
    async fn empty_reply_is_not_committed() {
        let backend = ScriptedBackend::new(vec![Ok(GenerateContentResponse::default())]);
        let mut chat = client(&backend);
        let reply = chat.send("anything").await.expect("send");
        assert_eq!(reply, ChatReply::Answer(EMPTY_REPLY.to_string()));
        assert_eq!(chat.session().map(ChatSession::answered_turns), Some(0));
    }

    #[test]
    fn failures_map_to_flagged_apologies() {
        let apology = reply_message(Ok(ChatReply::Apology));
        assert_eq!(apology.text, SEND_APOLOGY);
        assert!(apology.is_error);

        let unavailable = reply_message(Err(ChatError::SessionUnavailable(
            GeminiError::MissingApiKey {
                env: "API_KEY".to_string(),
            },
        )));
        assert_eq!(unavailable.text, CONNECT_APOLOGY);
        assert!(unavailable.is_error);
        assert_eq!(unavailable.role, ChatRole::Assistant);

        let answer = reply_message(Ok(ChatReply::Answer("hi".to_string())));
        assert!(!answer.is_error);
    }

    #[tokio::test]
    async fn transcript_grows_by_two_per_turn() {
        let backend = ScriptedBackend::new(vec![answer("a"), answer("b"), answer("c")]);
        let mut chat = client(&backend);
        let mut transcript = Transcript::default();
        assert_eq!(transcript.len(), 1);

        for question in ["q1", "q2", "q3"] {
            transcript.push_user(question);
            transcript.push(reply_message(chat.send(question).await));
        }
        assert_eq!(transcript.len(), 1 + 2 * 3);
        let roles: Vec<ChatRole> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::Assistant,
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User,
                ChatRole::Assistant,
            ]
        );
        assert_eq!(transcript.messages()[0].id, "init");
        assert_eq!(transcript.messages()[5].text, "q3");
        assert_eq!(transcript.messages()[6].text, "c");
    }

    #[tokio::test]
    async fn user_message_survives_failed_first_send() {
        let backend = ScriptedBackend::without_credentials();
        let mut chat = client(&backend);
        let mut transcript = Transcript::default();

        transcript.push_user("Who funds travel?");
        transcript.push(reply_message(chat.send("Who funds travel?").await));

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.messages()[1].text, "Who funds travel?");
        assert_eq!(transcript.messages()[2].text, CONNECT_APOLOGY);
        assert!(transcript.messages()[2].is_error);
        assert_eq!(
            transcript.messages().last().map(|m| m.role),
            Some(ChatRole::Assistant)
        );
    }
}
