//! The chat agent: forwards each message to the answer service and records
//! the exchange.

use std::sync::Arc;
use std::time::Duration;

use filebot_services::{AnswerClient, AnswerService, ClientOptions, ServiceBase};
use filebot_shared::{AppConfig, FileBotError, Query, Result, Session, Speaker, Turn, TurnContent};
use tracing::{info, instrument, warn};

use crate::conversation::Conversation;
use crate::stages::bounded;

/// Agent reply when the backend answered with nothing.
const EMPTY_REPLY: &str = "...";

/// Agent reply when the backend could not be reached.
pub const UNREACHABLE_REPLY: &str = "⚠️ Error: Could not reach server.";

/// Relays messages between a conversation and an [`AnswerService`].
#[derive(Clone)]
pub struct AnswerProxy {
    answers: Arc<dyn AnswerService>,
    timeout: Duration,
}

impl AnswerProxy {
    pub fn new(answers: Arc<dyn AnswerService>, timeout: Duration) -> Self {
        Self { answers, timeout }
    }

    /// Build the HTTP client for `[chat]`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let base = ServiceBase::parse(&config.chat.base_url)?;
        let opts = ClientOptions {
            timeout_secs: config.chat.timeout_secs,
        };
        info!(base_url = %base.as_url(), "answer proxy configured");

        Ok(Self::new(
            Arc::new(AnswerClient::new(base, &opts)?),
            opts.timeout(),
        ))
    }

    /// Replay the user's stored history into `conversation`.
    ///
    /// Failures are logged and leave the conversation untouched.
    #[instrument(skip_all, fields(conversation = %conversation.id()))]
    pub async fn load_history(&self, session: &Session, conversation: &mut Conversation) -> usize {
        let messages =
            match bounded(self.timeout, "chat history", self.answers.history(session)).await {
                Ok(messages) => messages,
                Err(e) => {
                    warn!(error = %e, "loading chat history failed");
                    return 0;
                }
            };

        let turns: Vec<Turn> = messages
            .into_iter()
            .map(|m| {
                let speaker = if m.is_user() {
                    Speaker::User
                } else {
                    Speaker::Agent
                };
                Turn::new(speaker, TurnContent::Text { text: m.content })
            })
            .collect();
        let count = turns.len();
        conversation.append(turns);
        count
    }

    /// Send `input` and append the user turn plus the agent's answer.
    ///
    /// Blank input and a missing credential are rejected before anything is
    /// appended. Backend failures become an error turn, not an `Err`.
    #[instrument(skip_all, fields(conversation = %conversation.id()))]
    pub async fn submit(
        &self,
        session: &Session,
        conversation: &mut Conversation,
        input: &str,
    ) -> Result<usize> {
        let query = Query::parse(input)?;
        let has_user = session.user_id.as_deref().is_some_and(|id| !id.is_empty());
        if session.bearer().is_none() || !has_user {
            return Err(FileBotError::Unauthenticated);
        }

        let ticket = conversation.begin();
        conversation.commit(ticket, vec![Turn::user_text(query.raw())]);

        let reply = match bounded(self.timeout, "chat reply", self.answers.reply(session, query.raw()))
            .await
        {
            Ok(text) if text.trim().is_empty() => Turn::agent_text(EMPTY_REPLY),
            Ok(text) => Turn::agent_text(text),
            Err(e) => {
                warn!(error = %e, "chat request failed");
                Turn::agent_text(UNREACHABLE_REPLY)
            }
        };

        Ok(if conversation.commit(ticket, vec![reply]) { 2 } else { 1 })
    }
}

impl std::fmt::Debug for AnswerProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerProxy")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeAnswers;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn signed_in() -> Session {
        Session::new("42", "tok-abc")
    }

    fn proxy(fake: Arc<FakeAnswers>) -> AnswerProxy {
        AnswerProxy::new(fake, Duration::from_secs(2))
    }

    fn texts(conv: &Conversation) -> Vec<(Speaker, String)> {
        conv.log()
            .iter()
            .map(|t| (t.speaker, t.text().unwrap_or_default().to_string()))
            .collect()
    }

    #[tokio::test]
    async fn reply_is_appended_after_user_turn() {
        let fake = Arc::new(FakeAnswers::default().with_reply("Your files are in /docs."));
        let mut conv = Conversation::new();

        let n = proxy(fake.clone())
            .submit(&signed_in(), &mut conv, "where are my files?")
            .await
            .unwrap();

        assert_eq!(n, 2);
        assert_eq!(
            texts(&conv),
            [
                (Speaker::User, "where are my files?".to_string()),
                (Speaker::Agent, "Your files are in /docs.".to_string()),
            ]
        );
        assert_eq!(fake.messages(), ["where are my files?"]);
    }

    #[tokio::test]
    async fn empty_reply_becomes_ellipsis() {
        let fake = Arc::new(FakeAnswers::default());
        let mut conv = Conversation::new();
        proxy(fake)
            .submit(&signed_in(), &mut conv, "anything")
            .await
            .unwrap();
        assert_eq!(conv.log().turns()[1].text(), Some("..."));
    }

    #[tokio::test]
    async fn unreachable_backend_yields_error_turn() {
        let fake = Arc::new(FakeAnswers::default().down());
        let mut conv = Conversation::new();
        let n = proxy(fake)
            .submit(&signed_in(), &mut conv, "hi there")
            .await
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(conv.log().turns()[1].text(), Some(UNREACHABLE_REPLY));
    }

    #[tokio::test]
    async fn blank_or_anonymous_input_appends_nothing() {
        let fake = Arc::new(FakeAnswers::default());
        let proxy = proxy(fake.clone());
        let mut conv = Conversation::new();

        let blank = proxy.submit(&signed_in(), &mut conv, "  \t").await;
        assert!(matches!(blank, Err(FileBotError::InvalidInput { .. })));

        let anon = proxy
            .submit(&Session::anonymous(), &mut conv, "hello")
            .await;
        assert!(matches!(anon, Err(FileBotError::Unauthenticated)));

        assert!(conv.log().is_empty());
        assert!(fake.messages().is_empty());
    }

    #[tokio::test]
    async fn empty_user_id_is_unauthenticated() {
        let fake = Arc::new(FakeAnswers::default().with_reply("never sent"));
        let mut conv = Conversation::new();

        let err = proxy(fake.clone())
            .submit(&Session::new("", "tok-abc"), &mut conv, "hello")
            .await;

        assert!(matches!(err, Err(FileBotError::Unauthenticated)));
        assert!(conv.log().is_empty());
        assert!(fake.messages().is_empty());
    }

    #[tokio::test]
    async fn history_maps_roles() {
        let fake = Arc::new(FakeAnswers::default().with_history(&[
            ("user", "first question"),
            ("assistant", "first answer"),
        ]));
        let mut conv = Conversation::new();

        assert_eq!(proxy(fake).load_history(&signed_in(), &mut conv).await, 2);
        assert_eq!(
            texts(&conv),
            [
                (Speaker::User, "first question".to_string()),
                (Speaker::Agent, "first answer".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn history_failure_leaves_log_untouched() {
        let fake = Arc::new(FakeAnswers::default().down());
        let mut conv = Conversation::new();
        assert_eq!(proxy(fake).load_history(&signed_in(), &mut conv).await, 0);
        assert!(conv.log().is_empty());
    }

    #[tokio::test]
    async fn from_config_talks_to_chat_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot/chat/"))
            .and(header("authorization", "Bearer tok-abc"))
            .and(body_json(serde_json::json!({"message": "ping", "user": "42"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"reply": "pong"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = AppConfig::default();
        config.chat.base_url = server.uri();
        let proxy = AnswerProxy::from_config(&config).unwrap();
        let mut conv = Conversation::new();

        proxy.submit(&signed_in(), &mut conv, "ping").await.unwrap();
        assert_eq!(conv.log().turns()[1].text(), Some("pong"));
    }
}
