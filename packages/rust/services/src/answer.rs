//! Answer Service client used by the chat proxy agent.

use async_trait::async_trait;
use filebot_shared::{FileBotError, Result, Session};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::AnswerService;
use crate::http::{self, ClientOptions, ServiceBase};

/// One stored message from the user's chat history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryMessage {
    /// `"user"` for the user's own messages; anything else is the agent.
    pub role: String,
    pub content: String,
}

impl HistoryMessage {
    pub fn is_user(&self) -> bool {
        self.role == "user"
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    user: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    reply: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    message: Vec<HistoryMessage>,
}

/// HTTP client for the chat backend.
#[derive(Debug, Clone)]
pub struct AnswerClient {
    base: ServiceBase,
    client: Client,
}

impl AnswerClient {
    pub fn new(base: ServiceBase, opts: &ClientOptions) -> Result<Self> {
        Ok(Self {
            base,
            client: http::build_client(opts)?,
        })
    }
}

fn require_user(session: &Session) -> Result<&str> {
    if session.bearer().is_none() {
        return Err(FileBotError::Unauthenticated);
    }
    session
        .user_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(FileBotError::Unauthenticated)
}

#[async_trait]
impl AnswerService for AnswerClient {
    #[instrument(skip_all, fields(chars = message.chars().count()))]
    async fn reply(&self, session: &Session, message: &str) -> Result<String> {
        let user = require_user(session)?;
        let url = self.base.endpoint("bot/chat/", &[])?;
        let request = http::authorize(self.client.post(url.clone()), session)
            .json(&ChatRequest { message, user });
        let body: ChatResponse = http::send_json(request, &url).await?;

        Ok(body.reply.unwrap_or_default())
    }

    #[instrument(skip_all)]
    async fn history(&self, session: &Session) -> Result<Vec<HistoryMessage>> {
        let user = require_user(session)?;
        let mut url = self.base.endpoint("bot/signup/", &[])?;
        url.path_segments_mut()
            .map_err(|()| FileBotError::config("chat base URL cannot carry a user id"))?
            .pop_if_empty()
            .push(user)
            .push("");
        let request = http::authorize(self.client.get(url.clone()), session);
        let body: HistoryResponse = http::send_json(request, &url).await?;

        debug!(messages = body.message.len(), "chat history loaded");
        Ok(body.message)
    }
}
