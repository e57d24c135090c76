use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    backend::CompletionBackend,
    prompt::{self, FAILURE_NOTICE},
    render::{render_model_output, Rendered},
    types::{candidate_text, CompletionRequest, Turn},
};

/// Ordered, append-only turn history for one chat session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// History primed with the assistant preamble and the welcome greeting.
    pub fn seeded() -> Self {
        Self {
            turns: vec![Turn::user(prompt::PREAMBLE), Turn::model(prompt::WELCOME)],
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn to_request(&self, response_schema: Option<Value>) -> Result<CompletionRequest> {
        let request = CompletionRequest::from_turns(&self.turns)?;
        Ok(match response_schema {
            Some(schema) => request.with_response_schema(schema),
            None => request,
        })
    }
}

/// The surface a controller drives: a chat window, a terminal, a test double.
pub trait ChatView {
    /// Enable or disable the submission controls.
    fn set_input_enabled(&mut self, enabled: bool);
    fn show_user(&mut self, text: &str);
    fn show_reply(&mut self, reply: &Rendered);
    /// Fixed-text notices that are not part of the conversation.
    fn show_notice(&mut self, text: &str);
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Blank input; nothing happened.
    Ignored,
    Replied(Rendered),
    Failed,
}

/// Owns a session's conversation and runs one request/response cycle at a
/// time. Each cycle borrows the controller mutably, so a second submission
/// cannot start while one is in flight.
pub struct ConversationController<B, V> {
    backend: B,
    view: V,
    conversation: Conversation,
}

impl<B: CompletionBackend, V: ChatView> ConversationController<B, V> {
    /// Start a fresh session: seed the history and greet.
    pub fn new(backend: B, mut view: V) -> Self {
        view.show_reply(&Rendered::Plain(prompt::WELCOME.to_string()));
        view.set_input_enabled(true);
        Self::with_conversation(backend, view, Conversation::seeded())
    }

    /// Resume with an existing history. Nothing is shown.
    pub fn with_conversation(backend: B, view: V, conversation: Conversation) -> Self {
        Self {
            backend,
            view,
            conversation,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Send a free-form user message. Blank input is ignored.
    pub async fn submit_message(&mut self, text: &str) -> Outcome {
        let text = text.trim();
        if text.is_empty() {
            return Outcome::Ignored;
        }
        self.run_cycle(text.to_string(), None).await
    }

    /// Ask for the final analysis with the output schema enforced upstream.
    pub async fn request_analysis(&mut self) -> Outcome {
        self.run_cycle(
            prompt::ANALYSIS_REQUEST.to_string(),
            Some(prompt::analysis_schema()),
        )
        .await
    }

    async fn run_cycle(&mut self, text: String, response_schema: Option<Value>) -> Outcome {
        self.view.show_user(&text);
        self.conversation.push(Turn::user(text));
        self.view.set_input_enabled(false);

        let outcome = match self.exchange(response_schema).await {
            Ok(reply) => {
                debug!(
                    reply_len = reply.len(),
                    turns = self.conversation.len() + 1,
                    "model replied"
                );
                let rendered = render_model_output(&reply);
                self.conversation.push(Turn::model(reply));
                self.view.show_reply(&rendered);
                Outcome::Replied(rendered)
            }
            Err(e) => {
                warn!("chat round trip failed: {e:#}");
                self.view.show_notice(FAILURE_NOTICE);
                Outcome::Failed
            }
        };

        self.view.set_input_enabled(true);
        outcome
    }

    async fn exchange(&self, response_schema: Option<Value>) -> Result<String> {
        let request = self.conversation.to_request(response_schema)?;
        let response = self.backend.generate_content(&request).await?;
        candidate_text(&response).ok_or_else(|| anyhow!("response carried no candidate text"))
    }
}
