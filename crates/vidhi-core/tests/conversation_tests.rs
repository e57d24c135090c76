// Turn-taking behaviour of `ConversationController` against a scripted backend.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use vidhi_core::{
    backend::CompletionBackend,
    conversation::{ChatView, Conversation, ConversationController, Outcome},
    prompt::{self, FAILURE_NOTICE},
    render::{Card, Rendered},
    CompletionRequest, Role, Turn,
};

// ── Test doubles ──────────────────────────────────────────────────────────

#[derive(Default)]
struct ScriptedBackend {
    replies: Mutex<Vec<Result<Value>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    fn replying(replies: Vec<Result<Value>>) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn generate_content(&self, request: &CompletionRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(anyhow!("no scripted reply left")))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ViewEvent {
    Input(bool),
    User(String),
    Reply(Rendered),
    Notice(String),
}

#[derive(Default)]
struct RecordingView {
    events: Vec<ViewEvent>,
}

impl RecordingView {
    fn input_enabled(&self) -> Option<bool> {
        self.events.iter().rev().find_map(|e| match e {
            ViewEvent::Input(b) => Some(*b),
            _ => None,
        })
    }
}

impl ChatView for RecordingView {
    fn set_input_enabled(&mut self, enabled: bool) {
        self.events.push(ViewEvent::Input(enabled));
    }
    fn show_user(&mut self, text: &str) {
        self.events.push(ViewEvent::User(text.to_string()));
    }
    fn show_reply(&mut self, reply: &Rendered) {
        self.events.push(ViewEvent::Reply(reply.clone()));
    }
    fn show_notice(&mut self, text: &str) {
        self.events.push(ViewEvent::Notice(text.to_string()));
    }
}

fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] }, "finishReason": "STOP" }]
    })
}

fn controller(
    replies: Vec<Result<Value>>,
) -> ConversationController<ScriptedBackend, RecordingView> {
    ConversationController::with_conversation(
        ScriptedBackend::replying(replies),
        RecordingView::default(),
        Conversation::new(),
    )
}

// ── Session bootstrap ─────────────────────────────────────────────────────

#[test]
fn new_session_is_seeded_and_greets() {
    let c = ConversationController::new(ScriptedBackend::default(), RecordingView::default());
    let turns = c.conversation().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0], Turn::user(prompt::PREAMBLE));
    assert_eq!(turns[1], Turn::model(prompt::WELCOME));
    assert_eq!(
        c.view().events.first(),
        Some(&ViewEvent::Reply(Rendered::Plain(prompt::WELCOME.into())))
    );
    assert_eq!(c.view().input_enabled(), Some(true));
}

// ── Blank input ───────────────────────────────────────────────────────────

#[tokio::test]
async fn blank_input_is_a_no_op() {
    let mut c = controller(vec![]);
    for input in ["", "   ", "\n\t "] {
        assert_eq!(c.submit_message(input).await, Outcome::Ignored);
    }
    assert!(c.conversation().is_empty());
    assert!(c.backend().requests().is_empty());
    assert!(c.view().events.is_empty());
}

// ── Successful round trip ─────────────────────────────────────────────────

#[tokio::test]
async fn prose_reply_appends_one_user_and_one_model_turn() {
    let mut c = controller(vec![Ok(gemini_reply("Was a weapon used?"))]);

    let outcome = c.submit_message("  Someone took my bag  ").await;

    assert_eq!(outcome, Outcome::Replied(Rendered::Plain("Was a weapon used?".into())));
    let turns = c.conversation().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0], Turn::user("Someone took my bag"));
    assert_eq!(turns[1].role, Role::Model);
    assert_eq!(turns[1].text(), "Was a weapon used?");
    assert_eq!(
        c.view().events,
        vec![
            ViewEvent::User("Someone took my bag".into()),
            ViewEvent::Input(false),
            ViewEvent::Reply(Rendered::Plain("Was a weapon used?".into())),
            ViewEvent::Input(true),
        ]
    );
}

#[tokio::test]
async fn whole_history_is_resent_each_turn() {
    let mut c = controller(vec![
        Ok(gemini_reply("Where did it happen?")),
        Ok(gemini_reply("Was anyone hurt?")),
    ]);
    c.submit_message("My phone was stolen").await;
    c.submit_message("Near the market").await;

    let requests = c.backend().requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].contents.as_array().map(Vec::len), Some(1));
    let second = requests[1].contents.as_array().unwrap();
    assert_eq!(second.len(), 3);
    assert_eq!(second[0]["parts"][0]["text"], "My phone was stolen");
    assert_eq!(second[1]["role"], "model");
    assert_eq!(second[2]["parts"][0]["text"], "Near the market");
    assert!(requests.iter().all(|r| r.response_schema.is_none()));
}

#[tokio::test]
async fn structured_reply_renders_cards() {
    let analysis = json!({
        "summary_of_incident": "The complainant's phone was snatched at knifepoint.",
        "suggested_sections": [
            { "section_act": "Section 392 of the Indian Penal Code, 1860", "reasoning": "Robbery.", "url": "https://indiacode.nic.in/" },
            { "section_act": "Section 397 of the Indian Penal Code, 1860", "reasoning": "Deadly weapon.", "url": "https://indiacode.nic.in/" }
        ]
    });
    let text = format!("```json\n{analysis}\n```");
    let mut c = controller(vec![Ok(gemini_reply(&text))]);

    let Outcome::Replied(Rendered::Analysis(r)) = c.submit_message("It happened at 9pm").await else {
        panic!("expected analysis");
    };
    assert_eq!(r.sections.len(), 2);
    assert!(matches!(&r.judgements[..], [Card::Placeholder(_)]));
    // The raw model text is what gets recorded, not the rendering.
    assert_eq!(c.conversation().last().map(Turn::text), Some(text));
}

#[tokio::test]
async fn request_analysis_sends_schema() {
    let mut c = controller(vec![Ok(gemini_reply(
        r#"{"summary_of_incident": "x", "suggested_sections": [], "landmark_judgements": []}"#,
    ))]);

    let outcome = c.request_analysis().await;

    assert!(matches!(outcome, Outcome::Replied(Rendered::Analysis(_))));
    let requests = c.backend().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].response_schema, Some(prompt::analysis_schema()));
    assert_eq!(c.conversation().turns()[0], Turn::user(prompt::ANALYSIS_REQUEST));
}

// ── Failures ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn backend_error_shows_notice_and_reenables_input() {
    let mut c = controller(vec![Err(anyhow!("connection refused"))]);

    let outcome = c.submit_message("My scooter was stolen").await;

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(c.conversation().turns(), &[Turn::user("My scooter was stolen")]);
    assert_eq!(
        c.view().events,
        vec![
            ViewEvent::User("My scooter was stolen".into()),
            ViewEvent::Input(false),
            ViewEvent::Notice(FAILURE_NOTICE.into()),
            ViewEvent::Input(true),
        ]
    );
}

#[tokio::test]
async fn response_without_candidates_is_a_failure() {
    let mut c = controller(vec![Ok(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))]);

    assert_eq!(c.submit_message("hello").await, Outcome::Failed);
    assert_eq!(c.conversation().len(), 1);
    assert_eq!(c.view().input_enabled(), Some(true));
}

#[tokio::test]
async fn conversation_continues_after_failure() {
    let mut c = controller(vec![Err(anyhow!("502")), Ok(gemini_reply("Go on."))]);
    assert_eq!(c.submit_message("first").await, Outcome::Failed);
    assert!(matches!(c.submit_message("second").await, Outcome::Replied(_)));

    let turns: Vec<String> = c.conversation().turns().iter().map(Turn::text).collect();
    assert_eq!(turns, ["first", "second", "Go on."]);
}
