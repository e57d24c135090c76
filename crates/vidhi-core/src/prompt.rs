//! Fixed conversation text and the analysis output schema.

use serde_json::{json, Value};

/// Instruction turn seeded at the head of every conversation.
pub const PREAMBLE: &str = "You are \"Vidhi AI\", an AI legal assistant for Indian police officers, \
versed in the Indian Penal Code (IPC), the Code of Criminal Procedure (CrPC) and related Indian law. \
You work as a conversational assistant: ask the officer clarifying questions until you know what \
happened, whether force or weapons were involved, what was taken or damaged, and who was affected. \
Do not produce the final analysis before you have gathered enough detail. When you do, reply with \
only a JSON object with the keys \"summary_of_incident\" (a brief neutral summary), \
\"suggested_sections\" (an array of objects with \"section_act\", \"reasoning\" and \"url\", the url \
pointing at the official text, preferably on indiacode.nic.in) and \"landmark_judgements\" (an array \
of objects with \"case_name\" and \"summary\"). Begin by introducing yourself and asking for the \
incident description.";

/// Greeting shown at session start and recorded as the first model turn.
pub const WELCOME: &str = "Hello! I am Vidhi AI, your legal assistant. Please describe the incident \
you need to report. I can help you identify the correct legal sections and relevant case laws.";

/// User turn appended when the officer asks for the final analysis.
pub const ANALYSIS_REQUEST: &str = "Please give the final structured legal analysis of this \
incident now, based on everything described so far.";

/// Shown in place of a reply when a round trip fails for any reason.
pub const FAILURE_NOTICE: &str = "I'm sorry, I encountered an error communicating with the \
server. Please try again.";

/// Output schema for the analysis, in the completion service's OpenAPI subset.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary_of_incident": { "type": "STRING" },
            "suggested_sections": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "section_act": { "type": "STRING" },
                        "reasoning": { "type": "STRING" },
                        "url": { "type": "STRING" }
                    },
                    "required": ["section_act", "reasoning", "url"]
                }
            },
            "landmark_judgements": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "case_name": { "type": "STRING" },
                        "summary": { "type": "STRING" }
                    },
                    "required": ["case_name", "summary"]
                }
            }
        },
        "required": ["summary_of_incident", "suggested_sections", "landmark_judgements"]
    })
}
