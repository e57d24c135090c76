//! Turns model replies into displayable content.
//!
//! Rendering is pure: no network, no state. Missing or empty parts of an
//! analysis become placeholder text instead of disappearing.

use std::fmt;

use crate::parse::{parse_model_output, ModelReply};
use crate::types::AnalysisResult;

pub const ANALYSIS_HEADING: &str = "Here is the legal analysis based on our conversation:";
pub const NO_SUMMARY: &str = "No summary provided.";
pub const NO_SECTIONS: &str = "No specific sections could be identified.";
pub const NO_JUDGEMENTS: &str = "No specific landmark judgements were found for this incident.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Card {
    Section {
        label: String,
        reasoning: String,
        link: Option<String>,
    },
    Judgement {
        case_name: String,
        summary: String,
    },
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAnalysis {
    pub summary: String,
    pub sections: Vec<Card>,
    pub judgements: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Plain(String),
    Analysis(RenderedAnalysis),
}

pub fn render_analysis(analysis: &AnalysisResult) -> RenderedAnalysis {
    let summary = analysis
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_SUMMARY)
        .to_string();

    let mut sections: Vec<Card> = analysis
        .suggested_sections
        .iter()
        .flatten()
        .map(|s| Card::Section {
            label: s.label.clone(),
            reasoning: s.reasoning.clone(),
            link: s
                .reference_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
        })
        .collect();
    if sections.is_empty() {
        sections.push(Card::Placeholder(NO_SECTIONS.into()));
    }

    let mut judgements: Vec<Card> = analysis
        .landmark_judgements
        .iter()
        .flatten()
        .map(|j| Card::Judgement {
            case_name: j.case_name.clone(),
            summary: j.summary.clone(),
        })
        .collect();
    if judgements.is_empty() {
        judgements.push(Card::Placeholder(NO_JUDGEMENTS.into()));
    }

    RenderedAnalysis {
        summary,
        sections,
        judgements,
    }
}

pub fn render_reply(reply: &ModelReply) -> Rendered {
    match reply {
        ModelReply::Analysis(a) => Rendered::Analysis(render_analysis(a)),
        ModelReply::Text(t) => Rendered::Plain(t.clone()),
    }
}

/// Parse a raw model turn and render it.
pub fn render_model_output(text: &str) -> Rendered {
    render_reply(&parse_model_output(text))
}

// ── Terminal formatting ──────────────────────────────────────────────────

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Section {
                label,
                reasoning,
                link,
            } => {
                writeln!(f, "  • {label}")?;
                if let Some(url) = link {
                    writeln!(f, "    {url}")?;
                }
                write!(f, "    {reasoning}")
            }
            Card::Judgement { case_name, summary } => {
                writeln!(f, "  • {case_name}")?;
                write!(f, "    {summary}")
            }
            Card::Placeholder(text) => write!(f, "  {text}"),
        }
    }
}

impl fmt::Display for RenderedAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{ANALYSIS_HEADING}")?;
        writeln!(f)?;
        writeln!(f, "Summary of Incident:")?;
        writeln!(f, "  {}", self.summary)?;
        writeln!(f)?;
        writeln!(f, "Suggested Sections & Acts:")?;
        for card in &self.sections {
            writeln!(f, "{card}")?;
        }
        writeln!(f)?;
        writeln!(f, "Relevant Landmark Judgements:")?;
        for (i, card) in self.judgements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{card}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendered::Plain(text) => f.write_str(text),
            Rendered::Analysis(a) => fmt::Display::fmt(a, f),
        }
    }
}
