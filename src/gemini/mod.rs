// Gemini generation client module
// Author: kelexine (https://github.com/kelexine)

mod client;
pub mod models;

pub use client::GeminiClient;

use crate::error::Result;
use futures::future::BoxFuture;
use models::GenerateContentResponse;
use regex::Regex;
use std::sync::OnceLock;

/// Persona applied to every generation. Not caller-controllable.
pub const SYSTEM_INSTRUCTION: &str = "You are the owner of this portfolio website, answering \
visitors' questions about yourself, your skills, your projects and your experience. \
Always speak in the first person, in a friendly and conversational tone, as if chatting with \
a visitor. Keep answers concise and to the point. Never include internal reasoning, \
analysis steps or tags such as <think> in your reply. You may use markdown emphasis \
(**bold**, *italic*) and short bullet lists where they help readability. If a question is \
unrelated to you or your work, politely steer the conversation back.";

/// Text-in/text-out generation seam.
///
/// The response cache and gateway only depend on this trait, so tests can
/// substitute a scripted generator for the real HTTP client.
pub trait TextGenerator: Send + Sync {
    /// Produce a non-empty answer for `prompt`. One call means at most one
    /// upstream request.
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>>;

    /// Whether a credential is available. Used by health reporting only.
    fn is_configured(&self) -> bool;
}

/// Lazily initialized regex for thinking tags
static THINKING_REGEX: OnceLock<Regex> = OnceLock::new();

fn thinking_regex() -> &'static Regex {
    THINKING_REGEX.get_or_init(|| {
        Regex::new(r"(?s)<think(?:ing)?>.*?</think(?:ing)?>").expect("Invalid regex pattern")
    })
}

/// Plain text of the first candidate.
///
/// Reasoning parts and `<think>` blocks are dropped; the result is trimmed and
/// may be empty, which callers must treat as a failed generation.
pub fn extract_text(response: &GenerateContentResponse) -> String {
    let joined: String = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter(|p| !p.thought.unwrap_or(false))
                .filter_map(|p| p.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    thinking_regex().replace_all(&joined, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_joins_text_parts() {
        let resp = response(
            r#"{"candidates": [{"content": {"role": "model", "parts": [
                {"text": "I build "}, {"text": "**Rust** services."}
            ]}, "finishReason": "STOP"}]}"#,
        );
        assert_eq!(extract_text(&resp), "I build **Rust** services.");
    }

    #[test]
    fn test_extract_strips_reasoning() {
        let resp = response(
            r#"{"candidates": [{"content": {"parts": [
                {"text": "planning the answer", "thought": true},
                {"text": "<think>internal</think>\nHi there!"}
            ]}}]}"#,
        );
        assert_eq!(extract_text(&resp), "Hi there!");
    }

    #[test]
    fn test_extract_handles_missing_content() {
        assert_eq!(extract_text(&response(r#"{"candidates": []}"#)), "");
        assert_eq!(
            extract_text(&response(
                r#"{"candidates": [{"finishReason": "SAFETY"}], "promptFeedback": {"blockReason": "SAFETY"}}"#
            )),
            ""
        );
    }
}
