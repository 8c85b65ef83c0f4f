//! Fenced Block Extraction
//!
//! LLM replies embed structured payloads in fenced code blocks
//! (```` ```json ... ``` ````). These helpers pull them out of free text.

use serde::de::DeserializeOwned;

/// Return the body of the first fenced block tagged `lang`, trimmed.
pub fn fenced_block<'a>(content: &'a str, lang: &str) -> Option<&'a str> {
    let marker = format!("```{lang}");
    let start = content.find(&marker)?;
    let after_marker = &content[start + marker.len()..];
    let end = after_marker.find("```")?;
    Some(after_marker[..end].trim())
}

/// Parse the first fenced `json` block into `T`.
///
/// Falls back to the outermost `{ ... }` span when no fenced block parses.
pub fn parse_fenced_json<T: DeserializeOwned>(content: &str) -> Option<T> {
    if let Some(body) = fenced_block(content, "json") {
        match serde_json::from_str::<T>(body) {
            Ok(value) => return Some(value),
            Err(e) => tracing::debug!(error = %e, "Fenced json block did not parse"),
        }
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<T>(&content[start..=end]).ok()
}
