//! Relevance filter: second-pass LLM judgement over fused candidates.
//!
//! The model sees the original query and the ordered candidate list (name
//! and description only) and answers either the literal token `None` or a
//! space-separated list of 0-based indices. Parsing is fail-closed: any
//! malformed response degrades that query to zero candidates instead of
//! failing the search. Malformed model output is never "repaired".

use tracing::warn;

use crate::completion::TextGeneration;
use crate::search::fusion::Candidate;

/// System instruction for the relevance judgement.
const REFLECT_SYSTEM_PROMPT: &str = "\
You are an AI assistant. The user is looking for agent tools; their \
requirement is inside the <query> tag. We have already retrieved some \
candidate tools, listed with their names and descriptions inside the \
<tools> tag. Considering the user's original requirement and each tool's \
description, decide which tools are genuinely helpful and answer with \
their indices in the list.\n\
Rules:\n\
1) Separate indices with single spaces.\n\
2) Indices are integers between 0 and the list length minus 1.\n\
3) If no tool helps the user, answer None.\n\
4) If the tool list is empty, also answer None.\n\
5) Answer either a space-separated group of indices or None. Follow the \
format strictly and include no extra characters.";

/// Build the user prompt for one query and its candidate list.
fn reflect_user_prompt(query: &str, candidates: &[Candidate]) -> String {
    let tools: Vec<serde_json::Value> = candidates
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.entry.name,
                "description": c.entry.description,
            })
        })
        .collect();
    format!(
        "<query>{}</query>\n<tools>{}</tools>",
        query,
        serde_json::Value::Array(tools)
    )
}

/// Parse the model's selection against a candidate list of length `len`.
///
/// Returns `Some(indices)` (possibly empty, for the literal `None`) when
/// the response is well-formed, preserving the model's order; `None` when
/// any token is not an integer in `[0, len)`.
pub fn parse_selection(raw: &str, len: usize) -> Option<Vec<usize>> {
    let raw = raw.trim();
    if raw == "None" {
        return Some(Vec::new());
    }
    if raw.is_empty() {
        return None;
    }

    raw.split(' ')
        .map(|token| match token.parse::<usize>() {
            Ok(i) if i < len => Some(i),
            _ => None,
        })
        .collect()
}

/// Filter one query's fused candidates down to the genuinely relevant ones.
///
/// The filter never fails the caller: provider errors and malformed
/// responses both degrade to an empty list (logged). Selected candidates
/// keep the order the model returned them in.
pub async fn filter_candidates(
    llm: &dyn TextGeneration,
    query: &str,
    candidates: Vec<Candidate>,
) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let user_prompt = reflect_user_prompt(query, &candidates);
    let raw = match llm.complete(REFLECT_SYSTEM_PROMPT, &user_prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(query, error = %e, "relevance filter call failed; degrading to empty result");
            return Vec::new();
        }
    };

    match parse_selection(&raw, candidates.len()) {
        Some(indices) => indices
            .into_iter()
            .map(|i| candidates[i].clone())
            .collect(),
        None => {
            warn!(query, response = %raw, "unparseable relevance filter response; degrading to empty result");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_yields_empty_selection() {
        assert_eq!(parse_selection("None", 3), Some(vec![]));
        assert_eq!(parse_selection("  None  ", 3), Some(vec![]));
    }

    #[test]
    fn test_valid_indices_preserve_model_order() {
        assert_eq!(parse_selection("0 2", 3), Some(vec![0, 2]));
        assert_eq!(parse_selection("2 0", 3), Some(vec![2, 0]));
    }

    #[test]
    fn test_out_of_range_index_fails_closed() {
        assert_eq!(parse_selection("5", 3), None);
        assert_eq!(parse_selection("0 3", 3), None);
    }

    #[test]
    fn test_non_integer_token_fails_closed() {
        assert_eq!(parse_selection("0, 2", 3), None);
        assert_eq!(parse_selection("first", 3), None);
        assert_eq!(parse_selection("-1", 3), None);
    }

    #[test]
    fn test_empty_response_fails_closed() {
        assert_eq!(parse_selection("", 3), None);
        assert_eq!(parse_selection("   ", 3), None);
    }
}
