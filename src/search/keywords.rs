//! Query understanding: compress free-text queries into functional keywords.
//!
//! One text-generation call handles the whole batch: the model answers one
//! line per input query, keywords space-separated. Keywords drive the
//! lexical sub-queries, so a failed call makes the search unavailable.

use tracing::debug;

use crate::completion::TextGeneration;
use crate::error::{Error, Result};

/// Maximum keywords retained per query.
pub const MAX_KEYWORDS: usize = 10;

/// System instruction for keyword extraction.
const EXTRACT_SYSTEM_PROMPT: &str = "\
You are an AI assistant. The user is looking for agent tools and states \
each requirement in natural language, one requirement per line. For each \
requirement, extract at most 10 concise functional keywords. Keep each \
keyword short unless it is an important technical term. Your answer must \
contain nothing but the keywords: keywords for the same requirement are \
joined by single spaces, and keyword lines for different requirements are \
separated by newlines, in the same order as the input lines.\n\
Example:\n\
User:\nAn AI assistant that helps find and summarize academic papers\n\
Answer:\npaper search paper summary";

/// Extract a keyword set for each query in the batch.
///
/// Returns one keyword list per input query, each capped at
/// [`MAX_KEYWORDS`]. Any provider failure, or a response with fewer lines
/// than queries, surfaces as `RetrievalUnavailable`: without keywords the
/// lexical sub-queries cannot run.
pub async fn extract_keywords(
    llm: &dyn TextGeneration,
    queries: &[String],
) -> Result<Vec<Vec<String>>> {
    let user_prompt = queries.join("\n");
    let response = llm
        .complete(EXTRACT_SYSTEM_PROMPT, &user_prompt)
        .await
        .map_err(|e| Error::retrieval("keyword extraction", e))?;

    let keyword_sets = parse_keyword_lines(&response, queries.len())
        .ok_or_else(|| Error::retrieval("keyword extraction", "response line count mismatch"))?;

    debug!(queries = queries.len(), "extracted keyword sets");
    Ok(keyword_sets)
}

/// Parse the raw response into one keyword list per query.
///
/// Expects at least `expected` non-empty lines; extra lines are ignored.
fn parse_keyword_lines(response: &str, expected: usize) -> Option<Vec<Vec<String>>> {
    let lines: Vec<&str> = response
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < expected {
        return None;
    }

    Some(
        lines[..expected]
            .iter()
            .map(|line| {
                line.split_whitespace()
                    .take(MAX_KEYWORDS)
                    .map(String::from)
                    .collect()
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_one_line_per_query() {
        let parsed = parse_keyword_lines("paper search paper summary\ntranslation ocr", 2).unwrap();
        assert_eq!(parsed[0], vec!["paper", "search", "paper", "summary"]);
        assert_eq!(parsed[1], vec!["translation", "ocr"]);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let parsed = parse_keyword_lines("\npaper search\n\n", 1).unwrap();
        assert_eq!(parsed[0], vec!["paper", "search"]);
    }

    #[test]
    fn test_parse_truncates_to_max_keywords() {
        let line = (0..15).map(|i| format!("k{}", i)).collect::<Vec<_>>().join(" ");
        let parsed = parse_keyword_lines(&line, 1).unwrap();
        assert_eq!(parsed[0].len(), MAX_KEYWORDS);
    }

    #[test]
    fn test_parse_fails_on_missing_lines() {
        assert!(parse_keyword_lines("only one line", 2).is_none());
    }
}
