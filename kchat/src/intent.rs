//! Keyword heuristic deciding whether a simulated turn runs a tool.
//!
//! Keywords are matched on whole, lower-cased words of the trimmed input.
//! Arguments such as paths keep their original case.
//!
//! ```rust
//! use kchat::detect_tool_intent;
//!
//! let call = detect_tool_intent("What time is it?").expect("time intent");
//! assert_eq!(call.name, "get_current_time");
//! assert!(detect_tool_intent("tell me a story").is_none());
//! ```

use kprovider::ToolCall;
use ktooling::{
    GET_AGENT_INFO, GET_CURRENT_DATE, GET_CURRENT_TIME, READ_DIRECTORY, READ_FILE, SEARCH_FILES,
};
use serde_json::{Map, Value, json};

const FILLER: &[&str] = &[
    "a", "an", "the", "for", "file", "files", "named", "called", "matching", "me", "all", "any",
];

struct Token<'a> {
    raw: &'a str,
    lower: String,
}

fn tokenize(input: &str) -> Vec<Token<'_>> {
    input
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| "?!,;:\"'`()".contains(c)))
        .map(|word| word.trim_end_matches('.'))
        .filter(|word| !word.is_empty())
        .map(|raw| Token {
            raw,
            lower: raw.to_lowercase(),
        })
        .collect()
}

fn has_any(tokens: &[Token<'_>], words: &[&str]) -> bool {
    tokens.iter().any(|token| words.contains(&token.lower.as_str()))
}

fn has_phrase(lower: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| lower.contains(phrase))
}

fn path_token<'a>(tokens: &[Token<'a>]) -> Option<&'a str> {
    tokens
        .iter()
        .map(|token| token.raw)
        .find(|raw| raw.contains('/') || raw.contains('.'))
}

/// First non-filler word after the last occurrence of any of `keywords`.
fn word_after<'a>(tokens: &[Token<'a>], keywords: &[&str]) -> Option<&'a str> {
    let position = tokens
        .iter()
        .rposition(|token| keywords.contains(&token.lower.as_str()))?;

    tokens[position + 1..]
        .iter()
        .find(|token| !FILLER.contains(&token.lower.as_str()) && token.lower != "in")
        .map(|token| token.raw)
}

fn call(name: &str, arguments: Map<String, Value>) -> ToolCall {
    ToolCall::new(name, Value::Object(arguments))
}

pub fn detect_tool_intent(input: &str) -> Option<ToolCall> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();
    let tokens = tokenize(trimmed);

    if has_any(&tokens, &["search", "find"]) {
        let query = word_after(&tokens, &["search", "find", "for", "named", "called", "matching"])?;
        let mut arguments = Map::new();
        arguments.insert("query".to_string(), json!(query));
        if let Some(path) = word_after(&tokens, &["in"]) {
            arguments.insert("path".to_string(), json!(path));
        }
        return Some(call(SEARCH_FILES, arguments));
    }

    if has_any(&tokens, &["list", "ls", "directory", "folder", "dir"]) {
        let path = path_token(&tokens).unwrap_or(".");
        let mut arguments = Map::new();
        arguments.insert("path".to_string(), json!(path));
        return Some(call(READ_DIRECTORY, arguments));
    }

    if has_any(&tokens, &["read", "open", "cat", "show"])
        && let Some(path) = path_token(&tokens)
    {
        let mut arguments = Map::new();
        arguments.insert("path".to_string(), json!(path));
        return Some(call(READ_FILE, arguments));
    }

    if has_any(&tokens, &["time", "clock"]) {
        let mut arguments = Map::new();
        if has_any(&tokens, &["12h", "12-hour"]) {
            arguments.insert("format".to_string(), json!("12h"));
        }
        return Some(call(GET_CURRENT_TIME, arguments));
    }

    if has_any(&tokens, &["date", "today", "day"]) {
        let mut arguments = Map::new();
        if let Some(format) = ["us", "eu", "relative", "iso"]
            .into_iter()
            .find(|format| has_any(&tokens, &[*format]))
        {
            arguments.insert("format".to_string(), json!(format));
        }
        return Some(call(GET_CURRENT_DATE, arguments));
    }

    if has_any(&tokens, &["agent", "yourself", "capabilities"])
        || has_phrase(&lower, &["who are you", "what can you do", "what tools"])
    {
        return Some(call(GET_AGENT_INFO, Map::new()));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(input: &str) -> (String, Value) {
        let call = detect_tool_intent(input).expect("intent should match");
        (call.name, call.arguments)
    }

    #[test]
    fn time_and_date_questions_map_to_clock_tools() {
        assert_eq!(intent("  What TIME is it? "), ("get_current_time".to_string(), json!({})));
        assert_eq!(
            intent("time please, 12h"),
            ("get_current_time".to_string(), json!({"format": "12h"}))
        );
        assert_eq!(intent("what's the date today"), ("get_current_date".to_string(), json!({})));
        assert_eq!(
            intent("today's date in eu format"),
            ("get_current_date".to_string(), json!({"format": "eu"}))
        );
    }

    #[test]
    fn file_phrases_extract_paths_in_original_case() {
        assert_eq!(
            intent("please read README.md"),
            ("read_file".to_string(), json!({"path": "README.md"}))
        );
        assert_eq!(
            intent("list the files in src/"),
            ("read_directory".to_string(), json!({"path": "src/"}))
        );
        assert_eq!(
            intent("show me the directory"),
            ("read_directory".to_string(), json!({"path": "."}))
        );
    }

    #[test]
    fn search_extracts_query_and_optional_scope() {
        assert_eq!(
            intent("search for md"),
            ("search_files".to_string(), json!({"query": "md"}))
        );
        assert_eq!(
            intent("find files named guide in docs/"),
            ("search_files".to_string(), json!({"query": "guide", "path": "docs/"}))
        );
        assert!(detect_tool_intent("search").is_none());
    }

    #[test]
    fn self_description_and_fallthrough() {
        assert_eq!(intent("Who are you?").0, "get_agent_info");
        assert_eq!(intent("list your capabilities").0, "read_directory");
        assert_eq!(intent("describe your capabilities").0, "get_agent_info");
        assert!(detect_tool_intent("read something interesting").is_none());
        assert!(detect_tool_intent("sometimes I update things").is_none());
    }
}
