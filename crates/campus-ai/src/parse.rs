//! Parsing of model answers

use serde::de::DeserializeOwned;

use crate::prelude::*;

/// Removes markdown code fences (```` ```json ```` / ```` ``` ````) around a JSON answer
pub fn strip_code_fences(text: &str) -> &str {
	let text = text.trim();
	let Some(rest) = text.strip_prefix("```") else {
		return text;
	};
	// Skip the info string ("json") up to the first newline
	let rest = rest.find('\n').map_or(rest, |idx| &rest[idx + 1..]);
	rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

pub fn parse_json<T: DeserializeOwned>(text: &str) -> ClResult<T> {
	serde_json::from_str(strip_code_fences(text)).map_err(|e| {
		warn!("AI answer is not valid JSON: {}", e);
		Error::Parse
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Deserialize;

	#[derive(Debug, Deserialize)]
	struct Answer {
		modules: Vec<String>,
	}

	#[test]
	fn test_strip_fences() {
		assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
		assert_eq!(strip_code_fences("```\n[1]\n```\n"), "[1]");
		assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
	}

	#[test]
	fn test_parse_fenced_json() {
		let answer: Answer = parse_json("```json\n{\"modules\": [\"Intro\"]}\n```").unwrap();
		assert_eq!(answer.modules, vec!["Intro".to_string()]);
	}

	#[test]
	fn test_parse_garbage() {
		let res: ClResult<Answer> = parse_json("Sure! Here is your curriculum:");
		assert!(matches!(res, Err(Error::Parse)));
	}
}

// vim: ts=4
