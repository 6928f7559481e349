use std::{fs, path::Path};

use crate::{Error, Result};

/// Function words dropped from phrases before building an AND query.
pub const STOP_WORDS: [&str; 12] =
	["del", "el", "en", "los", "la", "de", "a", "las", "por", "ante", "través", "&"];

/// Keyword phrases loaded from one topic × language list, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordList {
	pub phrases: Vec<String>,
	/// Lines that were empty after trimming and were left out of `phrases`.
	pub blank_lines: usize,
}

pub fn load_keyword_list(path: &Path) -> Result<KeywordList> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadKeywords { path: path.to_path_buf(), source: err })?;

	Ok(parse_keyword_list(&raw))
}

pub fn parse_keyword_list(raw: &str) -> KeywordList {
	let mut list = KeywordList::default();

	for line in raw.lines() {
		let phrase = line.trim();

		if phrase.is_empty() {
			list.blank_lines += 1;

			continue;
		}

		list.phrases.push(phrase.to_string());
	}

	list
}

/// Splits a phrase on whitespace and drops every stop-word token.
///
/// A phrase made only of stop-words keeps its original tokens so it never turns into an
/// empty query.
pub fn normalize_phrase(phrase: &str) -> Vec<String> {
	let tokens = phrase.split_whitespace().collect::<Vec<_>>();
	let cleaned = tokens
		.iter()
		.filter(|token| !STOP_WORDS.contains(*token))
		.map(|token| token.to_string())
		.collect::<Vec<_>>();

	if cleaned.is_empty() {
		return tokens.into_iter().map(str::to_string).collect();
	}

	cleaned
}
