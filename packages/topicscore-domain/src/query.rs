use crate::{Error, QueryStyle, Result, Topic, keywords};

const RESERVED: [char; 3] = ['/', '(', ')'];

/// Builds `field:"a" AND field:"b"` from the tokens; one token yields a single clause.
pub fn build_phrase_query<S>(field: &str, tokens: &[S]) -> Result<String>
where
	S: AsRef<str>,
{
	if tokens.is_empty() {
		return Err(Error::EmptyQuery);
	}

	let clauses = tokens
		.iter()
		.map(|token| format!("{field}:\"{}\"", escape_phrase(token.as_ref())))
		.collect::<Vec<_>>();

	Ok(clauses.join(" AND "))
}

/// Replaces `/`, `(` and `)` with spaces.
pub fn strip_reserved(query: &str) -> String {
	query.chars().map(|ch| if RESERVED.contains(&ch) { ' ' } else { ch }).collect()
}

/// The backend query issued for one keyword phrase of `topic`.
pub fn query_for_phrase(topic: Topic, field: &str, phrase: &str) -> Result<String> {
	match topic.query_style() {
		QueryStyle::Cleaned => {
			let tokens = keywords::normalize_phrase(phrase)
				.iter()
				.map(|token| strip_reserved(token).trim().to_string())
				.filter(|token| !token.is_empty())
				.collect::<Vec<_>>();

			build_phrase_query(field, &tokens)
		},
		QueryStyle::RawPhrase => {
			if phrase.trim().is_empty() {
				return Err(Error::EmptyQuery);
			}

			build_phrase_query(field, &[phrase])
		},
	}
}

fn escape_phrase(token: &str) -> String {
	token.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_token_is_one_clause() {
		let query = build_phrase_query("text", &["inmigrante"]).expect("build failed");

		assert_eq!(query, "text:\"inmigrante\"");
		assert!(!query.contains("AND"));
	}

	#[test]
	fn joins_tokens_with_and_on_the_same_field() {
		let query = build_phrase_query("text", &["climate", "change"]).expect("build failed");

		assert_eq!(query, "text:\"climate\" AND text:\"change\"");
	}

	#[test]
	fn rejects_empty_token_lists() {
		let tokens: [&str; 0] = [];

		assert!(matches!(build_phrase_query("text", &tokens), Err(Error::EmptyQuery)));
	}

	#[test]
	fn escapes_quotes_inside_tokens() {
		let query = build_phrase_query("text", &["say \"hi\""]).expect("build failed");

		assert_eq!(query, "text:\"say \\\"hi\\\"\"");
	}

	#[test]
	fn cleaned_topics_strip_reserved_characters() {
		let query = query_for_phrase(Topic::Covid, "text", "covid/sars (cov-2)")
			.expect("build failed");

		assert!(!query.contains('/'));
		assert!(!query.contains('('));
		assert!(!query.contains(')'));
		assert_eq!(query, "text:\"covid sars\" AND text:\"cov-2\"");
	}

	#[test]
	fn tokens_made_only_of_reserved_characters_are_dropped() {
		let query = query_for_phrase(Topic::Covid, "text", "covid / coronavirus")
			.expect("build failed");

		assert_eq!(query, "text:\"covid\" AND text:\"coronavirus\"");
	}

	#[test]
	fn a_phrase_of_reserved_characters_builds_no_query() {
		let result = query_for_phrase(Topic::Climate, "text", "/ ()");

		assert!(matches!(result, Err(Error::EmptyQuery)));
	}

	#[test]
	fn immigration_queries_the_raw_phrase() {
		let query = query_for_phrase(Topic::Immigration, "text", "los inmigrantes")
			.expect("build failed");

		assert_eq!(query, "text:\"los inmigrantes\"");
	}

	#[test]
	fn builder_does_not_touch_its_input() {
		let tokens = vec!["a/b".to_string(), "c".to_string()];
		let _ = build_phrase_query("text", &tokens).expect("build failed");

		assert_eq!(tokens, vec!["a/b", "c"]);
	}
}
