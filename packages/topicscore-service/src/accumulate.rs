use std::{
	collections::{HashMap, HashSet},
	time::Duration,
};

use serde_json::{Map, Value};
use tokio::time;

use topicscore_domain::{SearchDocument, Topic};

use crate::SearchProvider;

/// A search document plus the keyword phrases of one topic that matched it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
	id: String,
	fields: Map<String, Value>,
	found_keywords: Vec<String>,
	query: Option<String>,
}
impl ScoredDocument {
	fn first_match(doc: SearchDocument, phrase: &str) -> Self {
		Self {
			id: doc.id,
			fields: doc.fields,
			found_keywords: vec![phrase.to_string()],
			query: None,
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	/// Backend fields of the first result list the document appeared in.
	pub fn fields(&self) -> &Map<String, Value> {
		&self.fields
	}

	/// Number of phrases that matched; always equal to `found_keywords().len()`.
	pub fn score(&self) -> usize {
		self.found_keywords.len()
	}

	pub fn found_keywords(&self) -> &[String] {
		&self.found_keywords
	}

	/// Label of the batch source this document's link was recorded in.
	pub fn query(&self) -> Option<&str> {
		self.query.as_deref()
	}

	pub(crate) fn set_query(&mut self, label: String) {
		self.query = Some(label);
	}

	/// The stored payload: the backend fields plus `<topic>_score`, `<topic>_found_keywords`,
	/// and `query` when a batch source matched.
	pub fn into_payload(self, topic: Topic) -> Map<String, Value> {
		let mut payload = self.fields;

		payload.insert(topic.score_field(), Value::from(self.found_keywords.len()));
		payload.insert(
			topic.found_keywords_field(),
			Value::Array(self.found_keywords.into_iter().map(Value::String).collect()),
		);

		match self.query {
			Some(query) => {
				payload.insert("query".to_string(), Value::String(query));
			},
			None => {
				payload.remove("query");
			},
		}

		payload
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedQuery {
	pub phrase: String,
	pub query: Option<String>,
	pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulationStats {
	pub queries: usize,
	pub results: usize,
	pub failed: Vec<FailedQuery>,
}
impl AccumulationStats {
	/// Queries that were issued but failed or timed out.
	pub fn failed_searches(&self) -> usize {
		self.failed.iter().filter(|failure| failure.query.is_some()).count()
	}

	/// At least one query was issued and none of them returned.
	pub fn all_searches_failed(&self) -> bool {
		self.queries > 0 && self.failed_searches() == self.queries
	}
}

/// Merges per-phrase search results of one topic into an id-indexed, scored document set.
#[derive(Debug)]
pub struct ScoreAccumulator {
	topic: Topic,
	index: HashMap<String, usize>,
	documents: Vec<ScoredDocument>,
}
impl ScoreAccumulator {
	pub fn new(topic: Topic) -> Self {
		Self { topic, index: HashMap::new(), documents: Vec::new() }
	}

	pub fn len(&self) -> usize {
		self.documents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}

	pub fn get(&self, id: &str) -> Option<&ScoredDocument> {
		self.index.get(id).map(|&slot| &self.documents[slot])
	}

	/// Documents in first-seen order.
	pub fn documents(&self) -> &[ScoredDocument] {
		&self.documents
	}

	pub fn documents_mut(&mut self) -> &mut [ScoredDocument] {
		&mut self.documents
	}

	pub fn into_documents(self) -> Vec<ScoredDocument> {
		self.documents
	}

	/// Credits `phrase` to every document in `results`. A document repeated inside one result
	/// list is credited once.
	pub fn record(&mut self, phrase: &str, results: Vec<SearchDocument>) {
		let mut seen = HashSet::with_capacity(results.len());

		for doc in results {
			if !seen.insert(doc.id.clone()) {
				continue;
			}

			match self.index.get(&doc.id) {
				Some(&slot) => self.documents[slot].found_keywords.push(phrase.to_string()),
				None => {
					self.index.insert(doc.id.clone(), self.documents.len());
					self.documents.push(ScoredDocument::first_match(doc, phrase));
				},
			}
		}
	}

	/// Issues one search per phrase, in order, and records the results.
	///
	/// Failed, malformed, or timed-out searches count as zero results and are returned in the
	/// stats instead of aborting the run.
	pub async fn accumulate(
		&mut self,
		search: &dyn SearchProvider,
		field: &str,
		phrases: &[String],
		timeout: Duration,
	) -> AccumulationStats {
		let mut stats = AccumulationStats::default();

		for phrase in phrases {
			let query = match topicscore_domain::query_for_phrase(self.topic, field, phrase) {
				Ok(query) => query,
				Err(err) => {
					tracing::warn!(
						topic = %self.topic,
						phrase = %phrase,
						error = %err,
						"Skipping keyword phrase."
					);

					stats.failed.push(FailedQuery {
						phrase: phrase.clone(),
						query: None,
						message: err.to_string(),
					});

					continue;
				},
			};

			stats.queries += 1;

			let results = match time::timeout(timeout, search.search(&query)).await {
				Ok(Ok(results)) => results,
				Ok(Err(err)) => {
					tracing::warn!(
						topic = %self.topic,
						query = %query,
						error = %err,
						"Search failed; treating as no results."
					);

					stats.failed.push(FailedQuery {
						phrase: phrase.clone(),
						query: Some(query),
						message: err.to_string(),
					});

					continue;
				},
				Err(_) => {
					tracing::warn!(
						topic = %self.topic,
						query = %query,
						"Search timed out; treating as no results."
					);

					stats.failed.push(FailedQuery {
						phrase: phrase.clone(),
						query: Some(query),
						message: format!("Timed out after {} ms.", timeout.as_millis()),
					});

					continue;
				},
			};

			tracing::debug!(
				topic = %self.topic,
				query = %query,
				count = results.len(),
				"Search returned."
			);

			stats.results += results.len();

			self.record(phrase, results);
		}

		stats
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn doc(id: &str) -> SearchDocument {
		let mut fields = Map::new();

		fields.insert("id".to_string(), Value::String(id.to_string()));

		SearchDocument { id: id.to_string(), fields }
	}

	#[test]
	fn first_match_scores_one() {
		let mut acc = ScoreAccumulator::new(Topic::Climate);

		acc.record("climate change", vec![doc("u1")]);

		let scored = acc.get("u1").expect("Missing u1.");

		assert_eq!(scored.score(), 1);
		assert_eq!(scored.found_keywords(), ["climate change"]);
		assert_eq!(scored.query(), None);
	}

	#[test]
	fn repeated_ids_accumulate_in_phrase_order() {
		let mut acc = ScoreAccumulator::new(Topic::Climate);

		acc.record("climate change", vec![doc("u1")]);
		acc.record("global warming", vec![doc("u1"), doc("u2")]);

		let u1 = acc.get("u1").expect("Missing u1.");
		let u2 = acc.get("u2").expect("Missing u2.");

		assert_eq!(acc.len(), 2);
		assert_eq!(u1.score(), 2);
		assert_eq!(u1.found_keywords(), ["climate change", "global warming"]);
		assert_eq!(u2.score(), 1);
		assert_eq!(u2.found_keywords(), ["global warming"]);
	}

	#[test]
	fn duplicates_inside_one_result_list_count_once() {
		let mut acc = ScoreAccumulator::new(Topic::Covid);

		acc.record("covid vaccine", vec![doc("u1"), doc("u1")]);

		assert_eq!(acc.get("u1").expect("Missing u1.").score(), 1);
	}

	#[test]
	fn first_seen_fields_are_kept() {
		let mut acc = ScoreAccumulator::new(Topic::Covid);
		let mut later = doc("u1");

		later.fields.insert("title".to_string(), Value::String("later".to_string()));

		acc.record("covid", vec![doc("u1")]);
		acc.record("coronavirus", vec![later]);

		assert!(acc.get("u1").expect("Missing u1.").fields().get("title").is_none());
	}

	#[test]
	fn payload_carries_topic_fields_and_tag() {
		let mut acc = ScoreAccumulator::new(Topic::Immigration);

		acc.record("immigrant", vec![doc("u1")]);
		acc.record("asylum seeker", vec![doc("u1")]);

		let mut scored = acc.into_documents().remove(0);

		scored.set_query("how".to_string());

		let payload = scored.into_payload(Topic::Immigration);

		assert_eq!(payload["id"], "u1");
		assert_eq!(payload["immigration_score"], 2);
		assert_eq!(
			payload["immigration_found_keywords"],
			serde_json::json!(["immigrant", "asylum seeker"])
		);
		assert_eq!(payload["query"], "how");
	}

	#[test]
	fn untagged_payload_has_no_query_field() {
		let mut acc = ScoreAccumulator::new(Topic::Climate);

		acc.record("climate", vec![doc("u1")]);

		let payload = acc.into_documents().remove(0).into_payload(Topic::Climate);

		assert!(!payload.contains_key("query"));
	}

	#[test]
	fn untagged_payload_drops_a_backend_query_field() {
		let mut acc = ScoreAccumulator::new(Topic::Climate);
		let mut result = doc("u1");

		result.fields.insert("query".to_string(), Value::String("backend-own".to_string()));

		acc.record("climate change", vec![result]);

		let payload = acc.into_documents().remove(0).into_payload(Topic::Climate);

		assert!(payload.get("query").is_none());
		assert_eq!(payload["climate_score"], 1);
	}

	#[test]
	fn build_failures_do_not_count_as_failed_searches() {
		let failure = |query: Option<&str>| FailedQuery {
			phrase: "p".to_string(),
			query: query.map(str::to_string),
			message: "boom".to_string(),
		};
		let mut stats = AccumulationStats {
			queries: 1,
			results: 0,
			failed: vec![failure(None), failure(Some("text:\"p\""))],
		};

		assert_eq!(stats.failed_searches(), 1);
		assert!(stats.all_searches_failed());

		stats.queries = 2;

		assert!(!stats.all_searches_failed());
		assert!(!AccumulationStats::default().all_searches_failed());
	}
}
