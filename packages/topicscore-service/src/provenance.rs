use topicscore_config::MatchPolicy;

use crate::{BatchSource, ScoredDocument};

/// The label of the batch source recording `link`, chosen among matches by `policy`.
///
/// `sources` is in priority order. With [`MatchPolicy::Last`] every source is checked and the
/// last match wins, so a link recorded by sources 1 and 3 is labelled with source 3.
pub fn provenance_label<'a>(
	link: &str,
	sources: &'a [BatchSource],
	policy: MatchPolicy,
) -> Option<&'a str> {
	let mut matches = sources.iter().filter(|source| source.contains(link));
	let source = match policy {
		MatchPolicy::First => matches.next(),
		MatchPolicy::Last => matches.last(),
	};

	source.map(|source| source.label.as_str())
}

/// Tags every document whose id a batch source recorded and returns how many were tagged.
/// Scores and found keywords are untouched.
pub fn resolve_provenance(
	documents: &mut [ScoredDocument],
	sources: &[BatchSource],
	policy: MatchPolicy,
) -> usize {
	let mut tagged = 0;

	for doc in documents.iter_mut() {
		if let Some(label) = provenance_label(doc.id(), sources, policy) {
			doc.set_query(label.to_string());
		}
		if doc.query().is_some() {
			tagged += 1;
		}
	}

	tagged
}

#[cfg(test)]
mod tests {
	use std::{path::Path, sync::Arc};

	use serde_json::{Map, Value};

	use topicscore_domain::{SearchDocument, Topic};

	use super::*;
	use crate::{LinkSet, ScoreAccumulator};

	fn source(dir: &str, links: &[&str]) -> BatchSource {
		let links = links.iter().map(|link| link.to_string()).collect::<LinkSet>();

		BatchSource::new(Path::new(dir), Arc::new(links))
	}

	fn sources() -> Vec<BatchSource> {
		vec![
			source("/exports/EN/climate/how", &["u1", "u2"]),
			source("/exports/EN/climate/is", &["u3"]),
			source("/exports/EN/climate/what", &["u1", "u4"]),
		]
	}

	fn documents(ids: &[&str]) -> Vec<ScoredDocument> {
		let mut acc = ScoreAccumulator::new(Topic::Climate);
		let results = ids
			.iter()
			.map(|id| {
				let mut fields = Map::new();

				fields.insert("id".to_string(), Value::String(id.to_string()));

				SearchDocument { id: id.to_string(), fields }
			})
			.collect();

		acc.record("climate change", results);

		acc.into_documents()
	}

	#[test]
	fn last_matching_source_wins() {
		assert_eq!(provenance_label("u1", &sources(), MatchPolicy::Last), Some("what"));
	}

	#[test]
	fn first_match_policy_keeps_the_highest_priority_source() {
		assert_eq!(provenance_label("u1", &sources(), MatchPolicy::First), Some("how"));
	}

	#[test]
	fn unmatched_links_have_no_label() {
		assert_eq!(provenance_label("u9", &sources(), MatchPolicy::Last), None);
		assert_eq!(provenance_label("u9", &[], MatchPolicy::First), None);
	}

	#[test]
	fn tags_documents_and_counts_them() {
		let mut docs = documents(&["u1", "u2", "u3", "u9"]);
		let tagged = resolve_provenance(&mut docs, &sources(), MatchPolicy::Last);
		let tags = docs.iter().map(ScoredDocument::query).collect::<Vec<_>>();

		assert_eq!(tagged, 3);
		assert_eq!(tags, vec![Some("what"), Some("how"), Some("is"), None]);
	}

	#[test]
	fn tagging_leaves_scores_alone() {
		let mut docs = documents(&["u1"]);

		resolve_provenance(&mut docs, &sources(), MatchPolicy::Last);

		assert_eq!(docs[0].score(), 1);
		assert_eq!(docs[0].found_keywords(), ["climate change"]);
	}

	#[test]
	fn tagging_in_place_keeps_the_id_index_valid() {
		let mut acc = ScoreAccumulator::new(Topic::Climate);
		let results = documents(&["u3", "u1"])
			.into_iter()
			.map(|doc| SearchDocument { id: doc.id().to_string(), fields: doc.fields().clone() })
			.collect();

		acc.record("carbon", results);
		resolve_provenance(acc.documents_mut(), &sources(), MatchPolicy::Last);

		assert_eq!(acc.get("u1").map(ScoredDocument::query), Some(Some("what")));
		assert_eq!(acc.get("u3").map(ScoredDocument::id), Some("u3"));
	}
}
