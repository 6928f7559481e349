use serde_json::{Map, Value};

/// One document returned by the search backend, keyed by its `id` link.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDocument {
	pub id: String,
	/// Every field of the backend document, `id` included.
	pub fields: Map<String, Value>,
}
impl SearchDocument {
	/// Returns `None` when the document has no string `id`.
	pub fn from_fields(fields: Map<String, Value>) -> Option<Self> {
		let id = fields.get("id")?.as_str()?.to_string();

		Some(Self { id, fields })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fields(value: Value) -> Map<String, Value> {
		value.as_object().cloned().expect("Fixture must be an object.")
	}

	#[test]
	fn reads_the_id_field() {
		let doc = SearchDocument::from_fields(fields(serde_json::json!({
			"id": "https://news.example/a",
			"title": "A"
		})))
		.expect("Missing id.");

		assert_eq!(doc.id, "https://news.example/a");
		assert_eq!(doc.fields.get("title"), Some(&Value::String("A".to_string())));
	}

	#[test]
	fn rejects_missing_or_non_string_ids() {
		assert!(SearchDocument::from_fields(fields(serde_json::json!({ "title": "A" }))).is_none());
		assert!(SearchDocument::from_fields(fields(serde_json::json!({ "id": 7 }))).is_none());
	}
}
