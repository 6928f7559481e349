use serde_json::Value;

use topicscore_domain::{Language, Topic};

use crate::{DocumentRecord, DocumentSink, ScoredDocument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
	pub doc_id: String,
	pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
	pub inserted: usize,
	pub failures: Vec<UploadFailure>,
}
impl UploadReport {
	pub fn is_success(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Inserts each document independently. A failed insert is recorded and the rest continue.
pub async fn upload_documents(
	sink: &dyn DocumentSink,
	topic: Topic,
	language: Language,
	documents: Vec<ScoredDocument>,
) -> UploadReport {
	let mut report = UploadReport::default();

	for doc in documents {
		let record = DocumentRecord {
			doc_id: doc.id().to_string(),
			topic,
			payload: Value::Object(doc.into_payload(topic)),
		};

		match sink.insert(language, &record).await {
			Ok(()) => report.inserted += 1,
			Err(err) => {
				tracing::error!(
					%topic,
					%language,
					doc_id = %record.doc_id,
					error = %err,
					"Document insert failed."
				);

				report.failures.push(UploadFailure {
					doc_id: record.doc_id,
					message: err.to_string(),
				});
			},
		}
	}

	tracing::info!(
		%topic,
		%language,
		inserted = report.inserted,
		failed = report.failures.len(),
		"Uploaded documents."
	);

	report
}
