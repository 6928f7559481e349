use serde_json::Value;
use time::OffsetDateTime;

use topicscore_config::Collections;
use topicscore_domain::{Language, Topic};
use topicscore_storage::{db::Db, documents};

use crate::{BoxFuture, DocumentSink, Result};

/// One finalized document ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
	pub doc_id: String,
	pub topic: Topic,
	pub payload: Value,
}

/// Writes documents into the Postgres table of their language.
pub struct PgDocumentSink {
	pub db: Db,
	pub collections: Collections,
}
impl PgDocumentSink {
	pub fn new(db: Db, collections: Collections) -> Self {
		Self { db, collections }
	}
}
impl DocumentSink for PgDocumentSink {
	fn insert<'a>(
		&'a self,
		language: Language,
		record: &'a DocumentRecord,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			documents::insert_document(
				&self.db.pool,
				self.collections.for_language(language),
				&record.doc_id,
				record.topic.as_str(),
				&record.payload,
				OffsetDateTime::now_utc(),
			)
			.await?;

			Ok(())
		})
	}
}
