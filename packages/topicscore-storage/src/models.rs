use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct StoredDocument {
	pub row_id: Uuid,
	pub doc_id: String,
	pub topic: String,
	pub payload: Value,
	pub ingested_at: OffsetDateTime,
}
