use serde_json::Value;
use sqlx::PgExecutor;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, models::StoredDocument, schema};

/// Inserts one document as a new row. Existing rows with the same `doc_id` are left alone.
pub async fn insert_document<'e, E>(
	executor: E,
	table: &str,
	doc_id: &str,
	topic: &str,
	payload: &Value,
	ingested_at: OffsetDateTime,
) -> Result<Uuid>
where
	E: PgExecutor<'e>,
{
	schema::ensure_identifier(table)?;

	let row_id = Uuid::new_v4();
	let sql = format!(
		"\
INSERT INTO {table} (row_id, doc_id, topic, payload, ingested_at)
VALUES ($1,$2,$3,$4,$5)"
	);

	sqlx::query(&sql)
		.bind(row_id)
		.bind(doc_id)
		.bind(topic)
		.bind(payload)
		.bind(ingested_at)
		.execute(executor)
		.await?;

	Ok(row_id)
}

pub async fn list_documents<'e, E>(
	executor: E,
	table: &str,
	doc_id: &str,
) -> Result<Vec<StoredDocument>>
where
	E: PgExecutor<'e>,
{
	schema::ensure_identifier(table)?;

	let sql = format!(
		"\
SELECT row_id, doc_id, topic, payload, ingested_at
FROM {table}
WHERE doc_id = $1
ORDER BY ingested_at ASC, row_id ASC"
	);
	let rows = sqlx::query_as::<_, StoredDocument>(&sql).bind(doc_id).fetch_all(executor).await?;

	Ok(rows)
}

pub async fn count_documents<'e, E>(executor: E, table: &str, topic: &str) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	schema::ensure_identifier(table)?;

	let sql = format!("SELECT count(*) FROM {table} WHERE topic = $1");
	let count: i64 = sqlx::query_scalar(&sql).bind(topic).fetch_one(executor).await?;

	Ok(count)
}
