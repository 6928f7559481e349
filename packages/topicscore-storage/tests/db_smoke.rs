use serde_json::json;
use time::OffsetDateTime;

use topicscore_config::Collections;
use topicscore_storage::{db::Db, documents};
use topicscore_testkit::TestDatabase;

#[tokio::test]
#[ignore = "Requires external Postgres. Set TOPICSCORE_PG_DSN to run."]
async fn db_connects_and_bootstraps_both_language_tables() {
	let Some(base_dsn) = topicscore_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps_both_language_tables; set TOPICSCORE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = test_db.postgres_config(1);
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");
	let collections = Collections::default();

	db.ensure_schema(&collections).await.expect("Failed to ensure schema.");
	db.ensure_schema(&collections).await.expect("Schema bootstrap must be repeatable.");

	for table in ["scored_documents_en", "scored_documents_es"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1);
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set TOPICSCORE_PG_DSN to run."]
async fn inserts_do_not_deduplicate() {
	let Some(base_dsn) = topicscore_testkit::env_dsn() else {
		eprintln!("Skipping inserts_do_not_deduplicate; set TOPICSCORE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = test_db.postgres_config(1);
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");
	let collections = Collections::default();

	db.ensure_schema(&collections).await.expect("Failed to ensure schema.");

	let payload = json!({ "id": "https://a.example/1", "climate_score": 1 });
	let now = OffsetDateTime::now_utc();

	for _ in 0..2 {
		documents::insert_document(
			&db.pool,
			&collections.en,
			"https://a.example/1",
			"climate",
			&payload,
			now,
		)
		.await
		.expect("Failed to insert document.");
	}

	let rows = documents::list_documents(&db.pool, &collections.en, "https://a.example/1")
		.await
		.expect("Failed to list documents.");
	let count = documents::count_documents(&db.pool, &collections.en, "climate")
		.await
		.expect("Failed to count documents.");

	assert_eq!(rows.len(), 2);
	assert_eq!(count, 2);
	assert_eq!(rows[0].payload["climate_score"], 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
