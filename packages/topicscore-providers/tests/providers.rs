use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Map;

fn search_config(url: &str) -> topicscore_config::Search {
	topicscore_config::Search {
		url: url.to_string(),
		auth_key: "dXNlcjpwYXNz".to_string(),
		field: "text".to_string(),
		rows: 7_000,
		timeout_ms: 500,
		default_headers: Map::new(),
	}
}

#[test]
fn builds_basic_auth_header() {
	let headers = topicscore_providers::auth_headers("dXNlcjpwYXNz", &Map::new())
		.expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Basic dXNlcjpwYXNz");
	assert_eq!(headers.get(CONTENT_TYPE).expect("Missing content type."), "application/json");
}

#[test]
fn rejects_non_string_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("X-Shard".to_string(), serde_json::json!(2));

	let err = topicscore_providers::auth_headers("key", &defaults)
		.expect_err("Expected a header error.");

	assert!(matches!(err, topicscore_providers::Error::InvalidConfig { .. }));
}

#[tokio::test]
async fn ping_reports_an_unreachable_backend() {
	let client = topicscore_providers::SolrClient::new(&search_config("http://127.0.0.1:9/select"))
		.expect("Failed to build client.");

	assert!(matches!(client.ping().await, Err(topicscore_providers::Error::Reqwest(_))));
}

#[tokio::test]
async fn unreachable_backend_is_an_error() {
	let client = topicscore_providers::SolrClient::new(&search_config("http://127.0.0.1:9/select"))
		.expect("Failed to build client.");
	let result = client.search("text:\"climate\"").await;

	assert!(result.is_err());
}
