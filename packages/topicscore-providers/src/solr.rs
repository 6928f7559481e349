use std::time::Duration;

use reqwest::{Client, header::HeaderMap};
use serde_json::Value;

use topicscore_domain::SearchDocument;

use crate::{Error, Result};

/// Full-text search over a Solr `select` handler.
pub struct SolrClient {
	client: Client,
	url: String,
	rows: u32,
	headers: HeaderMap,
}
impl SolrClient {
	pub fn new(cfg: &topicscore_config::Search) -> Result<Self> {
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
		let headers = crate::auth_headers(&cfg.auth_key, &cfg.default_headers)?;

		Ok(Self { client, url: cfg.url.clone(), rows: cfg.rows, headers })
	}

	/// Runs one query and returns at most `rows` documents.
	pub async fn search(&self, query: &str) -> Result<Vec<SearchDocument>> {
		let json = self.select(query, self.rows).await?;

		parse_search_response(json)
	}

	/// Issues a zero-row match-all query so an unreachable or misconfigured backend is reported
	/// before any run starts.
	pub async fn ping(&self) -> Result<()> {
		let json = self.select("*:*", 0).await?;

		parse_search_response(json)?;

		Ok(())
	}

	async fn select(&self, query: &str, rows: u32) -> Result<Value> {
		let rows = rows.to_string();
		let res = self
			.client
			.get(&self.url)
			.headers(self.headers.clone())
			.query(&[
				("indent", "true"),
				("q.op", "OR"),
				("q", query),
				("rows", rows.as_str()),
				("wt", "json"),
			])
			.send()
			.await?;
		let body = res.error_for_status()?.text().await?;

		Ok(serde_json::from_str(&body)?)
	}
}

fn parse_search_response(json: Value) -> Result<Vec<SearchDocument>> {
	let docs = json
		.get("response")
		.and_then(|response| response.get("docs"))
		.and_then(Value::as_array)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Search response is missing response.docs array.".to_string(),
		})?;
	let mut out = Vec::with_capacity(docs.len());

	for doc in docs {
		let Some(fields) = doc.as_object() else {
			tracing::warn!("Skipping search result that is not an object.");

			continue;
		};

		match SearchDocument::from_fields(fields.clone()) {
			Some(doc) => out.push(doc),
			None => tracing::warn!("Skipping search result without a string id."),
		}
	}

	Ok(out)
}
