use crate::{Error, Result};

const TABLE_PLACEHOLDER: &str = "<TABLE>";

/// Renders the bootstrap SQL once per language table.
pub fn render_schema(tables: &[&str]) -> Result<String> {
	let init = include_str!("../../../sql/init.sql");
	let expanded = expand_includes(init);
	let mut out = String::new();

	for table in tables {
		ensure_identifier(table)?;

		out.push_str(&expanded.replace(TABLE_PLACEHOLDER, table));
	}

	Ok(out)
}

/// Table names are interpolated into SQL and must be plain lowercase identifiers.
pub fn ensure_identifier(name: &str) -> Result<()> {
	let mut chars = name.chars();
	let valid = chars.next().is_some_and(|first| first.is_ascii_lowercase() || first == '_')
		&& chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_');

	if !valid {
		return Err(Error::InvalidArgument(format!("{name:?} is not a valid table name.")));
	}

	Ok(())
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_scored_documents.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_scored_documents.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn renders_one_table_per_language() {
		let sql = render_schema(&["scored_documents_en", "scored_documents_es"])
			.expect("render failed");

		assert!(sql.contains("CREATE TABLE IF NOT EXISTS scored_documents_en ("));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS scored_documents_es ("));
		assert!(sql.contains("idx_scored_documents_es_doc_id"));
		assert!(!sql.contains(TABLE_PLACEHOLDER));
		assert!(!sql.contains("\\ir"));
	}

	#[test]
	fn rejects_unsafe_table_names() {
		assert!(render_schema(&["docs; DROP TABLE x"]).is_err());
		assert!(ensure_identifier("").is_err());
		assert!(ensure_identifier("scored_documents_2024").is_ok());
	}
}
