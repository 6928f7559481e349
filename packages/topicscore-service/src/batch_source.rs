use std::{
	collections::{HashMap, HashSet},
	fs,
	path::{Path, PathBuf},
	sync::{Arc, Mutex},
};

use tokio::sync::OnceCell;

use crate::{Error, Result};

pub type LinkSet = HashSet<String>;

const LINK_COLUMN: &str = "link";
const DESC_COLUMN: &str = "desc";
const CSV_SUFFIX: &str = ".csv";

/// One previously recorded export batch: every link found in the CSV files of one directory.
#[derive(Debug, Clone)]
pub struct BatchSource {
	/// The directory's final path component.
	pub label: String,
	pub dir: PathBuf,
	pub links: Arc<LinkSet>,
}
impl BatchSource {
	pub fn new(dir: &Path, links: Arc<LinkSet>) -> Self {
		Self { label: batch_label(dir), dir: dir.to_path_buf(), links }
	}

	pub fn contains(&self, link: &str) -> bool {
		self.links.contains(link)
	}
}

/// Link sets keyed by directory, loaded at most once and shared read-only across runs.
#[derive(Debug, Default)]
pub struct BatchSourceCache {
	cells: Mutex<HashMap<PathBuf, Arc<OnceCell<Arc<LinkSet>>>>>,
}
impl BatchSourceCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads the sources in the given priority order.
	pub async fn load_sources(&self, dirs: &[PathBuf]) -> Result<Vec<BatchSource>> {
		let mut sources = Vec::with_capacity(dirs.len());

		for dir in dirs {
			let links = self.links(dir).await?;

			sources.push(BatchSource::new(dir, links));
		}

		Ok(sources)
	}

	pub async fn links(&self, dir: &Path) -> Result<Arc<LinkSet>> {
		let cell = {
			let mut cells = self.cells.lock().unwrap_or_else(|err| err.into_inner());

			cells.entry(dir.to_path_buf()).or_default().clone()
		};
		let links = cell
			.get_or_try_init(|| async {
				let owned = dir.to_path_buf();
				let links = tokio::task::spawn_blocking(move || load_link_set(&owned)).await??;

				tracing::info!(path = %dir.display(), count = links.len(), "Loaded batch links.");

				Ok::<_, Error>(Arc::new(links))
			})
			.await?;

		Ok(links.clone())
	}
}

/// Union of the `link` column over every `.csv` file in `dir`.
pub fn load_link_set(dir: &Path) -> Result<LinkSet> {
	let mut links = LinkSet::new();

	for path in csv_files(dir)? {
		read_links(&path, &mut links)?;
	}

	Ok(links)
}

pub fn batch_label(dir: &Path) -> String {
	dir.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
	let read_err = |err| Error::ReadBatchDir { path: dir.to_path_buf(), source: err };
	let mut files = Vec::new();

	for entry in fs::read_dir(dir).map_err(read_err)? {
		let path = entry.map_err(read_err)?.path();
		let is_csv = path
			.file_name()
			.and_then(|name| name.to_str())
			.is_some_and(|name| name.ends_with(CSV_SUFFIX));

		if is_csv && path.is_file() {
			files.push(path);
		}
	}

	if files.is_empty() {
		tracing::warn!(path = %dir.display(), "Batch directory has no CSV files.");
	}

	files.sort();

	Ok(files)
}

fn read_links(path: &Path, links: &mut LinkSet) -> Result<()> {
	let csv_err = |err| Error::ReadBatchFile { path: path.to_path_buf(), source: err };
	let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path).map_err(csv_err)?;
	let headers = reader.headers().map_err(csv_err)?.clone();
	let column = |name: &'static str| {
		headers
			.iter()
			.position(|header| header.trim() == name)
			.ok_or_else(|| Error::MissingColumn { path: path.to_path_buf(), column: name })
	};
	let link_idx = column(LINK_COLUMN)?;

	// The description column is always empty but its absence marks a malformed export.
	column(DESC_COLUMN)?;

	for record in reader.records() {
		let record = record.map_err(csv_err)?;

		if let Some(link) = record.get(link_idx)
			&& !link.is_empty()
		{
			links.insert(link.to_string());
		}
	}

	Ok(())
}
