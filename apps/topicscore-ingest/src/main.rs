use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = topicscore_ingest::Args::parse();
	topicscore_ingest::run(args).await
}
