use std::path::PathBuf;

use anyhow::Context as _;
use notion_block::{decode_children, encode_children_pretty, Block, BlockContent};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Config {
    blocks: BlocksConfig,
}

#[derive(Debug, Deserialize)]
struct BlocksConfig {
    input: PathBuf,
    page_size: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Config.toml".to_string());
    let config: Config = util::load_config(&config_name)?;

    info!(task = "start block inspection", config_name);

    let input = util::workspace_path(&config.blocks.input)?;
    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let response = decode_children(&text)
        .with_context(|| format!("failed to decode {}", input.display()))?;

    for block in &response.results {
        for (depth, block) in block.walk() {
            log_block(depth, block);
        }
    }

    match response.next_query(config.blocks.page_size) {
        Some(query) => info!(
            task = "next page",
            query = format!("{:?}", query.query_pairs()),
        ),
        None => info!(task = "last page", results = response.results.len()),
    }

    println!("{}", encode_children_pretty(&response)?);

    Ok(())
}

fn log_block(depth: usize, block: &Block) {
    let id = block.id.as_deref().unwrap_or_default();

    match &block.content {
        BlockContent::Image(file)
        | BlockContent::Video(file)
        | BlockContent::File(file)
        | BlockContent::Pdf(file) => info!(
            task = "block",
            depth,
            id,
            block_type = block.content.wire_type(),
            file_type = file.source.wire_type(),
            url = file.url().unwrap_or_default(),
        ),
        BlockContent::Unsupported(_) => warn!(
            task = "unsupported block",
            depth,
            id,
            block_type = block.content.wire_type(),
        ),
        _ => info!(
            task = "block",
            depth,
            id,
            block_type = block.content.wire_type(),
            text = %block.plain_text(),
        ),
    }
}
