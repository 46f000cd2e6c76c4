use abr_search::cli::{Cli, Commands, ConfigAction};
use abr_search::config::Config;
use abr_search::embedding::{EmbeddingProvider, FastEmbedProvider};
use abr_search::engine::{BulkSummary, EngineClient};
use abr_search::error::{AbrError, Result};
use abr_search::extractor::{BusinessRecord, Extractor};
use abr_search::search::{render_hits, DualSearcher};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            data_dir,
            json,
            limit,
        } => cmd_extract(cli.config, data_dir, json, limit)?,
        Commands::Index {
            data_dir,
            batch_size,
        } => cmd_index(cli.config, data_dir, batch_size)?,
        Commands::Search {
            query,
            mode,
            k,
            json,
        } => cmd_search(cli.config, &query, &mode, k, json)?,
        Commands::Config { action } => cmd_config(cli.config, action)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if verbose {
        "abr_search=debug"
    } else {
        "abr_search=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn cmd_extract(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    json: bool,
    limit: Option<usize>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let data_dir = resolve_data_dir(&config, data_dir)?;

    let extractor = Extractor::new(data_dir);
    let mut count = 0usize;

    for record in extractor.records()? {
        let record = record?;
        print_record(&record, json)?;
        count += 1;
        if limit.is_some_and(|l| count >= l) {
            break;
        }
    }

    tracing::info!("Extracted {} records", count);
    Ok(())
}

fn print_record(record: &BusinessRecord, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(record).map_err(|e| AbrError::Json {
            source: e,
            context: "Failed to serialize record".to_string(),
        })?;
        println!("{line}");
    } else {
        println!(
            "Company: {} | State: {} | Postcode: {}",
            record.company_name, record.state, record.postcode
        );
    }
    Ok(())
}

fn cmd_index(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    batch_size: Option<usize>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let data_dir = resolve_data_dir(&config, data_dir)?;
    let batch_size = batch_size.unwrap_or(config.embedding.batch_size);

    let client = EngineClient::new(&config.engine, config.engine_password()?)?;
    let provider = FastEmbedProvider::new(&config.embedding)
        .map_err(|e| AbrError::Embedding(e.to_string()))?;
    let rt = runtime()?;

    let extractor = Extractor::new(data_dir);
    let mut batch: Vec<BusinessRecord> = Vec::with_capacity(batch_size);
    let mut total = BulkSummary {
        indexed: 0,
        failed: 0,
    };

    for record in extractor.records()? {
        batch.push(record?);
        if batch.len() >= batch_size {
            let summary = flush_batch(&rt, &client, &provider, &config, &batch)?;
            total.indexed += summary.indexed;
            total.failed += summary.failed;
            batch.clear();
        }
    }
    if !batch.is_empty() {
        let summary = flush_batch(&rt, &client, &provider, &config, &batch)?;
        total.indexed += summary.indexed;
        total.failed += summary.failed;
    }

    println!("✓ Indexed {} records into '{}'", total.indexed, config.engine.index);
    if total.failed > 0 {
        tracing::warn!("{} records were rejected by the engine", total.failed);
    }

    Ok(())
}

fn flush_batch(
    rt: &tokio::runtime::Runtime,
    client: &EngineClient,
    provider: &FastEmbedProvider,
    config: &Config,
    batch: &[BusinessRecord],
) -> Result<BulkSummary> {
    let names: Vec<String> = batch.iter().map(|r| r.company_name.clone()).collect();
    let embeddings = provider
        .embed_passages(&names)
        .map_err(|e| AbrError::Embedding(e.to_string()))?;

    let docs: Vec<Value> = batch
        .iter()
        .zip(embeddings)
        .map(|(record, embedding)| build_document(record, embedding, &config.search.vector_field))
        .collect::<Result<_>>()?;

    let summary = rt.block_on(client.bulk_index(&config.engine.index, &docs))?;
    tracing::debug!(
        "Bulk request: {} indexed, {} failed",
        summary.indexed,
        summary.failed
    );
    Ok(summary)
}

fn build_document(
    record: &BusinessRecord,
    embedding: Vec<f32>,
    vector_field: &str,
) -> Result<Value> {
    let mut doc = serde_json::Map::new();
    doc.insert(
        "company_name".to_string(),
        Value::String(record.company_name.clone()),
    );
    doc.insert("state".to_string(), Value::String(record.state.clone()));
    doc.insert(
        "postcode".to_string(),
        Value::String(record.postcode.clone()),
    );
    let vector = serde_json::to_value(embedding).map_err(|e| AbrError::Json {
        source: e,
        context: "Failed to serialize embedding".to_string(),
    })?;
    doc.insert(vector_field.to_string(), vector);
    Ok(Value::Object(doc))
}

fn cmd_search(
    config_path: Option<PathBuf>,
    query: &str,
    mode: &str,
    k: Option<usize>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;

    let mut search_config = config.search.clone();
    if let Some(k) = k {
        search_config.k = k;
    }

    let client = EngineClient::new(&config.engine, config.engine_password()?)?;
    let mut searcher = DualSearcher::new(client, config.engine.index.clone(), search_config);

    if mode != "keyword" {
        let provider = FastEmbedProvider::new(&config.embedding)
            .map_err(|e| AbrError::Embedding(e.to_string()))?;
        searcher = searcher.with_provider(Arc::new(provider) as Arc<dyn EmbeddingProvider>);
    }

    let rt = runtime()?;

    match mode {
        "keyword" => {
            let hits = rt.block_on(searcher.keyword(query))?;
            if json {
                print_json(&hits)?;
            } else {
                print_section("Keyword Search", &render_hits(&hits));
            }
        }
        "embedding" => {
            let hits = rt.block_on(searcher.embedding(query))?;
            if json {
                print_json(&hits)?;
            } else {
                print_section("Embedding Search", &render_hits(&hits));
            }
        }
        _ => {
            let results = rt.block_on(searcher.both(query))?;
            if json {
                print_json(&results)?;
            } else {
                print_section("Keyword Search", &render_hits(&results.keyword));
                print_section("Embedding Search", &render_hits(&results.embedding));
            }
        }
    }

    Ok(())
}

fn print_section(header: &str, body: &str) {
    println!("{header}");
    println!("{}", "=".repeat(header.len()));
    print!("{body}");
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).map_err(|e| AbrError::Json {
        source: e,
        context: "Failed to serialize search results".to_string(),
    })?;
    println!("{out}");
    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| AbrError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{json}");
        }
        ConfigAction::Validate { file } => {
            let path = match file {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = Config::default_path()?;

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| AbrError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            let config = Config::default();
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'abr-search config init' to create one."
        );
        return Ok(Config::default());
    }

    Config::load(&path)
}

fn resolve_data_dir(config: &Config, override_dir: Option<PathBuf>) -> Result<PathBuf> {
    match override_dir {
        Some(dir) => Ok(dir),
        None => expand_path(&config.data.data_dir),
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| AbrError::Config("Invalid path encoding".to_string()))?;

    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| AbrError::Config("Cannot determine home directory".to_string()))?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| AbrError::Io {
            source: e,
            context: "Failed to create tokio runtime".to_string(),
        })
}
