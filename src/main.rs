use clap::Parser;
use kdam::BarExt;
use tracing_subscriber::EnvFilter;

pub mod catalog;
pub mod cli;
pub mod data_dir;
pub mod embedder;
pub mod error;
pub mod features;
pub mod fetch;
pub mod index;
pub mod pipeline;
pub mod planner;
pub mod ranker;
pub mod retriever;
pub mod rules;
pub mod store;

use catalog::Assessment;
use cli::{Cli, Command};
use data_dir::DataDir;
use embedder::{Embedder, ModelManager};
use fetch::HttpTextFetcher;
use pipeline::{Recommendation, Recommender, ensure_embeddings};
use rules::RuleConfig;
use store::EmbeddingStore;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("ASSESSREC_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let catalog_path = cli
        .catalog
        .clone()
        .unwrap_or_else(|| data_dir.catalog_file());

    match cli.command {
        Command::Recommend(args) => {
            cmd_recommend(&data_dir, &catalog_path, cli.model, &args)?;
        }
        Command::Embed(args) => {
            cmd_embed(&data_dir, &catalog_path, cli.model, &args)?;
        }
        Command::Status(args) => {
            cmd_status(&data_dir, &catalog_path, args.json)?;
        }
        Command::Completions(_) => unreachable!("handled above"),
    }

    Ok(())
}

fn build_embedder(model: Option<String>) -> ModelManager {
    match model {
        Some(model_id) => ModelManager::with_model_id(model_id),
        None => ModelManager::new(),
    }
}

fn cmd_recommend(
    data_dir: &DataDir,
    catalog_path: &std::path::Path,
    model: Option<String>,
    args: &cli::RecommendArgs,
) -> error::Result<()> {
    let assessments = catalog::load_catalog(catalog_path)?;
    let store = EmbeddingStore::open(&data_dir.embeddings_db())?;
    let mut embedder = build_embedder(model);
    let rows = ensure_embeddings(&assessments, &store, &mut embedder)?;

    let recommender = Recommender::new(
        assessments,
        rows,
        Box::new(embedder),
        RuleConfig::default(),
    )?;

    let result = if args.url {
        let fetcher = HttpTextFetcher::new()?;
        recommender.recommend_from_url(&fetcher, &args.query, args.top_k, args.count)?
    } else {
        recommender.recommend(&args.query, args.top_k, args.count)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_human(&result);
    }
    Ok(())
}

fn print_human(result: &Recommendation) {
    if result.recommendations.is_empty() {
        println!("No recommendations found matching the criteria.");
    } else {
        for (i, rec) in result.recommendations.iter().enumerate() {
            print_assessment(i + 1, rec);
        }
    }
    println!("\nReasoning: {}", result.reasoning);
}

fn print_assessment(rank: usize, assessment: &Assessment) {
    println!("{rank}. {}", assessment.name);
    println!("   URL: {}", assessment.url);
    println!("   Test types: {}", assessment.test_type.join(", "));
    match assessment.duration {
        Some(minutes) => println!("   Duration: {minutes} min"),
        None => println!("   Duration: unknown"),
    }
    if !assessment.description.is_empty() {
        let mut description = assessment.description.clone();
        if description.len() > 120 {
            description.truncate(120);
            description.push_str("...");
        }
        println!("   {description}");
    }
}

fn cmd_embed(
    data_dir: &DataDir,
    catalog_path: &std::path::Path,
    model: Option<String>,
    args: &cli::EmbedArgs,
) -> error::Result<()> {
    let assessments = catalog::load_catalog(catalog_path)?;
    let store = EmbeddingStore::open(&data_dir.embeddings_db())?;

    if store.count()? > 0 && !args.force {
        eprintln!(
            "Embedding store already has {} vectors; use --force to recompute.",
            store.count()?
        );
        return Ok(());
    }

    let mut embedder = build_embedder(model);
    let mut progress = kdam::tqdm!(total = assessments.len(), desc = "embedding");
    let mut rows = Vec::with_capacity(assessments.len());
    for assessment in &assessments {
        rows.push(embedder.encode_one(&assessment.embedding_text())?);
        let _ = progress.update(1);
    }
    eprintln!();

    store.store_all(&rows)?;
    eprintln!("Embedded {} assessments.", rows.len());
    Ok(())
}

fn cmd_status(
    data_dir: &DataDir,
    catalog_path: &std::path::Path,
    json: bool,
) -> error::Result<()> {
    let assessments = catalog::load_catalog(catalog_path).unwrap_or_default();
    let store = EmbeddingStore::open(&data_dir.embeddings_db())?;
    let embedded = store.count()?;
    let dimension = store.load(0)?.map(|v| v.len()).unwrap_or(0);
    let model = std::env::var(embedder::MODEL_ENV_VAR)
        .unwrap_or_else(|_| embedder::DEFAULT_MODEL_ID.to_string());

    if json {
        let status = status_json(
            data_dir.root(),
            catalog_path,
            assessments.len(),
            embedded,
            dimension,
            &model,
        );
        println!("{status}");
    } else {
        println!("Data directory: {}", data_dir.root().display());
        println!("Catalog: {}", catalog_path.display());
        println!("Assessments: {}", assessments.len());
        println!("Embedded vectors: {embedded}");
        println!("Embedding dimension: {dimension}");
        println!("Model: {model}");
    }
    Ok(())
}

fn status_json(
    data_dir: &std::path::Path,
    catalog_path: &std::path::Path,
    assessments: usize,
    embedded: usize,
    dimension: usize,
    model: &str,
) -> serde_json::Value {
    serde_json::json!({
        "data_dir": data_dir.display().to_string(),
        "catalog": catalog_path.display().to_string(),
        "assessments": assessments,
        "embedded": embedded,
        "dimension": dimension,
        "model": model,
    })
}
