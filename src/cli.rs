use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "assessrec",
    about = "A semantic recommendation engine for skill assessment catalogs"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to the assessment catalog JSON (defaults to catalog.json in the
    /// data directory)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Override the embedding model ID or local model path
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recommend assessments for a job description or URL
    Recommend(RecommendArgs),
    /// Derive and persist catalog embeddings
    Embed(EmbedArgs),
    /// Show catalog and embedding status
    Status(StatusArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Recommend --

#[derive(Debug, Parser)]
pub struct RecommendArgs {
    /// Free-text job description, or a URL when --url is set
    pub query: String,

    /// Number of recommendations to return
    #[arg(short = 'n', long, default_value_t = crate::pipeline::DEFAULT_FINAL_K)]
    pub count: usize,

    /// Overall retrieval budget across all sub-query searches
    #[arg(long, default_value_t = crate::pipeline::DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Treat the query as a URL and fetch the job description from it
    #[arg(long)]
    pub url: bool,

    /// Output the recommendation as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Embed --

#[derive(Debug, Parser)]
pub struct EmbedArgs {
    /// Recompute embeddings even when the store is already populated
    #[arg(long)]
    pub force: bool,
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(self.shell, &mut cmd, "assessrec", &mut std::io::stdout());
    }
}
