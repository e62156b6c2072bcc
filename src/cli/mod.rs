use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "docstore-erd",
    version,
    about = "Infer schemas and entity-relationship diagrams from schema-less document collections",
    long_about = "Sample documents from a document source (a directory of per-collection .json/.ndjson files), infer one schema per collection, detect cross-collection references from field-naming conventions, and render the result as a Mermaid erDiagram or structured JSON. Inference is sample-based and best effort: it neither scans whole collections nor validates references."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Mermaid,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate an entity-relationship diagram from sampled collections
    Erd {
        /// Source directory holding one .json or .ndjson file per collection
        #[arg(short, long, default_value = ".")]
        path: String,
        /// Path to a TOML configuration file
        #[arg(long)]
        config: Option<String>,
        /// Collections to include (defaults to every collection in the source)
        #[arg(long, value_delimiter = ',')]
        collections: Vec<String>,
        /// Output format (default mermaid, unless configured otherwise)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Per-collection sample size (default 10)
        #[arg(long)]
        limit: Option<usize>,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<String>,
        /// Suppress warnings on stderr
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },
    /// Extract merged per-collection schemas without relationship detection
    Schema {
        /// Source directory holding one .json or .ndjson file per collection
        #[arg(short, long, default_value = ".")]
        path: String,
        /// Path to a TOML configuration file
        #[arg(long)]
        config: Option<String>,
        /// Collections to include (defaults to every collection in the source)
        #[arg(long, value_delimiter = ',')]
        collections: Vec<String>,
        /// Per-collection sample size (default 100)
        #[arg(long)]
        limit: Option<usize>,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<String>,
        /// Suppress warnings on stderr
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
