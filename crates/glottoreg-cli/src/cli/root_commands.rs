use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use glottoreg_import::{Delimiter, ImportMode, RowErrorPolicy};

/// Top-level subcommands of the `glt` binary.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate every dataset record against the registry schema
    Validate(ValidateArgs),
    /// Run cross-record quality rules (and snapshot sync when given)
    Quality(QualityArgs),
    /// Import a CSV/TSV catalog export into the dataset
    Import(ImportArgs),
    /// Build the web snapshot from the dataset
    Build(BuildArgs),
    /// Import, rebuild the snapshot, validate, and quality-check in one run
    Pipeline(PipelineArgs),
    /// Print registered JSON Schemas
    Schema(SchemaArgs),
    /// Probe every link URL in the dataset (best effort)
    LinkCheck(LinkCheckArgs),
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Canonical dataset (JSONL)
    pub dataset: PathBuf,
}

#[derive(Debug, Args)]
pub struct QualityArgs {
    /// Canonical dataset (JSONL)
    pub dataset: PathBuf,
    /// Web snapshot to check for staleness
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// CSV/TSV input file
    pub input: PathBuf,
    /// Canonical dataset (JSONL) to write into
    pub dataset: PathBuf,
    #[command(flatten)]
    pub flags: ImportFlags,
}

/// Import knobs, shared between `import` and `pipeline`.
#[derive(Debug, Args)]
pub struct ImportFlags {
    /// How rows with an existing resource_id are handled
    #[arg(long, value_enum, default_value_t = ModeArg::Append)]
    pub mode: ModeArg,

    /// What to do with a row that cannot become a valid record
    #[arg(long, value_enum, default_value_t = RowErrorArg::Abort)]
    pub on_row_error: RowErrorArg,

    /// Input delimiter (auto picks tab for .tsv, comma otherwise)
    #[arg(long, value_enum, default_value_t = DelimiterArg::Auto)]
    pub delimiter: DelimiterArg,

    /// Reject inputs that carry unrecognized columns
    #[arg(long)]
    pub strict_columns: bool,

    /// Check candidate records against the schema before commit
    #[arg(long)]
    pub validate: bool,

    /// Schema-check the whole resulting dataset before commit
    #[arg(long)]
    pub validate_dataset: bool,

    /// `created` date for rows without one (defaults to today)
    #[arg(long)]
    pub default_created: Option<NaiveDate>,

    /// Curation status for rows without one
    #[arg(long, default_value = "seed")]
    pub default_status: String,

    /// Maintainers for rows without any, comma separated
    #[arg(long, value_delimiter = ',', default_value = "@you")]
    pub default_maintainers: Vec<String>,
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Canonical dataset (JSONL)
    pub dataset: PathBuf,
    /// Snapshot file to write (or compare against)
    pub snapshot: PathBuf,
    /// Compare instead of writing; fail when the snapshot is stale
    #[arg(long)]
    pub check: bool,
}

#[derive(Debug, Args)]
pub struct PipelineArgs {
    /// CSV/TSV input file
    pub input: PathBuf,
    /// Canonical dataset (JSONL)
    pub dataset: PathBuf,
    /// Snapshot file to rebuild
    pub snapshot: PathBuf,
    #[command(flatten)]
    pub flags: ImportFlags,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Schema name; omit to list all registered schemas
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct LinkCheckArgs {
    /// Canonical dataset (JSONL)
    pub dataset: PathBuf,
    /// Probe at most this many links
    #[arg(long)]
    pub limit: Option<usize>,
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    Append,
    Merge,
}

impl From<ModeArg> for ImportMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Append => Self::Append,
            ModeArg::Merge => Self::Merge,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum RowErrorArg {
    Skip,
    Abort,
}

impl From<RowErrorArg> for RowErrorPolicy {
    fn from(value: RowErrorArg) -> Self {
        match value {
            RowErrorArg::Skip => Self::Skip,
            RowErrorArg::Abort => Self::Abort,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum DelimiterArg {
    Auto,
    Comma,
    Tab,
}

impl From<DelimiterArg> for Delimiter {
    fn from(value: DelimiterArg) -> Self {
        match value {
            DelimiterArg::Auto => Self::Auto,
            DelimiterArg::Comma => Self::Comma,
            DelimiterArg::Tab => Self::Tab,
        }
    }
}
