use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use shared::models::EntityKind;
use spool_label::ExportFormat;

#[derive(Parser, Debug)]
#[command(name = "spool-labels")]
#[command(about = "Render, preview and export filament spool labels", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Spoolman base URL
    #[arg(long, env = "SPOOLMAN_URL", global = true)]
    pub url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage label presets
    #[command(subcommand)]
    Presets(PresetCommand),

    /// Print the page layout of a label job as JSON
    Preview(JobArgs),

    /// Render labels to files
    Export {
        #[command(flatten)]
        job: JobArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Png)]
        format: FormatArg,

        /// Raster resolution
        #[arg(long, env = "EXPORT_DPI")]
        dpi: Option<f32>,

        /// Output directory; defaults to a timestamped folder under EXPORT_DIR
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// One file per page instead of per item
        #[arg(long)]
        per_page: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum PresetCommand {
    /// List presets
    #[command(alias = "ls")]
    List,

    /// Create a preset with the default template and select it
    Create {
        name: String,

        #[arg(short, long, default_value = "spool")]
        kind: EntityKind,
    },

    /// Copy a preset under a new name
    Duplicate { id: String, name: String },

    /// Set a preset's template
    SetTemplate {
        id: String,
        /// Template text; `\n` starts a new line
        template: String,
    },

    /// Delete a preset
    #[command(alias = "rm")]
    Delete { id: String },

    /// Make a preset current
    Select { id: String },
}

/// Which entities to label, and how
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Entity kind
    #[arg(short, long, default_value = "spool")]
    pub kind: EntityKind,

    /// Entity ids, comma separated
    #[arg(required = true, value_delimiter = ',')]
    pub ids: Vec<i64>,

    /// Preset id or name; defaults to the current preset
    #[arg(short, long)]
    pub preset: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Png,
    /// Label-exchange XML document
    Label,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => ExportFormat::Png,
            FormatArg::Label => ExportFormat::ExchangeDocument,
        }
    }
}
