mod commands;
mod logging;
mod workspace;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tableflow_core::Error as CoreError;
use tableflow_embed::EventKind;
use tableflow_rules::RulesError;
use thiserror::Error;

use logging::{LoggingError, init_file_logging, init_stderr_logging};
use workspace::{
    DEFAULT_WORKSPACE_DIR, LogFormat, WorkspaceError, WorkspacePaths, WorkspaceSettings,
    load_settings,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("catalog error: {0}")]
    Core(#[from] CoreError),
    #[error("rules error: {0}")]
    Rules(#[from] RulesError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "tableflow", version, about = "Tableflow validation rules CLI")]
struct Cli {
    /// Workspace directory holding settings, cache and logs.
    #[arg(long, global = true, default_value = DEFAULT_WORKSPACE_DIR)]
    workspace_dir: PathBuf,
    /// Log level used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the workspace directory and default settings.
    Init,
    /// Fetch and print the capability catalog.
    Catalog {
        #[command(flatten)]
        source: CatalogArgs,
        /// Cache the fetched catalog in the workspace.
        #[arg(long, default_value_t = false)]
        save: bool,
    },
    /// Print the data types offered by the catalog.
    DataTypes {
        #[command(flatten)]
        source: CatalogArgs,
    },
    /// Print the validation methods offered for a data type.
    Methods {
        #[arg(long, value_name = "TYPE")]
        data_type: String,
        #[command(flatten)]
        source: CatalogArgs,
    },
    /// Print the options value a method's editor control would commit.
    Normalize(NormalizeArgs),
    /// Validate a template against its schema and the catalog.
    CheckTemplate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        source: CatalogArgs,
        /// Print the report as JSON on stdout.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Read importer messages from stdin, one JSON document per line.
    Listen {
        #[arg(long, value_name = "ID")]
        importer_id: String,
    },
    /// Print an importer message as the embedded importer would post it.
    Emit {
        #[arg(long, value_name = "ID")]
        importer_id: String,
        #[arg(long, value_enum)]
        kind: EmitKind,
        /// JSON payload.
        #[arg(long, value_name = "JSON")]
        data: Option<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct CatalogArgs {
    /// Read the catalog from a JSON file instead of the admin API.
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
    /// Workspace id; defaults to settings, then to the organization's first workspace.
    #[arg(long = "workspace", value_name = "ID")]
    workspace: Option<String>,
}

#[derive(Args, Debug)]
struct NormalizeArgs {
    #[arg(long, value_name = "METHOD")]
    method: String,
    #[arg(long, allow_hyphen_values = true)]
    min: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    max: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pattern: Option<String>,
    /// List entry; repeat for each value.
    #[arg(long = "item", value_name = "VALUE")]
    items: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum EmitKind {
    Complete,
    Close,
}

impl From<EmitKind> for EventKind {
    fn from(kind: EmitKind) -> Self {
        match kind {
            EmitKind::Complete => EventKind::Complete,
            EmitKind::Close => EventKind::Close,
        }
    }
}

struct Context {
    paths: WorkspacePaths,
    settings: WorkspaceSettings,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(event = "command_failed", error = %err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let paths = WorkspacePaths::new(cli.workspace_dir);
    let settings = load_settings(&paths)?;
    init_logging(&paths, &settings, &cli.log_level)?;

    let ctx = Context { paths, settings };
    tracing::debug!(event = "command_started", command = ?cli.command);

    match cli.command {
        Command::Init => commands::init(&ctx),
        Command::Catalog { source, save } => commands::catalog(&ctx, &source, save).await,
        Command::DataTypes { source } => commands::data_types(&ctx, &source).await,
        Command::Methods { data_type, source } => {
            commands::methods(&ctx, &source, &data_type).await
        }
        Command::Normalize(args) => commands::normalize(&args),
        Command::CheckTemplate { file, source, json } => {
            commands::check_template(&ctx, &source, &file, json).await
        }
        Command::Listen { importer_id } => commands::listen(&importer_id).await,
        Command::Emit {
            importer_id,
            kind,
            data,
        } => commands::emit(&importer_id, kind.into(), data.as_deref()),
    }
}

fn init_logging(
    paths: &WorkspacePaths,
    settings: &WorkspaceSettings,
    level: &str,
) -> Result<(), LoggingError> {
    if settings.log_format == LogFormat::Json && paths.is_initialized() {
        init_file_logging(&paths.cli_log_path(), level)
    } else {
        init_stderr_logging(level)
    }
}
