//! Binary entry point for the amdeps CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Build the dependency index for the configured projects
//! amdeps index
//!
//! # Resync a module's dependency array with its factory parameters
//! amdeps update script/views/Main.js
//!
//! # Add the symbol under the cursor as a dependency
//! amdeps inject script/views/Main.js --at 42:17
//!
//! # Preview without writing
//! amdeps --dry-run sort script/views/Main.js
//! ```
//!
//! Responses are JSON on stdout; prompts and logs go to stderr.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use amdeps::cli::{
    run_index, run_inject, run_inject_at_point, run_inject_dependencies, run_inject_relative,
    run_sort, run_update, Session,
};
use amdeps::config::Config;
use amdeps::terminal::TerminalAdapter;
use amdeps_core::error::{AmdepsError, AmdepsResult, OutputErrorCode};
use amdeps_core::interaction::{InteractionAdapter, ScriptedAdapter};
use amdeps_core::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Keep AMD module dependency arrays in sync with factory parameters.
#[derive(Parser, Debug)]
#[command(
    name = "amdeps",
    version,
    about = "Keep AMD module dependency arrays in sync with factory parameters"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Workspace root directory (default: current directory).
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Config file (default: amdeps.toml in the workspace).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session directory holding the stored index (default: .amdeps/).
    #[arg(long, global = true)]
    session_dir: Option<PathBuf>,

    /// Dependency-declaration keyword (default: require.def).
    #[arg(long, global = true)]
    keyword: Option<String>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Never prompt; any ambiguous name cancels the command.
    #[arg(long, global = true)]
    non_interactive: bool,

    /// Rebuild the index before running the command.
    #[arg(long, global = true)]
    reindex: bool,

    /// Report a diff instead of writing the file.
    #[arg(long, global = true)]
    dry_run: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Parse an explicit dependency in `<Name>=<path>` format.
fn parse_dependency(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
            Ok((name.trim().to_string(), path.trim().to_string()))
        }
        _ => Err(format!(
            "invalid dependency '{}', expected '<Name>=<path>' (e.g., 'Foo=app/models/Foo')",
            s
        )),
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the dependency index from the configured projects.
    Index,
    /// Re-resolve every factory parameter and rewrite the dependency array.
    Update {
        /// Module file to edit.
        file: PathBuf,
    },
    /// Add the symbol at a position as a dependency.
    Inject {
        /// Module file to edit.
        file: PathBuf,
        /// Position of the symbol (line:col or byte offset).
        #[arg(long)]
        at: String,
    },
    /// Replace the symbol at a position with a relative require of its file.
    InjectRelative {
        /// File to edit.
        file: PathBuf,
        /// Position of the symbol (line:col or byte offset).
        #[arg(long)]
        at: String,
    },
    /// Sort dependencies by module path.
    Sort {
        /// Module file to edit.
        file: PathBuf,
    },
    /// Write explicit dependency pairs into the module header.
    InjectDependencies {
        /// Module file to edit.
        file: PathBuf,
        /// Dependency as `<Name>=<path>`; repeatable.
        #[arg(long = "dep", value_parser = parse_dependency, required = true)]
        deps: Vec<(String, String)>,
        /// Rebuild the dependency array from the pairs instead of merging.
        #[arg(long)]
        replace: bool,
    },
    /// Replace the word at a position with literal text.
    InjectAtPoint {
        /// File to edit.
        file: PathBuf,
        /// Position of the word (line:col or byte offset).
        #[arg(long)]
        at: String,
        /// Replacement text.
        #[arg(long)]
        text: String,
    },
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Errors go to stdout as JSON, like every other response.
            let error_code = OutputErrorCode::from(&err);
            let _ = emit_response(&ErrorResponse::from_error(&err), &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Resolve the workspace and config, applying flag overrides.
fn open_session(global: &GlobalArgs) -> AmdepsResult<Session> {
    let workspace = match &global.workspace {
        Some(path) => path.clone(),
        None => std::env::current_dir()
            .map_err(|e| AmdepsError::filesystem(Path::new("."), e))?,
    };
    let workspace = workspace.canonicalize().map_err(|e| {
        AmdepsError::invalid_args(format!("workspace {}: {}", workspace.display(), e))
    })?;

    let mut config = Config::load(&workspace, global.config.as_deref())?;
    if let Some(keyword) = &global.keyword {
        config.keyword = keyword.clone();
    }
    if let Some(session_dir) = &global.session_dir {
        config.session_dir = workspace.join(session_dir);
    }

    let mut session = Session::new(config);
    session.dry_run = global.dry_run;
    session.reindex = global.reindex;
    Ok(session)
}

fn emit<T: Serialize>(response: &T) -> AmdepsResult<()> {
    emit_response(response, &mut io::stdout()).map_err(|e| AmdepsError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}

/// Execute the CLI command.
fn execute(cli: Cli) -> AmdepsResult<()> {
    let session = open_session(&cli.global)?;
    let boxed: Box<dyn InteractionAdapter> = if cli.global.non_interactive {
        Box::new(ScriptedAdapter::cancelling())
    } else {
        Box::new(TerminalAdapter::stdio())
    };
    let adapter: &dyn InteractionAdapter = &*boxed;

    match cli.command {
        Command::Index => emit(&run_index(&session)?),
        Command::Update { file } => emit(&run_update(&session, &file, adapter)?),
        Command::Inject { file, at } => emit(&run_inject(&session, &file, &at, adapter)?),
        Command::InjectRelative { file, at } => {
            emit(&run_inject_relative(&session, &file, &at, adapter)?)
        }
        Command::Sort { file } => emit(&run_sort(&session, &file)?),
        Command::InjectDependencies {
            file,
            deps,
            replace,
        } => emit(&run_inject_dependencies(&session, &file, &deps, replace)?),
        Command::InjectAtPoint { file, at, text } => {
            emit(&run_inject_at_point(&session, &file, &at, &text)?)
        }
    }
}
