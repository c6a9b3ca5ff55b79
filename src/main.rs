//! Stride - progress and achievement engine for an interactive coding course
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stride::activity::Activities;
use stride::cli::sandbox::{SandboxCommand, SandboxOptions, SandboxOutput};
use stride::config::{activity_log_path, stride_home, Config};
use stride::core::{Curriculum, ProgressStore};
use stride::error::exit_codes;
use stride::journal::ActivityJournal;
use stride::services::backend::{self, CompletionBackend};
use stride::services::Assistant;
use stride::storage::FileProgressStore;
use stride::util::read_to_string_limited;

// =============================================================================
// CLI Definition
// =============================================================================

/// Stride - track lessons, projects, XP, streaks and badges
#[derive(Parser)]
#[command(name = "stride")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show XP, level, streak and completion counts
    Status {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Mark a lesson as finished once its quiz is answered correctly
    Lesson {
        /// Lesson ID (e.g. l1-hello)
        id: String,
        /// Quiz answers as option indices, one per question (e.g. 1 or 0,2)
        #[arg(long, value_delimiter = ',')]
        answers: Vec<usize>,
        /// Check this mini-task solution first; a failing task blocks completion
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Mark a project as finished without grading
    Project {
        /// Project ID (e.g. p1-calc)
        id: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Submit a project solution for grading
    Submit {
        /// Project ID
        project: String,
        /// Source file with the solution
        file: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Run a source file in the sandbox
    Run {
        /// Source file to run
        file: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Check a source file against a lesson's task
    Check {
        /// Lesson ID
        lesson: String,
        /// Source file with the attempt
        file: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Ask for a code review of a source file
    Review {
        /// Source file to review
        file: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Ask the tutor a question
    Ask {
        /// The question
        question: String,
        /// What you are currently looking at
        #[arg(long, default_value = "General Python")]
        context: String,
        /// JSON file with earlier conversation turns
        #[arg(long)]
        history: Option<PathBuf>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List badges and which ones are earned
    Badges {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show the community leaderboard
    Leaderboard {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Wipe all progress (irreversible)
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("stride error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Install the stderr log subscriber, filtered by `STRIDE_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("STRIDE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.stride/crash.log and exits with the error code.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("stride panic: {}", info);

        if let Some(home) = stride_home() {
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::ERROR);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load();
    let store = open_store()?;

    match cli.command {
        Commands::Status { json, quiet } => run_status(&store, json, quiet),
        Commands::Lesson {
            id,
            answers,
            file,
            json,
            quiet,
        } => run_lesson(
            &store,
            config,
            &id,
            &answers,
            file.as_deref(),
            json,
            quiet,
        ),
        Commands::Project { id, json, quiet } => run_project(&store, config, &id, json, quiet),
        Commands::Submit {
            project,
            file,
            json,
            quiet,
        } => run_sandbox(&store, config, json, quiet, |cmd, options| {
            cmd.submit(&project, &file, options)
        }),
        Commands::Run { file, json, quiet } => {
            run_sandbox(&store, config, json, quiet, |cmd, options| {
                cmd.run_file(&file, options)
            })
        }
        Commands::Check {
            lesson,
            file,
            json,
            quiet,
        } => run_sandbox(&store, config, json, quiet, |cmd, options| {
            cmd.check(&lesson, &file, options)
        }),
        Commands::Review { file, json, quiet } => {
            run_sandbox(&store, config, json, quiet, |cmd, options| {
                cmd.review(&file, options)
            })
        }
        Commands::Ask {
            question,
            context,
            history,
            json,
            quiet,
        } => run_sandbox(&store, config, json, quiet, |cmd, options| {
            cmd.ask(&question, &context, history.as_deref(), options)
        }),
        Commands::Badges { json, quiet } => run_badges(&store, json, quiet),
        Commands::Leaderboard { json, quiet } => run_leaderboard(&store, config, json, quiet),
        Commands::Reset { yes, json, quiet } => run_reset(&store, yes, json, quiet),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

type Store = ProgressStore<FileProgressStore>;
type SandboxCli<'a> = SandboxCommand<'a, FileProgressStore, Assistant<Box<dyn CompletionBackend>>>;

/// Open the learner's store for today, with the activity journal attached.
fn open_store() -> Result<Store, Box<dyn std::error::Error>> {
    let storage = FileProgressStore::new()?;
    let journal = activity_log_path().map(ActivityJournal::new);
    Ok(ProgressStore::open(
        storage,
        Curriculum::default(),
        today(),
        journal,
    ))
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Print formatted output (if any) and convert success to an exit code.
fn emit(formatted: &str, success: bool) -> ExitCode {
    if !formatted.is_empty() {
        print!("{}", formatted);
        if !formatted.ends_with('\n') {
            println!();
        }
    }
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn run_status(
    store: &Store,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stride::cli::status::{StatusCommand, StatusOptions};

    let cmd = StatusCommand::new(store);
    let options = StatusOptions { json, quiet };
    let output = cmd.run(&options);

    Ok(emit(&cmd.format_output(&output, &options), output.success))
}

fn run_lesson(
    store: &Store,
    config: Config,
    id: &str,
    answers: &[usize],
    file: Option<&Path>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stride::cli::complete::{CompleteCommand, CompleteOptions};

    let task = match file {
        Some(file) => {
            let code = read_to_string_limited(file)?;
            let assistant = Assistant::new(backend::from_config(&config.assistant));
            let verdict = Activities::new(store, &assistant, config.rewards.clone())
                .verify_lesson_task(id, &code)?;
            if let Some(e) = verdict.persist_error {
                tracing::warn!(error = %e, "code attempt not saved");
            }
            Some(verdict.result)
        }
        None => None,
    };

    let cmd = CompleteCommand::new(store, config);
    let options = CompleteOptions { json, quiet };
    let output = cmd.run_lesson(id, answers, task, &options);

    Ok(emit(&cmd.format_output(&output, &options), output.success))
}

fn run_project(
    store: &Store,
    config: Config,
    id: &str,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stride::cli::complete::{CompleteCommand, CompleteOptions};

    let cmd = CompleteCommand::new(store, config);
    let options = CompleteOptions { json, quiet };
    let output = cmd.run_project(id, &options);

    Ok(emit(&cmd.format_output(&output, &options), output.success))
}

fn run_sandbox<F>(
    store: &Store,
    config: Config,
    json: bool,
    quiet: bool,
    action: F,
) -> Result<ExitCode, Box<dyn std::error::Error>>
where
    F: FnOnce(&SandboxCli<'_>, &SandboxOptions) -> SandboxOutput,
{
    let assistant = Assistant::new(backend::from_config(&config.assistant));
    let cmd = SandboxCommand::new(Activities::new(store, &assistant, config.rewards.clone()));
    let options = SandboxOptions { json, quiet };
    let output = action(&cmd, &options);

    Ok(emit(&cmd.format_output(&output, &options), output.success))
}

fn run_badges(
    store: &Store,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stride::cli::badges::{BadgesCommand, BadgesOptions};

    let cmd = BadgesCommand::new(store);
    let options = BadgesOptions { json, quiet };
    let output = cmd.run(&options);

    Ok(emit(&cmd.format_output(&output, &options), output.success))
}

fn run_leaderboard(
    store: &Store,
    config: Config,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stride::cli::leaderboard::{LeaderboardCommand, LeaderboardOptions};

    let cmd = LeaderboardCommand::new(store, config);
    let options = LeaderboardOptions { json, quiet };
    let output = cmd.run(&options);

    Ok(emit(&cmd.format_output(&output, &options), output.success))
}

fn run_reset(
    store: &Store,
    yes: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use stride::cli::reset::{ResetCommand, ResetOptions};

    let cmd = ResetCommand::new(store);
    let options = ResetOptions { json, quiet, yes };
    let output = cmd.run(today(), &options);

    Ok(emit(&cmd.format_output(&output, &options), output.success))
}
