//! quizmap CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "quizmap",
    version,
    about = "Two-axis quiz diagnosis and response statistics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one answer set against a quiz
    Diagnose {
        /// Path to the quiz .toml definition
        #[arg(long)]
        quiz: PathBuf,

        /// JSON object mapping question id to rating (1-5)
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Summarize stored responses
    Stats {
        /// JSON file (or directory of files) with response records
        #[arg(long)]
        responses: PathBuf,

        /// Only include responses to this quiz
        #[arg(long)]
        quiz_id: Option<String>,

        /// Days covered by the trend series (overrides config)
        #[arg(long)]
        window_days: Option<u32>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Also save the report as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Save the report as JSON under the configured output directory
        #[arg(long, conflicts_with = "output")]
        save: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare the scores of two response batches
    Compare {
        /// Baseline responses JSON
        #[arg(long)]
        group_a: PathBuf,

        /// Comparison responses JSON
        #[arg(long)]
        group_b: PathBuf,

        /// Only include responses to this quiz
        #[arg(long)]
        quiz_id: Option<String>,

        /// Exit code 1 if the difference is significant
        #[arg(long)]
        fail_on_significant: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate quiz TOML files
    Validate {
        /// Path to quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizmap=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Diagnose {
            quiz,
            answers,
            format,
        } => commands::diagnose::execute(quiz, answers, format),
        Commands::Stats {
            responses,
            quiz_id,
            window_days,
            format,
            output,
            save,
            config,
        } => {
            commands::stats::execute(
                responses,
                quiz_id,
                window_days,
                format,
                output,
                save,
                config,
            )
            .await
        }
        Commands::Compare {
            group_a,
            group_b,
            quiz_id,
            fail_on_significant,
            format,
            config,
        } => {
            commands::compare::execute(
                group_a,
                group_b,
                quiz_id,
                fail_on_significant,
                format,
                config,
            )
            .await
        }
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
