//! matrixq CLI: validate, grade and compare matrix questions from the
//! command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "matrixq", version, about = "Matrix question grading engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate question TOML files
    Validate {
        /// Path to a question file or directory
        #[arg(long)]
        question: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a batch of responses
    Grade {
        /// Question TOML file
        #[arg(long)]
        question: PathBuf,

        /// Responses JSON file
        #[arg(long)]
        responses: PathBuf,

        /// Directory to save the JSON report in
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Show the combined feedback for each attempt
        #[arg(long)]
        feedback: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the random-guess score and, given responses, attempt statistics
    Stats {
        /// Question TOML file
        #[arg(long)]
        question: PathBuf,

        /// Responses JSON file
        #[arg(long)]
        responses: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the response fields a question accepts
    Fields {
        /// Question TOML file
        #[arg(long)]
        question: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two grading reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Smallest fraction change that counts
        #[arg(long, default_value = "0.000001")]
        threshold: f64,

        /// Exit code 1 if any attempt's grade changed
        #[arg(long)]
        fail_on_change: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create a starter config and example question
    Init,
}

#[tokio::main]
async fn main() {
    let directive = match "matrixq=info".parse::<tracing_subscriber::filter::Directive>() {
        Ok(directive) => directive,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { question, config } => commands::validate::execute(question, config),
        Commands::Grade {
            question,
            responses,
            output,
            format,
            feedback,
            config,
        } => commands::grade::execute(question, responses, output, format, feedback, config).await,
        Commands::Stats {
            question,
            responses,
            config,
        } => commands::stats::execute(question, responses, config).await,
        Commands::Fields { question, config } => commands::fields::execute(question, config).await,
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_change,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_change, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
