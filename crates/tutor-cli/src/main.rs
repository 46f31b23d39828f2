use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tutor-admin")]
#[command(about = "Smart Tutor operator commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration and probe the model, vector store and embeddings
    Check,
    /// Build curriculum collections from the document folder
    Index {
        /// Grade key (grade_1..grade_6) or number; all grades when omitted
        #[arg(long)]
        grade: Option<String>,
        /// Subject key (arabic, math, ...); all subjects when omitted
        #[arg(long)]
        subject: Option<String>,
    },
    /// Show knowledge-base status for one grade and subject
    Info {
        #[arg(long)]
        grade: String,
        #[arg(long)]
        subject: String,
    },
    /// Print the classification of a question as JSON
    Classify {
        question: String,
    },
    /// Print the prompt that would be sent for a question
    Prompt {
        #[arg(long, default_value = "grade_1")]
        grade: String,
        #[arg(long, default_value = "arabic")]
        subject: String,
        /// File whose contents are used as retrieved context
        #[arg(long)]
        context_file: Option<std::path::PathBuf>,
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check => commands::check::run().await?,
        Commands::Index { grade, subject } => {
            commands::index::run(grade.as_deref(), subject.as_deref()).await?
        }
        Commands::Info { grade, subject } => commands::info::run(&grade, &subject).await?,
        Commands::Classify { question } => commands::classify::run(&question)?,
        Commands::Prompt {
            grade,
            subject,
            context_file,
            question,
        } => commands::prompt::run(&grade, &subject, context_file.as_deref(), &question)?,
    }

    Ok(())
}
