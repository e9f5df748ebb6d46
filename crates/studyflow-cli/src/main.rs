use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studyflow-cli", version, about = "Studyflow CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work item management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Day-capacity rebalancing
    Rebalance {
        #[command(subcommand)]
        action: commands::rebalance::RebalanceAction,
    },
    /// Replan a missed session
    Replan {
        /// Id of the missed item
        item_id: String,
        /// Persist the proposed change instead of just printing it
        #[arg(long)]
        apply: bool,
    },
    /// Revision planning
    Revision {
        #[command(subcommand)]
        action: commands::revision::RevisionAction,
    },
    /// Difficulty analysis for a study task
    Difficulty {
        /// Task title to analyze
        title: String,
        #[arg(long)]
        subject: Option<String>,
        /// Ask the AI gateway instead of the local heuristic
        #[arg(long)]
        ai: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Rebalance { action } => commands::rebalance::run(action),
        Commands::Replan { item_id, apply } => commands::replan::run(&item_id, apply),
        Commands::Revision { action } => commands::revision::run(action),
        Commands::Difficulty { title, subject, ai } => {
            commands::difficulty::run(&title, subject.as_deref(), ai)
        }
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
