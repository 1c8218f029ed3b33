use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

use brain_guard::command::handle_brain_command;
use brain_guard::config::{BackendKind, Config};
use brain_guard::patterns::{MatchType, PatternEngine, SearchQuery, DEFAULT_HISTORY_DAYS};
use brain_guard::storage::{NewPattern, PatternKind};
use brain_guard::{host, logging};

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Cognitive pattern tracking for AI assistants", long_about = None)]
struct Cli {
    /// Keep patterns in memory only (nothing written to disk)
    #[arg(long, global = true)]
    transient: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the host bridge (JSON-RPC over stdio)
    Serve,

    /// Record a pattern
    Record {
        /// Pattern kind (delegation, no_reflection, repetitive, vocabulary, clarity)
        pattern: PatternKind,

        /// The message that triggered it
        message: String,

        /// Optional surrounding context
        #[arg(long)]
        context: Option<String>,

        /// Session the message came from
        #[arg(long)]
        session: Option<String>,
    },

    /// Search recorded patterns
    Search {
        /// Free text for semantic search
        #[arg(short, long)]
        query: Option<String>,

        /// Restrict to one pattern kind
        #[arg(short = 't', long = "type")]
        kind: Option<PatternKind>,

        /// Look back this many days (default: 30)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Show history and trend
    History {
        /// Restrict to one pattern kind
        #[arg(short = 't', long = "type")]
        kind: Option<PatternKind>,

        /// Look back this many days
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_DAYS)]
        days: u32,
    },

    /// Print the /brain summary
    Stats {
        /// Look back this many days (default: 7)
        days: Option<String>,
    },
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if cli.transient {
        config.storage.backend = BackendKind::Transient;
    }

    match cli.command {
        Commands::Serve => host::run_stdio(&config)?,
        Commands::Record {
            pattern,
            message,
            context,
            session,
        } => {
            let mut input = NewPattern::new(pattern, message);
            if let Some(context) = context {
                input = input.context(context);
            }
            if let Some(session) = session {
                input = input.session_key(session);
            }
            record(&config, input)?;
        }
        Commands::Search { query, kind, days } => {
            search(&config, SearchQuery { query, kind, days })?;
        }
        Commands::History { kind, days } => history(&config, kind, days)?,
        Commands::Stats { days } => {
            let engine = PatternEngine::from_config(&config)?;
            println!("{}", handle_brain_command(&engine, days.as_deref())?);
        }
    }

    Ok(())
}

fn record(config: &Config, input: NewPattern) -> Result<()> {
    let mut engine = PatternEngine::from_config(config)?;
    let outcome = engine.append(input)?;

    println!(
        "{} {} {}",
        "✓ Recorded".green().bold(),
        outcome.record.kind.to_string().cyan(),
        outcome.id().dimmed()
    );

    if !outcome.similar.is_empty() {
        println!("\n{}", "Similar earlier patterns:".bold());
        for s in &outcome.similar {
            println!(
                "  {:.2}  {}  {}  {}",
                s.similarity,
                s.record.timestamp.format("%Y-%m-%d"),
                s.record.kind.to_string().cyan(),
                s.record.message
            );
        }
    }
    Ok(())
}

fn search(config: &Config, query: SearchQuery) -> Result<()> {
    let mut engine = PatternEngine::from_config(config)?;
    let response = engine.search(&query)?;

    if response.results.is_empty() {
        println!("{}", "No results found.".yellow());
        return Ok(());
    }

    for (i, result) in response.results.iter().enumerate() {
        let score = match (result.match_type, result.similarity) {
            (MatchType::Semantic, Some(sim)) => format!("{:.3}", sim),
            _ => "exact".to_string(),
        };
        println!(
            "{}. [{}] {} {}",
            i + 1,
            score.bright_cyan(),
            result.date.format("%Y-%m-%d %H:%M"),
            result.pattern.to_string().cyan()
        );
        println!("   {}", result.message);
    }

    let by_type: Vec<String> = response
        .summary
        .by_type
        .iter()
        .map(|(kind, count)| format!("{}={}", kind, count))
        .collect();
    println!(
        "\n{} {} ({})",
        "Total:".bold(),
        response.summary.total,
        by_type.join(", ")
    );
    Ok(())
}

fn history(config: &Config, kind: Option<PatternKind>, days: u32) -> Result<()> {
    let engine = PatternEngine::from_config(config)?;
    let history = engine.get_history(kind, days)?;

    let label = kind.map_or_else(|| "all patterns".to_string(), |k| k.to_string());
    println!(
        "{} {} over {} days: {} {} {}",
        "🧠".bold(),
        label.cyan(),
        days,
        history.summary.count,
        history.summary.trend.arrow(),
        history.summary.trend.as_str()
    );

    for entry in &history.entries {
        println!(
            "  {}  {}  {}",
            entry.date.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            entry.pattern.to_string().cyan(),
            entry.message
        );
    }
    Ok(())
}
