//! mindmate — command-line front end for the MindMate wellness core
//!
//! Stands in for the web pages: record check-ins, talk to the assistant and
//! print the dashboard figures the landing / analytics pages would chart.
//!
//! # Subcommands
//! - `checkin --phq1 N --phq2 N --gad1 N --gad2 N [--notes TEXT]` — save today's check-in
//! - `chat [--message TEXT] [--uid UID]`  — one-shot reply, or a REPL on stdin
//! - `summary [--json]`                   — users, sessions, satisfaction, retention
//! - `trend [--json]`                     — last 12 check-ins as mood / productivity
//! - `analytics [--json]`                 — full score history and check-in hours
//! - `status`                             — provider, model and store overview

use std::io::Write;

use chrono::Utc;
use clap::{Parser, Subcommand};
use mindmate_core::metrics::{Analytics, Summary, Trend};
use mindmate_core::{new_session_uid, ChatSession, CheckinScores, MindMate, MindMateConfig};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "mindmate",
    version,
    about = "MindMate — daily check-ins, chat assistant and wellness metrics"
)]
struct Cli {
    /// Optional TOML config file; environment variables override it
    #[arg(short, long, env = "MINDMATE_CONFIG", default_value = "mindmate.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Save a daily check-in (each score 0-3, out-of-range values are clamped)
    Checkin {
        /// Loss of interest or pleasure
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        phq1: i64,

        /// Feeling down, depressed or hopeless
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        phq2: i64,

        /// Feeling nervous, anxious or on edge
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        gad1: i64,

        /// Not being able to stop worrying
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        gad2: i64,

        /// Free-text notes
        #[arg(long, default_value = "")]
        notes: String,

        /// Session uid; set MINDMATE_UID to reuse one across calls (a new
        /// uid, counted as a new user, is generated when omitted)
        #[arg(long, env = "MINDMATE_UID")]
        uid: Option<String>,
    },

    /// Chat with the assistant
    Chat {
        /// Send a single message and exit instead of reading stdin
        #[arg(short, long)]
        message: Option<String>,

        /// Continue the stored conversation of this uid (or MINDMATE_UID)
        #[arg(long, env = "MINDMATE_UID")]
        uid: Option<String>,
    },

    /// Show dashboard summary figures
    Summary {
        #[arg(long)]
        json: bool,
    },

    /// Show the 12-point mood / productivity trend
    Trend {
        #[arg(long)]
        json: bool,
    },

    /// Show score history and check-in hour distribution
    Analytics {
        #[arg(long)]
        json: bool,
    },

    /// Show backend and store status
    Status,
}

// ============================================================================
// Text rendering
// ============================================================================

pub fn render_summary(summary: &Summary) -> String {
    format!(
        "Active users:   {}\nChat sessions:  {}\nSatisfaction:   {}%\nRetention:      {}%",
        summary.active_users, summary.session_count, summary.satisfaction_pct, summary.retention_pct
    )
}

pub fn render_trend(trend: &Trend) -> String {
    let mut out = String::new();
    if trend.synthetic {
        out.push_str("(no check-ins yet, showing placeholder trend)\n");
    }
    out.push_str(&format!("{:<12} {:>5} {:>12}\n", "Date", "Mood", "Productivity"));
    for ((label, mood), productivity) in trend
        .labels
        .iter()
        .zip(&trend.mood)
        .zip(&trend.productivity)
    {
        out.push_str(&format!("{:<12} {:>5} {:>12}\n", label, mood, productivity));
    }
    out
}

pub fn render_analytics(analytics: Option<&Analytics>) -> String {
    let analytics = match analytics {
        Some(a) => a,
        None => return "No data yet. Do your first check-in.\n".to_string(),
    };

    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:>6} {:>5} {:>12}\n",
        "Date", "Score", "Mood", "Productivity"
    ));
    for point in &analytics.history {
        out.push_str(&format!(
            "{:<12} {:>6} {:>5} {:>12}\n",
            point.label, point.total, point.mood, point.productivity
        ));
    }

    out.push_str("\nCheck-ins by hour (UTC)\n");
    for (hour, count) in analytics.checkin_hours.iter().enumerate() {
        if *count > 0 {
            out.push_str(&format!("{:02}:00 {} {}\n", hour, "#".repeat(*count as usize), count));
        }
    }
    out
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

async fn run_chat(app: &mut MindMate, message: Option<String>, uid: Option<String>) -> anyhow::Result<()> {
    let mut session = match uid {
        Some(uid) => ChatSession::resume(uid, app.store.snapshot()),
        None => {
            let session = ChatSession::new(new_session_uid(Utc::now()));
            if message.is_some() {
                announce_new_uid(session.uid());
            }
            session
        }
    };

    if let Some(text) = message {
        let reply = session.send(&mut app.store, &app.gateway, &text).await;
        println!("{}", reply);
        return Ok(());
    }

    eprintln!(
        "Backend: {} | Model: {} | uid: {} (empty line or Ctrl+D to quit)",
        app.gateway.provider().name().to_uppercase(),
        app.gateway.provider().model(),
        session.uid()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        let text = line.trim();
        if text.is_empty() {
            break;
        }

        let reply = session.send(&mut app.store, &app.gateway, text).await;
        println!("{}\n", reply);
    }

    Ok(())
}

fn announce_new_uid(uid: &str) {
    eprintln!("New uid: {} (pass --uid or set MINDMATE_UID to reuse it)", uid);
}

fn run_status(app: &MindMate) {
    let snapshot = app.store.snapshot();
    println!("Backend:      {}", app.gateway.provider().name());
    println!("Model:        {}", app.gateway.provider().model());
    println!("Store:        {}", app.store.path().display());
    println!("Check-ins:    {}", snapshot.checkins.len());
    println!("Chat events:  {}", snapshot.chat_events.len());
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env with MINDMATE_* / legacy provider vars
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match MindMateConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", cli.config, e);
            std::process::exit(1);
        }
    };

    // Logs go to stderr so --json output stays parseable
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut app = MindMate::open(config)?;
    tracing::debug!(
        store = %app.store.path().display(),
        provider = app.gateway.provider().name(),
        "MindMate opened"
    );

    match cli.command {
        Commands::Checkin {
            phq1,
            phq2,
            gad1,
            gad2,
            notes,
            uid,
        } => {
            let uid = uid.unwrap_or_else(|| {
                let uid = new_session_uid(Utc::now());
                announce_new_uid(&uid);
                uid
            });
            let record = app.submit_checkin(&uid, CheckinScores::new(phq1, phq2, gad1, gad2), &notes);
            println!("✅ Check-in saved for {} (total {}/12)", record.date, record.total());
        }
        Commands::Chat { message, uid } => run_chat(&mut app, message, uid).await?,
        Commands::Summary { json } => {
            let summary = app.dashboard().summary;
            if json {
                print_json(&summary)?;
            } else {
                println!("{}", render_summary(&summary));
            }
        }
        Commands::Trend { json } => {
            let trend = app.dashboard().trend;
            if json {
                print_json(&trend)?;
            } else {
                print!("{}", render_trend(&trend));
            }
        }
        Commands::Analytics { json } => {
            let analytics = app.analytics();
            if json {
                print_json(&analytics)?;
            } else {
                print!("{}", render_analytics(analytics.as_ref()));
            }
        }
        Commands::Status => run_status(&app),
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
