// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pooty Tracker demo CLI.
//!
//! Drives the client library against a live backend: sign in, record
//! entries, and print stats, friends, and the leaderboard. The session
//! persists in a JSON file between invocations, the same way the app
//! persists it in device storage.

use clap::{Parser, Subcommand};
use pooty_client::achievements::{self, AchievementLedger};
use pooty_client::config::Config;
use pooty_client::models::NewEntry;
use pooty_client::session::SessionState;
use pooty_client::storage::{FileStore, SessionStore};
use pooty_client::App;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pooty", about = "Pooty Tracker client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session
    Login { username: String, password: String },
    /// Create an account and sign in
    Register {
        username: String,
        password: String,
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Log out, clearing the stored session
    Logout,
    /// Record an entry
    Log {
        #[arg(long)]
        notes: Option<String>,
        /// Quality rating, 1-5
        #[arg(long)]
        rating: Option<u8>,
        /// Duration in whole minutes
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Show recent entries
    Logs,
    /// Show aggregate stats and achievements
    Stats,
    /// Show friends and pending requests
    Friends,
    /// Show the weekly leaderboard
    Leaderboard,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env();
    let store: Arc<dyn SessionStore> = Arc::new(FileStore::open(&config.storage_path)?);
    let ledger = AchievementLedger::new(store.clone());
    let app = App::new(config, store)?;
    app.start().await;

    match cli.command {
        Command::Login { username, password } => {
            let user = app.login(&username, &password).await?;
            println!("Signed in as {} (@{})", user.display_name, user.username);
        }
        Command::Register {
            username,
            password,
            display_name,
        } => {
            let user = app
                .register(&username, &password, display_name.as_deref())
                .await?;
            println!("Welcome, {} (@{})", user.display_name, user.username);
        }
        Command::Logout => {
            app.logout();
            println!("Signed out");
        }
        Command::Log {
            notes,
            rating,
            duration,
        } => {
            require_session(&app)?;
            let entry = NewEntry {
                notes,
                rating,
                duration_minutes: duration,
                ..Default::default()
            };
            if app.activity.create_entry(entry).await {
                println!("Logged. {} entries total.", app.activity.logs().len());
                if let Some(stats) = app.activity.stats() {
                    for achievement in ledger.newly_unlocked(&stats) {
                        println!(
                            "Achievement unlocked: {} {}",
                            achievement.emoji, achievement.name
                        );
                    }
                }
            } else {
                anyhow::bail!("Failed to log the entry");
            }
        }
        Command::Logs => {
            require_session(&app)?;
            for entry in app.activity.logs() {
                let rating = entry
                    .rating
                    .map(|r| format!(" [{}/5]", r))
                    .unwrap_or_default();
                println!(
                    "{}  {}{}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.notes.as_deref().unwrap_or("-"),
                    rating
                );
            }
        }
        Command::Stats => {
            require_session(&app)?;
            match app.activity.stats() {
                Some(stats) => {
                    println!("Today: {}   Week: {}   Month: {}", stats.today, stats.week, stats.month);
                    println!(
                        "All time: {}   Streak: {} (best {})",
                        stats.all_time, stats.current_streak, stats.longest_streak
                    );
                    for achievement in achievements::catalog(Some(&stats)) {
                        let mark = if achievement.unlocked { "x" } else { " " };
                        println!("[{}] {} {}", mark, achievement.emoji, achievement.name);
                    }
                }
                None => println!("No stats yet"),
            }
        }
        Command::Friends => {
            require_session(&app)?;
            for request in app.social.pending_requests() {
                println!("pending: @{}", request.user.username);
            }
            for friend in app.social.friends() {
                println!(
                    "{} (@{})  {} today, {} this week",
                    friend.user.display_name, friend.user.username, friend.today_count, friend.week_count
                );
            }
        }
        Command::Leaderboard => {
            require_session(&app)?;
            for row in app.social.leaderboard() {
                let you = if row.is_current_user { " (you)" } else { "" };
                println!("#{} {}{}  {} this week", row.rank, row.user.display_name, you, row.value);
            }
        }
    }

    Ok(())
}

fn require_session(app: &App) -> anyhow::Result<()> {
    if app.session.state() != SessionState::Authenticated {
        anyhow::bail!("Not signed in. Run `pooty login <username> <password>` first.");
    }
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pooty_client=info".into()),
        )
        .init();
}
