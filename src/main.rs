use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use millionaire::{config::GameConfig, state::AppState};

/// Where the question file is read from when `QUESTIONS_PATH` is unset
const DEFAULT_QUESTIONS_PATH: &str = "questions.json";

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "millionaire=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GameConfig::from_env();
    let state = AppState::with_config(config);

    let path =
        std::env::var("QUESTIONS_PATH").unwrap_or_else(|_| DEFAULT_QUESTIONS_PATH.to_string());
    tracing::info!("Checking question bank at {}", path);

    let added = match state.load_questions(&path).await {
        Ok(added) => added,
        Err(e) => {
            tracing::error!("Failed to load questions from {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Loaded {} questions", added);

    let ladder = &state.config.ladder;
    for (level, count) in state.question_counts().await.iter().enumerate() {
        let level = level as u8;
        tracing::info!(
            "Level {:>2} ({:>9}{}): {} questions",
            level,
            ladder.prize_for(level),
            if ladder.is_fireproof(level) { ", fireproof" } else { "" },
            count
        );
    }

    let thin = state.bank.read().await.thin_levels(1);
    if !thin.is_empty() {
        tracing::error!("No questions for levels {:?}, games cannot start", thin);
        return ExitCode::FAILURE;
    }

    tracing::info!("Question bank can serve a full game");
    ExitCode::SUCCESS
}
