//! In-memory collaborator around the game engine.
//!
//! Owns users and their balances, the question bank and all games. Every
//! game operation runs under the games write lock, which is what keeps
//! mutations of one game strictly one at a time.

mod export;
mod game;
mod questions;
mod user;

pub use export::{StateExport, EXPORT_SCHEMA_VERSION};

use crate::bank::{BankError, QuestionBank};
use crate::clock::{Clock, SystemClock};
use crate::config::GameConfig;
use crate::game::{Game, GameError};
use crate::rng::{self, RandomSource};
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Errors surfaced to the caller of `AppState`
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Game not found: {0}")]
    GameNotFound(GameId),

    #[error("Game {game_id} does not belong to user {user_id}")]
    NotOwner { game_id: GameId, user_id: UserId },

    #[error("User already has a game in progress: {0}")]
    GameInProgress(GameId),

    #[error("Invalid export: {0}")]
    InvalidExport(String),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Bank(#[from] BankError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: GameConfig,
    pub bank: Arc<RwLock<QuestionBank>>,
    pub users: Arc<RwLock<HashMap<UserId, User>>>,
    pub games: Arc<RwLock<HashMap<GameId, Game>>>,
    rng: Arc<Mutex<Box<dyn RandomSource + Send>>>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        Self::with_sources(config, rng::from_os(), Arc::new(SystemClock))
    }

    /// Build a state with explicit randomness and time, for deterministic runs
    pub fn with_sources(
        config: GameConfig,
        rng: impl RandomSource + Send + 'static,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            bank: Arc::new(RwLock::new(QuestionBank::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
            games: Arc::new(RwLock::new(HashMap::new())),
            rng: Arc::new(Mutex::new(Box::new(rng))),
            clock,
        }
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
