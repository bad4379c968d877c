//! State export/import.
//!
//! A snapshot holds everything needed to rebuild an `AppState`: the bank,
//! users with their balances and every game including its hint history.

use super::{AppState, StateError};
use crate::bank::QuestionBank;
use crate::game::Game;
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Schema version for export format compatibility
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateExport {
    /// Schema version for forward compatibility
    pub schema_version: u32,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub users: HashMap<UserId, User>,
    #[serde(default)]
    pub games: HashMap<GameId, Game>,
}

impl StateExport {
    pub fn new(
        questions: Vec<Question>,
        users: HashMap<UserId, User>,
        games: HashMap<GameId, Game>,
    ) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: Utc::now(),
            questions,
            users,
            games,
        }
    }

    /// Validate the export before import
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version > EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Export schema version {} is newer than supported version {}",
                self.schema_version, EXPORT_SCHEMA_VERSION
            ));
        }

        let mut running_owners = HashSet::new();
        for (game_id, game) in &self.games {
            if game_id != &game.id {
                return Err(format!("Game keyed as '{}' has id '{}'", game_id, game.id));
            }
            if !self.users.contains_key(&game.user_id) {
                return Err(format!(
                    "Game '{}' references user '{}' which doesn't exist",
                    game_id, game.user_id
                ));
            }
            game.validate()
                .map_err(|e| format!("Game '{}': {}", game_id, e))?;
            if !game.is_finished() && !running_owners.insert(game.user_id.clone()) {
                return Err(format!(
                    "User '{}' has more than one game in progress",
                    game.user_id
                ));
            }
        }

        Ok(())
    }
}

impl AppState {
    pub async fn export_state(&self) -> StateExport {
        let games = self.games.read().await.clone();
        let questions = self.bank.read().await.questions().to_vec();
        let users = self.users.read().await.clone();

        StateExport::new(questions, users, games)
    }

    /// Replace the whole state with a validated snapshot
    pub async fn import_state(&self, export: StateExport) -> Result<(), StateError> {
        export.validate().map_err(StateError::InvalidExport)?;

        let mut bank = QuestionBank::new();
        bank.extend(export.questions)?;

        let mut games = self.games.write().await;
        let mut current_bank = self.bank.write().await;
        let mut users = self.users.write().await;

        tracing::info!(
            "Importing state: {} questions, {} users, {} games",
            bank.len(),
            export.users.len(),
            export.games.len()
        );

        *games = export.games;
        *current_bank = bank;
        *users = export.users;

        Ok(())
    }
}
