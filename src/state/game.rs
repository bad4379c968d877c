use super::{AppState, StateError};
use crate::game::{Game, GameError, Hint, HintKind};
use crate::rng::RandomSource;
use crate::types::*;
use chrono::{DateTime, Utc};

impl AppState {
    /// Start a new game for a user.
    ///
    /// A user plays one game at a time: an unfinished game gets a chance to
    /// time out first, and if it is still running the new game is refused.
    pub async fn create_game_for_user(&self, user_id: &str) -> Result<Game, StateError> {
        if self.get_user(user_id).await.is_none() {
            return Err(StateError::UserNotFound(user_id.to_string()));
        }

        let now = self.now();
        let mut games = self.games.write().await;

        if let Some(running) = games
            .values_mut()
            .find(|g| g.user_id == user_id && !g.is_finished())
        {
            running.time_out(now)?;
            if !running.is_finished() {
                tracing::warn!(
                    "User {} tried to start a second game while {} is running",
                    user_id,
                    running.id
                );
                return Err(StateError::GameInProgress(running.id.clone()));
            }
            let prize = running.prize();
            self.credit_user(user_id, prize).await;
        }

        let game = {
            let bank = self.bank.read().await;
            let mut rng = self.rng.lock().await;
            Game::new(
                user_id.to_string(),
                &bank,
                self.config.clone(),
                &mut **rng,
                now,
            )?
        };

        games.insert(game.id.clone(), game.clone());
        tracing::info!("Created game {} for user {}", game.id, user_id);
        Ok(game)
    }

    /// The user's unfinished game, if any
    pub async fn current_game_for_user(&self, user_id: &str) -> Option<Game> {
        self.games
            .read()
            .await
            .values()
            .find(|g| g.user_id == user_id && !g.is_finished())
            .cloned()
    }

    /// Run `op` on a game owned by `user_id`.
    ///
    /// If the game goes from running to finished during `op`, the owner is
    /// credited with the prize. Both happen under the games write lock, so
    /// a game is credited exactly once.
    async fn with_user_game<T, F>(
        &self,
        user_id: &str,
        game_id: &str,
        op: F,
    ) -> Result<(T, Game), StateError>
    where
        F: FnOnce(&mut Game, DateTime<Utc>, &mut dyn RandomSource) -> Result<T, GameError>,
    {
        let now = self.now();
        let mut games = self.games.write().await;
        let game = games
            .get_mut(game_id)
            .ok_or_else(|| StateError::GameNotFound(game_id.to_string()))?;

        if game.user_id != user_id {
            tracing::warn!("User {} tried to access game {}", user_id, game_id);
            return Err(StateError::NotOwner {
                game_id: game_id.to_string(),
                user_id: user_id.to_string(),
            });
        }

        let was_finished = game.is_finished();
        let result = {
            let mut rng = self.rng.lock().await;
            op(&mut *game, now, &mut **rng)
        };

        if !was_finished && game.is_finished() {
            let prize = game.prize();
            self.credit_user(user_id, prize).await;
        }

        match result {
            Ok(value) => Ok((value, game.clone())),
            Err(e) => {
                tracing::debug!("Game {} rejected operation: {}", game_id, e);
                Err(e.into())
            }
        }
    }

    /// Load a game for its owner, timing it out if its clock ran out
    pub async fn get_game_for_user(&self, user_id: &str, game_id: &str) -> Result<Game, StateError> {
        let ((), game) = self
            .with_user_game(user_id, game_id, |game, now, _| {
                if !game.is_finished() {
                    game.time_out(now)?;
                }
                Ok(())
            })
            .await?;
        Ok(game)
    }

    /// Answer the current question of a game
    pub async fn answer(
        &self,
        user_id: &str,
        game_id: &str,
        letter: Letter,
    ) -> Result<Game, StateError> {
        let (status, game) = self
            .with_user_game(user_id, game_id, |game, now, _| {
                game.answer_current_question(letter, now)
            })
            .await?;
        tracing::debug!("Game {} answered with {}: {:?}", game_id, letter, status);
        Ok(game)
    }

    /// Cash out a game
    pub async fn take_money(&self, user_id: &str, game_id: &str) -> Result<Game, StateError> {
        let (_, game) = self
            .with_user_game(user_id, game_id, |game, now, _| game.take_money(now))
            .await?;
        Ok(game)
    }

    /// Finish a game whose time limit has passed
    pub async fn check_timeout(&self, user_id: &str, game_id: &str) -> Result<Game, StateError> {
        let (_, game) = self
            .with_user_game(user_id, game_id, |game, now, _| game.time_out(now))
            .await?;
        Ok(game)
    }

    /// Use a hint on the current question, returning what it revealed
    pub async fn use_help(
        &self,
        user_id: &str,
        game_id: &str,
        kind: HintKind,
    ) -> Result<Hint, StateError> {
        let (hint, _) = self
            .with_user_game(user_id, game_id, |game, _, rng| {
                game.use_help(kind, rng).cloned()
            })
            .await?;
        Ok(hint)
    }
}
