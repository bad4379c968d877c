use super::AppState;
use crate::game::Game;
use crate::types::*;

impl AppState {
    /// Create a new user with an empty balance
    pub async fn create_user(&self, name: impl Into<String>) -> User {
        let user = User {
            id: ulid::Ulid::new().to_string(),
            name: name.into(),
            balance: 0,
        };

        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        tracing::info!("Created user {} ({})", user.id, user.name);
        user
    }

    pub async fn get_user(&self, user_id: &str) -> Option<User> {
        self.users.read().await.get(user_id).cloned()
    }

    /// All games of a user, newest first
    pub async fn games_for_user(&self, user_id: &str) -> Vec<Game> {
        let mut games: Vec<Game> = self
            .games
            .read()
            .await
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        games.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        games
    }

    /// Add a finished game's prize to its owner's balance
    pub(super) async fn credit_user(&self, user_id: &str, amount: u64) {
        let mut users = self.users.write().await;
        match users.get_mut(user_id) {
            Some(user) => {
                user.balance += amount;
                tracing::info!(
                    "Credited {} to user {} (balance now {})",
                    amount,
                    user_id,
                    user.balance
                );
            }
            None => tracing::warn!("Cannot credit {} to unknown user {}", amount, user_id),
        }
    }
}
