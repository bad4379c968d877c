// Public API for integration tests and potential library usage

pub mod bank;
pub mod clock;
pub mod config;
pub mod game;
pub mod rng;
pub mod state;
pub mod types;

pub use bank::{BankError, QuestionBank};
pub use config::GameConfig;
pub use game::{Game, GameError, GameStatus, Hint, HintKind};
pub use state::{AppState, StateError};
