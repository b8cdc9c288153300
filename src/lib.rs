// src/lib.rs

pub mod assets;
pub mod config;
pub mod core;
pub mod error;
pub mod normalizer;
pub mod persistence;

pub use crate::config::GameConfig;
pub use crate::core::answer::{Answer, AnswerKind};
pub use crate::core::dictionary::Dictionary;
pub use crate::core::game::{Game, GameStatus, InvalidInputReason};
pub use crate::core::matcher::{MatchType, Matcher};
pub use crate::core::phoneme::Phoneme;
pub use crate::core::session::Session;
pub use crate::core::transcript::Transcript;
