// src/core/mod.rs

pub mod answer;
pub mod dictionary;
pub mod game;
pub mod matcher;
pub mod phoneme;
pub mod session;
pub mod transcript;
