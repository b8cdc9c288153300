//! Error types for transcripts, dictionary building/loading, the game and the
//! local stores.

use std::path::PathBuf;
use thiserror::Error;

/// A transcript string contained something that is not a phoneme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("Transcript is empty")]
    Empty,

    #[error("Unknown phoneme '{token}' in transcript \"{raw}\"")]
    UnknownPhoneme { token: String, raw: String },
}

/// Result type for normalizer operations.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Errors raised while converting a source pronunciation dictionary.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Only raised in strict mode; lenient mode logs and skips the line.
    #[error("Line {line_number} did not match the expected format: \"{line}\"")]
    MalformedLine { line_number: usize, line: String },

    /// Always fatal: the source data uses a symbol the mapping table lacks.
    #[error("Unknown source phoneme '{token}' in line {line_number}: \"{line}\"")]
    UnknownPhoneme {
        token: String,
        line_number: usize,
        line: String,
    },

    #[error("Normalized transcript is invalid in line {line_number}: {source}")]
    InvalidTranscript {
        line_number: usize,
        #[source]
        source: TranscriptError,
    },

    #[error("Failed to read source dictionary: {0}")]
    Read(#[from] std::io::Error),
}

/// Result type for dictionary operations.
pub type DictionaryResult<T> = Result<T, DictionaryError>;

/// Load-time data errors and answer selection configuration errors.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Dictionary asset contains no words")]
    EmptyDictionary,

    #[error("No answers with {length} phonemes are available")]
    EmptyPool { length: usize },

    #[error("Dictionary version {dictionary} does not match answers version {answers}")]
    VersionMismatch { dictionary: String, answers: String },

    #[error("Manifest names version {manifest} but the dictionary asset is {asset}")]
    ManifestMismatch { manifest: String, asset: String },

    #[error("No answer candidates are available")]
    NoAnswers,

    #[error("Invalid transcript for '{word}': {source}")]
    InvalidTranscript {
        word: String,
        #[source]
        source: TranscriptError,
    },

    #[error("Malformed dictionary asset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to fetch asset '{location}': {message}")]
    Fetch { location: String, message: String },
}

/// Core contract violations. These indicate a bug in the caller, not a
/// recoverable runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Guess of {guess} phonemes cannot be scored against a target of {target}")]
    GuessTooShort { guess: usize, target: usize },

    #[error("Maximum number of tries must be at least 1")]
    NoTries,
}

/// Result type for local store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode or decode cached data: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error(transparent)]
    Game(#[from] GameError),
}
