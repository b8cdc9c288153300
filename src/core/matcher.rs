// File: src/core/matcher.rs
use crate::core::phoneme::Phoneme;
use crate::core::transcript::Transcript;
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Outcome of comparing one guessed phoneme against the answer.
///
/// The variants are ordered by how much they reveal, so the best known status
/// of a phoneme is simply the maximum of everything seen for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    /// Never guessed. Only used for aggregate status, never in a row.
    Unknown,
    /// Not in the answer, or every occurrence was already accounted for.
    NoMatch,
    /// In the answer, but not at this position.
    SomeMatch,
    /// In the answer at this position.
    Match,
}

/// One position of an uncommitted input as it would be hinted to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewCell {
    pub phoneme: Phoneme,
    pub status: MatchType,
    /// The position lies beyond the answer length and would not be scored.
    pub invalid: bool,
}

/// Scores guesses against a fixed target transcript and keeps the best known
/// status of every phoneme across all guesses fed to it.
#[derive(Debug, Clone)]
pub struct Matcher {
    target: Transcript,
    /// Occurrences of each phoneme in the target.
    counts: HashMap<Phoneme, usize>,
    rows: Vec<Vec<MatchType>>,
    best: HashMap<Phoneme, MatchType>,
    /// (phoneme, position) pairs that scored MATCH in some row.
    matched_at: HashSet<(Phoneme, usize)>,
}

impl Matcher {
    pub fn new(target: Transcript) -> Self {
        let mut counts = HashMap::new();
        for &phoneme in target.iter() {
            *counts.entry(phoneme).or_insert(0) += 1;
        }
        Self {
            target,
            counts,
            rows: Vec::new(),
            best: HashMap::new(),
            matched_at: HashSet::new(),
        }
    }

    /// Builds a matcher and feeds it every guess in order.
    pub fn with_guesses<'a, I>(target: Transcript, guesses: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = &'a Transcript>,
    {
        let mut matcher = Self::new(target);
        for guess in guesses {
            matcher.push(guess)?;
        }
        Ok(matcher)
    }

    pub fn target(&self) -> &Transcript {
        &self.target
    }

    /// Classifies every position of `guess` against the target.
    ///
    /// Positions beyond the target length are ignored. A guess shorter than
    /// the target cannot be scored.
    ///
    /// Exact matches claim their occurrence first; the remaining occurrences
    /// are then handed out left to right as SOME_MATCH.
    pub fn score(&self, guess: &[Phoneme]) -> Result<Vec<MatchType>, GameError> {
        let length = self.target.len();
        if guess.len() < length {
            return Err(GameError::GuessTooShort {
                guess: guess.len(),
                target: length,
            });
        }
        let guess = &guess[..length];

        let mut remaining = self.counts.clone();
        let mut row = vec![MatchType::NoMatch; length];

        for (i, (g, t)) in guess.iter().zip(self.target.iter()).enumerate() {
            if g == t {
                row[i] = MatchType::Match;
                if let Some(count) = remaining.get_mut(g) {
                    *count -= 1;
                }
            }
        }

        for (i, g) in guess.iter().enumerate() {
            if row[i] == MatchType::Match {
                continue;
            }
            if let Some(count) = remaining.get_mut(g).filter(|count| **count > 0) {
                *count -= 1;
                row[i] = MatchType::SomeMatch;
            }
        }

        Ok(row)
    }

    /// Scores a guess, records it, and returns its row.
    pub fn push(&mut self, guess: &[Phoneme]) -> Result<&[MatchType], GameError> {
        let row = self.score(guess)?;
        for (i, (&phoneme, &status)) in guess.iter().zip(row.iter()).enumerate() {
            let best = self.best.entry(phoneme).or_insert(MatchType::Unknown);
            *best = (*best).max(status);
            if status == MatchType::Match {
                self.matched_at.insert((phoneme, i));
            }
        }
        self.rows.push(row);
        Ok(self.rows.last().map(Vec::as_slice).unwrap_or_default())
    }

    /// Rows for every guess pushed so far, in order.
    pub fn all_matches(&self) -> &[Vec<MatchType>] {
        &self.rows
    }

    /// Best status of `phoneme` across every guess so far.
    pub fn best_for_phoneme(&self, phoneme: Phoneme) -> MatchType {
        self.best.get(&phoneme).copied().unwrap_or(MatchType::Unknown)
    }

    /// Hints for an input that has not been committed yet.
    pub fn preview(&self, input: &[Phoneme]) -> Vec<PreviewCell> {
        input
            .iter()
            .enumerate()
            .map(|(i, &phoneme)| {
                if i >= self.target.len() {
                    return PreviewCell {
                        phoneme,
                        status: MatchType::Unknown,
                        invalid: true,
                    };
                }
                let status = if self.matched_at.contains(&(phoneme, i)) {
                    MatchType::Match
                } else {
                    match self.best_for_phoneme(phoneme) {
                        MatchType::Match => MatchType::SomeMatch,
                        other => other,
                    }
                };
                PreviewCell {
                    phoneme,
                    status,
                    invalid: false,
                }
            })
            .collect()
    }

    pub fn is_all_match(row: &[MatchType]) -> bool {
        !row.is_empty() && row.iter().all(|&m| m == MatchType::Match)
    }

    /// Whether `guess` solves the puzzle. Extra trailing phonemes do not count
    /// as a solution.
    pub fn is_win(&self, guess: &[Phoneme]) -> Result<bool, GameError> {
        let row = self.score(guess)?;
        Ok(guess.len() == self.target.len() && Self::is_all_match(&row))
    }
}
