// File: src/core/answer.rs
use crate::core::dictionary::{pick, Dictionary};
use crate::core::transcript::{Transcript, Word};
use crate::error::{DictionaryError, DictionaryResult};
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Days from 0001-01-01 (CE day 1) to 2022-11-12, the first daily puzzle.
const DAILY_EPOCH_DAYS_FROM_CE: i64 = 738_471;

/// Where the answer of a session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerKind {
    Daily,
    Random,
    Custom,
}

/// The target of a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub transcript: Transcript,
    /// Words pronounced this way, the selected one first.
    pub words: Vec<Word>,
    pub kind: AnswerKind,
    /// Day index for daily answers.
    pub index: Option<i64>,
}

impl Answer {
    pub fn custom(transcript: Transcript, words: Vec<Word>) -> Self {
        Self {
            transcript,
            words,
            kind: AnswerKind::Custom,
            index: None,
        }
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }
}

/// Whole days between the first daily puzzle and `date`. Negative before it.
pub fn day_index(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - DAILY_EPOCH_DAYS_FROM_CE
}

/// Deterministic selection: `pool[index mod size]`, then that word's
/// `transcripts[index mod count]`. The same index always yields the same
/// answer for an unchanged dictionary.
pub fn answer_for_index(dictionary: &Dictionary, length: usize, index: i64) -> DictionaryResult<Answer> {
    let (transcript, words) = select(dictionary, length, index)?;
    Ok(Answer {
        transcript,
        words,
        kind: AnswerKind::Daily,
        index: Some(index),
    })
}

pub fn answer_for_date(dictionary: &Dictionary, length: usize, date: NaiveDate) -> DictionaryResult<Answer> {
    answer_for_index(dictionary, length, day_index(date))
}

/// Uniformly random entry of the pool for `length`.
pub fn answer_for_random_draw<R: Rng + ?Sized>(
    dictionary: &Dictionary,
    length: usize,
    rng: &mut R,
) -> DictionaryResult<Answer> {
    let size = dictionary.answer_pool(length).len();
    if size == 0 {
        return Err(DictionaryError::EmptyPool { length });
    }
    let index = rng.gen_range(0..size) as i64;
    let (transcript, words) = select(dictionary, length, index)?;
    Ok(Answer {
        transcript,
        words,
        kind: AnswerKind::Random,
        index: None,
    })
}

fn select(dictionary: &Dictionary, length: usize, index: i64) -> DictionaryResult<(Transcript, Vec<Word>)> {
    let pool = dictionary.answer_pool(length);
    let (word, transcripts) =
        pick(pool.entries(), index).ok_or(DictionaryError::EmptyPool { length })?;
    let transcript = pick(transcripts, index)
        .ok_or(DictionaryError::EmptyPool { length })?
        .clone();

    let mut words = vec![word.clone()];
    words.extend(
        pool.iter()
            .filter(|(other, transcripts)| other != word && transcripts.contains(&transcript))
            .map(|(other, _)| other.clone()),
    );
    debug!(length, index, word = %word, homophones = words.len() - 1, "Selected answer");

    Ok((transcript, words))
}
