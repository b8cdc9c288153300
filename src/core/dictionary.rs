// File: src/core/dictionary.rs
use crate::core::transcript::{Transcript, Word};
use crate::error::{DictionaryError, DictionaryResult, TranscriptError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info};

/// Date plus sequence number stamped on an asset pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetVersion {
    pub date: NaiveDate,
    pub sequence: u32,
}

impl fmt::Display for AssetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date, self.sequence)
    }
}

/// How transcript strings are written inside an asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Phoneme keys joined by spaces: `"k aa t"`.
    #[default]
    Spaced,
    /// One character per phoneme: `"kat"`.
    Compact,
}

impl Encoding {
    pub fn decode(self, raw: &str) -> Result<Transcript, TranscriptError> {
        match self {
            Encoding::Spaced => Transcript::parse(raw),
            Encoding::Compact => Transcript::parse_compact(raw),
        }
    }
}

/// Full dictionary asset: word -> raw transcripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DictionaryAsset {
    Versioned {
        version: AssetVersion,
        #[serde(default)]
        encoding: Encoding,
        entries: BTreeMap<String, Vec<String>>,
    },
    Plain(BTreeMap<String, Vec<String>>),
}

/// Curated answers asset. Array order is the index space of daily puzzles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswersAsset {
    Versioned {
        version: AssetVersion,
        #[serde(default)]
        encoding: Encoding,
        answers: Vec<(String, Vec<String>)>,
    },
    Plain(Vec<(String, Vec<String>)>),
}

impl DictionaryAsset {
    fn into_parts(self) -> (Option<AssetVersion>, Encoding, BTreeMap<String, Vec<String>>) {
        match self {
            DictionaryAsset::Versioned {
                version,
                encoding,
                entries,
            } => (Some(version), encoding, entries),
            DictionaryAsset::Plain(entries) => (None, Encoding::Spaced, entries),
        }
    }
}

impl AnswersAsset {
    fn into_parts(self) -> (Option<AssetVersion>, Encoding, Vec<(String, Vec<String>)>) {
        match self {
            AnswersAsset::Versioned {
                version,
                encoding,
                answers,
            } => (Some(version), encoding, answers),
            AnswersAsset::Plain(answers) => (None, Encoding::Spaced, answers),
        }
    }
}

/// A word together with its pronunciations.
pub type Entry = (Word, Vec<Transcript>);

/// The answer candidates whose pronunciations have a given length.
#[derive(Debug)]
pub struct AnswerPool {
    length: usize,
    entries: Vec<Entry>,
}

impl AnswerPool {
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }
}

/// Normalizes player input and asset heads the same way.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Read-only word -> transcripts lookup, built once from the assets.
pub struct Dictionary {
    version: Option<AssetVersion>,
    words: HashMap<Word, Vec<Transcript>>,
    /// Answer candidates in index order.
    candidates: Vec<Entry>,
    pools: RefCell<HashMap<usize, Rc<AnswerPool>>>,
}

impl Dictionary {
    /// Builds a dictionary from the full asset and, optionally, the curated
    /// answers asset. Without answers every dictionary word is a candidate,
    /// in alphabetical order.
    pub fn from_assets(
        dictionary: DictionaryAsset,
        answers: Option<AnswersAsset>,
    ) -> DictionaryResult<Self> {
        let (version, encoding, raw_entries) = dictionary.into_parts();

        let mut words: BTreeMap<Word, Vec<Transcript>> = BTreeMap::new();
        for (word, raws) in raw_entries {
            let word = normalize_word(&word);
            let transcripts = decode_all(&word, &raws, encoding)?;
            merge_transcripts(words.entry(word).or_default(), transcripts);
        }
        words.retain(|_, transcripts| !transcripts.is_empty());

        let candidates = match answers {
            Some(answers) => {
                let (answers_version, answers_encoding, raw_answers) = answers.into_parts();
                // Both assets carry the same version, or neither does.
                if version != answers_version {
                    return Err(DictionaryError::VersionMismatch {
                        dictionary: describe_version(version.as_ref()),
                        answers: describe_version(answers_version.as_ref()),
                    });
                }
                let mut candidates = Vec::with_capacity(raw_answers.len());
                for (word, raws) in raw_answers {
                    let word = normalize_word(&word);
                    let transcripts = decode_all(&word, &raws, answers_encoding)?;
                    if transcripts.is_empty() {
                        continue;
                    }
                    // Every answer must also be accepted as a guess.
                    merge_transcripts(words.entry(word.clone()).or_default(), transcripts.clone());
                    candidates.push((word, transcripts));
                }
                candidates
            }
            None => words
                .iter()
                .map(|(word, transcripts)| (word.clone(), transcripts.clone()))
                .collect(),
        };

        if words.is_empty() {
            return Err(DictionaryError::EmptyDictionary);
        }

        info!(
            words = words.len(),
            candidates = candidates.len(),
            version = ?version,
            "Dictionary loaded"
        );

        Ok(Self {
            version,
            words: words.into_iter().collect(),
            candidates,
            pools: RefCell::new(HashMap::new()),
        })
    }

    pub fn from_json(dictionary: &str, answers: Option<&str>) -> DictionaryResult<Self> {
        let dictionary: DictionaryAsset = serde_json::from_str(dictionary)?;
        let answers = answers.map(serde_json::from_str::<AnswersAsset>).transpose()?;
        Self::from_assets(dictionary, answers)
    }

    pub fn version(&self) -> Option<&AssetVersion> {
        self.version.as_ref()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.words.contains_key(&normalize_word(word))
    }

    /// Every pronunciation of `word`, or an empty slice for unknown words.
    pub fn transcripts_for_word(&self, word: &str) -> &[Transcript] {
        self.words
            .get(&normalize_word(word))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Candidates with at least one pronunciation of exactly `length`
    /// phonemes, keeping only those pronunciations. Built on first use and
    /// cached for the lifetime of the dictionary.
    pub fn answer_pool(&self, length: usize) -> Rc<AnswerPool> {
        if let Some(pool) = self.pools.borrow().get(&length) {
            return Rc::clone(pool);
        }

        let entries: Vec<Entry> = self
            .candidates
            .iter()
            .filter_map(|(word, transcripts)| {
                let matching: Vec<Transcript> = transcripts
                    .iter()
                    .filter(|t| t.len() == length)
                    .cloned()
                    .collect();
                (!matching.is_empty()).then(|| (word.clone(), matching))
            })
            .collect();
        debug!(length, size = entries.len(), "Built answer pool");

        let pool = Rc::new(AnswerPool { length, entries });
        self.pools.borrow_mut().insert(length, Rc::clone(&pool));
        pool
    }

    /// Picks a candidate by position regardless of length. The same index
    /// reduction as [`Dictionary::answer_pool`] selection applies.
    pub fn answer_by_index(&self, index: i64) -> DictionaryResult<(&str, &Transcript)> {
        let (word, transcripts) = pick(&self.candidates, index).ok_or(DictionaryError::NoAnswers)?;
        let transcript = pick(transcripts, index).ok_or(DictionaryError::NoAnswers)?;
        Ok((word.as_str(), transcript))
    }
}

pub fn describe_version(version: Option<&AssetVersion>) -> String {
    version.map_or_else(|| "unversioned".to_string(), ToString::to_string)
}

/// `items[index mod len]` with a Euclidean remainder, so negative indices wrap.
pub(crate) fn pick<T>(items: &[T], index: i64) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let position = index.rem_euclid(items.len() as i64) as usize;
    items.get(position)
}

fn decode_all(word: &str, raws: &[String], encoding: Encoding) -> DictionaryResult<Vec<Transcript>> {
    raws.iter()
        .map(|raw| {
            encoding
                .decode(raw)
                .map_err(|source| DictionaryError::InvalidTranscript {
                    word: word.to_string(),
                    source,
                })
        })
        .collect()
}

fn merge_transcripts(into: &mut Vec<Transcript>, transcripts: Vec<Transcript>) {
    for transcript in transcripts {
        if !into.contains(&transcript) {
            into.push(transcript);
        }
    }
}
