// File: src/normalizer.rs
//! Converts a CMU-style pronunciation dictionary into the game's phoneme
//! alphabet.
//!
//! Each source line looks like `HEAD(2)  P R AH0 N AH2 N S IY0 EY1 SH AH0 N`.
//! Tokens are mapped one to one, then a single left-to-right pass merges
//! syllable-final vowel + `r` into rhotic vowels and applies the cot-caught
//! merger.

use crate::core::dictionary::DictionaryAsset;
use crate::core::phoneme::Phoneme;
use crate::core::transcript::{Transcript, Word};
use crate::error::{NormalizeError, NormalizeResult, TranscriptError};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::io::BufRead;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Intermediate "aw" vowel. Never survives normalization.
const AW: &str = "aw";

fn line_shape() -> &'static Regex {
    static LINE_SHAPE: OnceLock<Regex> = OnceLock::new();
    LINE_SHAPE.get_or_init(|| {
        Regex::new(r"^([.'_a-z-]+)(?:\((\d+)\))?\s+([a-z]+\d?(?:\s+[a-z]+\d?)*)$")
            .expect("line shape pattern is valid")
    })
}

/// Maps a source phoneme (stress digit already stripped, lowercase) to the
/// target alphabet.
pub fn source_to_target(token: &str) -> Option<&'static str> {
    let target = match token {
        "aa" => "awe",
        "ao" => AW,
        "ae" => "aa",
        "ay" => "eye",
        "aw" => "ao",
        "eh" => "eh",
        "ey" => "ey",
        "ih" => "i",
        "iy" => "ee",
        "ow" => "oh",
        "oy" => "oy",
        "uw" => "oo",
        "uh" => "u",
        "ah" => "uh",
        "er" => "er",
        "b" => "b",
        "ch" => "ch",
        "d" => "d",
        "dh" => "dh",
        "f" => "f",
        "g" => "g",
        "hh" => "h",
        "jh" => "j",
        "k" => "k",
        "l" => "l",
        "m" => "m",
        "n" => "n",
        "ng" => "ng",
        "p" => "p",
        "r" => "r",
        "s" => "s",
        "sh" => "sh",
        "t" => "t",
        "th" => "th",
        "v" => "v",
        "w" => "w",
        "y" => "y",
        "z" => "z",
        "zh" => "zh",
        _ => return None,
    };
    Some(target)
}

fn is_vowel(key: &str) -> bool {
    matches!(
        key,
        "awe" | "aw" | "aa" | "eye" | "ao" | "eh" | "ey" | "i" | "ee" | "oh" | "oy" | "oo" | "u" | "uh" | "er"
    )
}

/// What a vowel followed by a syllable-final `r` becomes. `uh` and `er` never
/// combine.
fn rhotic_expansion(vowel: &str) -> Option<&'static [&'static str]> {
    let expansion: &'static [&'static str] = match vowel {
        "awe" => &["are"],
        "oh" | "aw" => &["or"],
        "eye" => &["ire"],
        "ao" => &["our"],
        "ey" | "eh" | "aa" => &["err"],
        "ee" | "i" => &["ear"],
        "oy" => &["oy", "er"],
        "u" | "oo" => &["oor"],
        _ => return None,
    };
    Some(expansion)
}

/// Single pass, one token of lookahead, no backtracking.
pub fn normalize_keys(keys: &[&'static str]) -> Vec<&'static str> {
    let mut normalized = Vec::with_capacity(keys.len());
    let mut i = 0;
    while i < keys.len() {
        let current = keys[i];
        let next = keys.get(i + 1).copied();
        let after_next = keys.get(i + 2).copied();

        match rhotic_expansion(current) {
            Some(expansion) if next == Some("r") && !after_next.is_some_and(is_vowel) => {
                normalized.extend_from_slice(expansion);
                i += 2;
            }
            _ => {
                // Cot-caught merger
                normalized.push(if current == AW { "awe" } else { current });
                i += 1;
            }
        }
    }
    normalized
}

/// Head with punctuation removed, if it had any.
fn punctuation_free_alias(head: &str) -> Option<String> {
    let is_punctuation = |c: char| c.is_whitespace() || matches!(c, '\'' | '.' | '-');
    if !head.contains(is_punctuation) {
        return None;
    }
    let alias: String = head.chars().filter(|&c| !is_punctuation(c)).collect();
    (!alias.is_empty()).then_some(alias)
}

/// One head per line, trimmed and lowercased. Blank lines are ignored.
pub fn load_filter<R: BufRead>(reader: R) -> NormalizeResult<HashSet<String>> {
    let mut filter = HashSet::new();
    for line in reader.lines() {
        let head = line?.trim().to_lowercase();
        if !head.is_empty() {
            filter.insert(head);
        }
    }
    Ok(filter)
}

#[derive(Debug, Clone, Default)]
pub struct NormalizerConfig {
    /// Fail on the first malformed line instead of skipping it.
    pub strict: bool,
    /// Heads to drop from the output.
    pub filter: Option<HashSet<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub lines: usize,
    pub pronunciations: usize,
    pub skipped: usize,
    pub filtered: usize,
}

/// Accumulates normalized pronunciations line by line.
pub struct Normalizer {
    config: NormalizerConfig,
    entries: BTreeMap<Word, Vec<Transcript>>,
    stats: NormalizeStats,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            config,
            entries: BTreeMap::new(),
            stats: NormalizeStats::default(),
        }
    }

    /// Reads every line of `reader`. Bytes that are not UTF-8 (the CMU source
    /// is Latin-1) are replaced, which only affects heads that get skipped.
    pub fn read<R: BufRead>(&mut self, mut reader: R) -> NormalizeResult<()> {
        let mut buf = Vec::new();
        let mut line_number = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_number += 1;
            let line = String::from_utf8_lossy(&buf);
            self.push_line(line_number, &line)?;
        }
        debug!(?self.stats, "Finished reading source dictionary");
        Ok(())
    }

    pub fn push_line(&mut self, line_number: usize, line: &str) -> NormalizeResult<()> {
        self.stats.lines += 1;
        let line = line.trim().to_lowercase();
        if line.is_empty() || line.starts_with(';') || !line.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Ok(());
        }

        let Some(captures) = line_shape().captures(&line) else {
            if self.config.strict {
                return Err(NormalizeError::MalformedLine { line_number, line });
            }
            warn!(line_number, %line, "Line did not match expected format, skipping");
            self.stats.skipped += 1;
            return Ok(());
        };
        let head = &captures[1];

        if self.config.filter.as_ref().is_some_and(|f| f.contains(head)) {
            self.stats.filtered += 1;
            return Ok(());
        }

        let keys = captures[3]
            .split_whitespace()
            .map(|token| {
                let bare = token.trim_end_matches(|c: char| c.is_ascii_digit());
                source_to_target(bare).ok_or_else(|| NormalizeError::UnknownPhoneme {
                    token: token.to_string(),
                    line_number,
                    line: line.clone(),
                })
            })
            .collect::<NormalizeResult<Vec<_>>>()?;

        let transcript = to_transcript(&normalize_keys(&keys))
            .map_err(|source| NormalizeError::InvalidTranscript { line_number, source })?;

        // "_" separates the words of a multi-word head
        let head = head.replace('_', " ");
        if let Some(alias) = punctuation_free_alias(&head) {
            self.insert(alias, transcript.clone());
        }
        self.insert(head, transcript);
        self.stats.pronunciations += 1;
        Ok(())
    }

    fn insert(&mut self, head: Word, transcript: Transcript) {
        let transcripts = self.entries.entry(head).or_default();
        if !transcripts.contains(&transcript) {
            transcripts.push(transcript);
        }
    }

    pub fn stats(&self) -> NormalizeStats {
        self.stats
    }

    pub fn entries(&self) -> &BTreeMap<Word, Vec<Transcript>> {
        &self.entries
    }

    /// The dictionary asset in the spaced encoding.
    pub fn into_asset(self) -> DictionaryAsset {
        DictionaryAsset::Plain(
            self.entries
                .into_iter()
                .map(|(head, transcripts)| {
                    (head, transcripts.iter().map(ToString::to_string).collect())
                })
                .collect(),
        )
    }
}

fn to_transcript(keys: &[&str]) -> Result<Transcript, TranscriptError> {
    let phonemes = keys
        .iter()
        .map(|&key| {
            Phoneme::from_key(key).ok_or_else(|| TranscriptError::UnknownPhoneme {
                token: key.to_string(),
                raw: keys.join(" "),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Transcript::new(phonemes)
}
