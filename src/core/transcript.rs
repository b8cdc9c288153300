// src/core/transcript.rs
use crate::core::phoneme::Phoneme;
use crate::error::TranscriptError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// A plain lowercase word, possibly with apostrophes, periods or hyphens.
pub type Word = String;

/// One pronunciation of a word: an ordered, non-empty sequence of phonemes.
///
/// Serialized as the space-joined phoneme keys, e.g. `"k aa t"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Transcript(Vec<Phoneme>);

impl Transcript {
    pub fn new(phonemes: Vec<Phoneme>) -> Result<Self, TranscriptError> {
        if phonemes.is_empty() {
            return Err(TranscriptError::Empty);
        }
        Ok(Self(phonemes))
    }

    /// Parses whitespace-separated phoneme keys.
    pub fn parse(raw: &str) -> Result<Self, TranscriptError> {
        let phonemes = raw
            .split_whitespace()
            .map(|token| {
                Phoneme::from_key(token).ok_or_else(|| TranscriptError::UnknownPhoneme {
                    token: token.to_string(),
                    raw: raw.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(phonemes)
    }

    /// Parses the compact encoding, one character per phoneme.
    pub fn parse_compact(raw: &str) -> Result<Self, TranscriptError> {
        let phonemes = raw
            .trim()
            .chars()
            .map(|c| {
                Phoneme::from_code(c).ok_or_else(|| TranscriptError::UnknownPhoneme {
                    token: c.to_string(),
                    raw: raw.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(phonemes)
    }

    pub fn to_compact(&self) -> String {
        self.0.iter().map(|p| p.code()).collect()
    }

    pub fn phonemes(&self) -> &[Phoneme] {
        &self.0
    }
}

impl Deref for Transcript {
    type Target = [Phoneme];

    fn deref(&self) -> &[Phoneme] {
        &self.0
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, phoneme) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(phoneme.key())?;
        }
        Ok(())
    }
}

impl FromStr for Transcript {
    type Err = TranscriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Transcript {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Transcript {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Phoneme::*;

    #[test]
    fn parses_spaced_keys() {
        let t = Transcript::parse("k aa t").unwrap();
        assert_eq!(t.phonemes(), &[K, Aa, T]);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn tolerates_irregular_whitespace() {
        let t = Transcript::parse("  ch eh\ts   t ").unwrap();
        assert_eq!(t.phonemes(), &[Ch, Eh, S, T]);
        assert_eq!(t.to_string(), "ch eh s t");
    }

    #[test]
    fn rejects_unknown_tokens() {
        let err = Transcript::parse("k xx t").unwrap_err();
        assert_eq!(
            err,
            TranscriptError::UnknownPhoneme {
                token: "xx".to_string(),
                raw: "k xx t".to_string()
            }
        );
        assert!(Transcript::parse("K AA T").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(Transcript::parse("   "), Result::Err(TranscriptError::Empty));
        assert_eq!(Transcript::parse_compact(""), Result::Err(TranscriptError::Empty));
    }

    #[test]
    fn serialized_form_reparses_to_equal_transcript() {
        for raw in ["b are n", "oy er", "awe", "zh ire ng  uh"] {
            let t = Transcript::parse(raw).unwrap();
            assert_eq!(Transcript::parse(&t.to_string()).unwrap(), t);
        }
    }

    #[test]
    fn compact_encoding() {
        let t = Transcript::parse("l oo k ey d ee uh").unwrap();
        assert_eq!(t.to_compact(), "l2k3d10");
        assert_eq!(Transcript::parse_compact("l2k3d10").unwrap(), t);
        assert!(Transcript::parse_compact("l2k?").is_err());
    }

    #[test]
    fn serde_round_trip_through_json() {
        let t = Transcript::parse("sh oor").unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"sh oor\"");
        let back: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<Transcript>("\"sh qq\"").is_err());
    }
}
