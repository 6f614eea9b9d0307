use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use std::io;
use std::str::FromStr;
use tracing::warn;

use crate::error::{KeyrankError, Result};

static TEXT_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/texts");

const SAMPLES_FILE: &str = "samples.json";

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    /// Resolve a stored or user supplied key; unknown keys fall back to beginner
    pub fn parse_or_default(key: &str) -> Self {
        match key.parse() {
            Ok(difficulty) => difficulty,
            Err(_) => {
                warn!("Unknown difficulty '{}', defaulting to beginner", key);
                Difficulty::default()
            }
        }
    }

    /// The next difficulty, wrapping around after advanced
    pub fn cycle(self) -> Self {
        match self {
            Difficulty::Beginner => Difficulty::Intermediate,
            Difficulty::Intermediate => Difficulty::Advanced,
            Difficulty::Advanced => Difficulty::Beginner,
        }
    }
}

impl FromStr for Difficulty {
    type Err = KeyrankError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(KeyrankError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Practice texts grouped by difficulty
#[derive(Deserialize, Clone, Debug)]
pub struct TextCorpus {
    beginner: Vec<String>,
    intermediate: Vec<String>,
    advanced: Vec<String>,
}

impl TextCorpus {
    /// Load the corpus bundled into the binary
    pub fn embedded() -> Result<Self> {
        let file = TEXT_DIR.get_file(SAMPLES_FILE).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "bundled sample texts not found")
        })?;
        let contents = file.contents_utf8().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "sample texts are not utf-8")
        })?;
        Self::from_json(contents)
    }

    /// Parse a corpus; every difficulty must have at least one non-empty text
    pub fn from_json(json: &str) -> Result<Self> {
        let corpus: TextCorpus = serde_json::from_str(json)?;
        for difficulty in Difficulty::ALL {
            if corpus.texts(difficulty).iter().all(|t| t.is_empty()) {
                return Err(KeyrankError::EmptyCorpus(difficulty));
            }
        }
        Ok(corpus)
    }

    pub fn texts(&self, difficulty: Difficulty) -> &[String] {
        match difficulty {
            Difficulty::Beginner => &self.beginner,
            Difficulty::Intermediate => &self.intermediate,
            Difficulty::Advanced => &self.advanced,
        }
    }

    /// Pick one text of the given difficulty
    pub fn select<R: Rng + ?Sized>(&self, difficulty: Difficulty, rng: &mut R) -> Result<&str> {
        let candidates: Vec<&String> = self
            .texts(difficulty)
            .iter()
            .filter(|t| !t.is_empty())
            .collect();
        candidates
            .choose(rng)
            .copied()
            .map(String::as_str)
            .ok_or(KeyrankError::EmptyCorpus(difficulty))
    }

    pub fn select_random(&self, difficulty: Difficulty) -> Result<&str> {
        self.select(difficulty, &mut rand::thread_rng())
    }
}
