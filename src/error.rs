use thiserror::Error;

use crate::texts::Difficulty;

#[derive(Error, Debug)]
pub enum KeyrankError {
    #[error("target text must not be empty")]
    EmptyText,

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("no sample texts available for {0}")]
    EmptyCorpus(Difficulty),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize/deserialize data: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KeyrankError>;
