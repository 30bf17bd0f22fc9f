use std::{fmt, result};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("Model not loaded")]
    NotLoaded,

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Context re-init failed: {0}")]
    Context(String),

    #[error("Tokenization failed: {0}")]
    Tokenize(String),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    pub fn config<T: fmt::Display>(inner: T) -> Self {
        Self::Config(inner.to_string())
    }
    pub fn model_load<T: fmt::Display>(inner: T) -> Self {
        Self::ModelLoad(inner.to_string())
    }
    pub fn context<T: fmt::Display>(inner: T) -> Self {
        Self::Context(inner.to_string())
    }
    pub fn tokenize<T: fmt::Display>(inner: T) -> Self {
        Self::Tokenize(inner.to_string())
    }
    pub fn decode<T: fmt::Display>(inner: T) -> Self {
        Self::Decode(inner.to_string())
    }
}
