use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("key exchange failed: {0}")]
    AuthExchange(String),

    #[error("no credential held")]
    MissingCredential,

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("a generation is already in flight")]
    GenerationInProgress,

    #[error("no generated model to download")]
    NothingToDownload,

    #[error("download failed: {0}")]
    Download(String),

    #[error("quality must be one of 16, 32 or 54, got {0}")]
    InvalidQuality(u32),

    #[error("key store error: {0}")]
    Store(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Text shown to the user. Transport details stay in the logs.
    pub fn notice(&self) -> &'static str {
        match self {
            Error::AuthExchange(_) => "Openrouter login failed.",
            Error::MissingCredential => "Please login with Openrouter.",
            Error::Generation(_) => "Error generating model.",
            Error::GenerationInProgress => "A model is already being generated.",
            Error::NothingToDownload => "Generate a model first.",
            Error::Download(_) | Error::Io(_) => "Error downloading model.",
            Error::InvalidQuality(_) => "Unknown quality setting.",
            Error::Store(_) | Error::Config(_) | Error::Json(_) => "Something went wrong.",
        }
    }
}
