use thiserror::Error;

/// Failures raised while drawing a deck.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Icon asset not found: {0}")]
    MissingAsset(String),

    #[error("Could not decode image {path}: {message}")]
    Image { path: String, message: String },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Character {character:?} in {text:?} cannot be printed with the card font")]
    Unsupported { text: String, character: char },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CardsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    #[error("Tracker error: {0}")]
    Remote(String),

    #[error("Label update aborted at story #{story_id} ({updated} already updated): {source}")]
    UpdateAborted {
        story_id: u64,
        updated: usize,
        #[source]
        source: Box<CardsError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used by callers to branch on a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Rendering,
    Remote,
    RemoteUpdate,
    Other,
}

impl CardsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CardsError::Config(_) | CardsError::Yaml(_) => ErrorKind::Configuration,
            CardsError::Render(_) => ErrorKind::Rendering,
            CardsError::Remote(_) => ErrorKind::Remote,
            CardsError::UpdateAborted { .. } => ErrorKind::RemoteUpdate,
            CardsError::Io(_) | CardsError::Json(_) => ErrorKind::Other,
        }
    }
}

impl From<reqwest::Error> for CardsError {
    fn from(err: reqwest::Error) -> Self {
        CardsError::Remote(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CardsError>;
