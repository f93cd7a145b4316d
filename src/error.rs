use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrenoError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream answered {status} for {url:?}")]
    Upstream { status: u16, url: String },

    #[error("Could not decode payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not read station list: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Payload is not a train status object")]
    NotATrain,

    #[error("No such train {number:?}")]
    UnknownTrain { number: String },

    #[error("Train {number:?} departs from several stations ({origins}), pick one with --from")]
    AmbiguousTrain { number: String, origins: String },

    #[error("Train {number:?} does not depart from {origin:?}")]
    NoSuchOrigin { number: String, origin: String },

    #[error("Invalid base URL {0:?}")]
    BaseUrl(String),

    #[error("Unknown timezone {0:?}")]
    Timezone(String),

    #[error("Could not parse timestamp {0:?}")]
    Timestamp(String),

    #[error("Malformed autocomplete line {0:?}")]
    Autocomplete(String),
}

pub type Result<T> = std::result::Result<T, TrenoError>;
