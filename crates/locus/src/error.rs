use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Address has no locatable field")]
    NotGeocodable,
    #[error("Street intersections are not supported")]
    UnsupportedIntersection,
    #[error("Search backend error: {0}")]
    Backend(#[from] crate::search::BackendError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Init Logging error: {0}")]
    InitLogging(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GeocodingError>;
