use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response is missing `{0}`")]
    MissingField(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("could not initialize logging: {0}")]
    Logging(String),
}
