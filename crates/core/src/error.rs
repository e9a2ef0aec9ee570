use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable UPLOAD_API_ENDPOINT is not defined")]
    MissingEndpoint,

    #[error("Invalid chunking options: {0}")]
    InvalidChunking(String),
}
