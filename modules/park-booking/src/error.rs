use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] park_api_client::ApiError),
}
