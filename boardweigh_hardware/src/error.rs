use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("board timeout")]
    Timeout,
    #[error("no balance board found")]
    NotFound,
    #[error("device error: {0}")]
    Device(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
