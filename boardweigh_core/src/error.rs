use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum WeighError {
    #[error("board source error: {0}")]
    Source(String),
    #[error("board source fault: {0}")]
    SourceFault(String),
    #[error("timeout waiting for board data")]
    Timeout,
    #[error("calibration stream ended early: got {got} of {need} frames")]
    InsufficientSamples { got: usize, need: usize },
    #[error("measurement cancelled")]
    Cancelled,
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing board source")]
    MissingSource,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

/// Map a boxed source error to a typed WeighError, with special handling
/// for hardware errors.
pub(crate) fn map_source_error(e: &(dyn std::error::Error + 'static)) -> WeighError {
    #[cfg(feature = "hardware-errors")]
    if let Some(hw) = e.downcast_ref::<boardweigh_hardware::error::HwError>() {
        use boardweigh_hardware::error::HwError;
        return match hw {
            HwError::Timeout => WeighError::Timeout,
            other => WeighError::SourceFault(other.to_string()),
        };
    }
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        WeighError::Timeout
    } else {
        WeighError::Source(s)
    }
}
