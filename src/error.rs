//! Error types.
//!
//! - `FitError` is the library-level taxonomy returned by the fitting core.
//! - `AppError` is what the binary reports: a message plus a process exit code.

use thiserror::Error;

/// Errors raised by a single fit invocation.
///
/// Every variant is local to the call that produced it; callers can retry with a
/// different strategy, threshold or window.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// Mismatched lengths, empty sequences, non-finite values, bad windows.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Strategy token other than `std` / `iqr`.
    #[error("Unknown outlier strategy '{0}' (expected 'std' or 'iqr')")]
    InvalidStrategy(String),

    /// Threshold must be finite and strictly positive.
    #[error("Invalid threshold {0}: must be finite and > 0")]
    InvalidThreshold(f64),

    /// Fewer points than OLS needs survived filtering.
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },
}

impl FitError {
    /// Exit code the binary uses when this error ends a run.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::InvalidInput(_) | FitError::InvalidStrategy(_) | FitError::InvalidThreshold(_) => 2,
            FitError::InsufficientData { .. } => 3,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_errors_map_to_exit_codes() {
        let err: AppError = FitError::InsufficientData { required: 2, actual: 1 }.into();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "Insufficient data: need at least 2 points, got 1");

        let err: AppError = FitError::InvalidStrategy("mad".to_string()).into();
        assert_eq!(err.exit_code(), 2);
    }
}
