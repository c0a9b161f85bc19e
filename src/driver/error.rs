//! Errors raised while opening a driver instance

use std::fmt;

/// Errors detected at the driver boundary
///
/// Operation failures after construction follow the driver's own
/// convention (`false`, `0` or an empty string) and never surface here.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A transport primitive handed to the driver was null
    NullPointer { argument: &'static str },
    /// The driver returned a null instance
    NullHandle,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NullPointer { argument } => {
                write!(f, "Null pointer passed as transport '{}'", argument)
            }
            Error::NullHandle => {
                write!(f, "Driver returned a null IM920 instance")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type for driver construction
pub type DriverResult<T> = Result<T, Error>;
