//! Error type for the fallible corners of the control loop.
//!
//! Nothing here is fatal: the controller logs the error and keeps polling.

/// Errors raised by the control loop helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A status line did not fit into the fixed-capacity message buffer.
    MessageOverflow,
    /// The indicator pin refused to toggle.
    Indicator,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::MessageOverflow => f.write_str("status message exceeds buffer capacity"),
            Error::Indicator => f.write_str("indicator pin error"),
        }
    }
}

impl From<core::fmt::Error> for Error {
    fn from(_: core::fmt::Error) -> Self {
        Error::MessageOverflow
    }
}
