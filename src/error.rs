//! Our error types for the Korad PSUs.

use crate::command::Command;
use thiserror::Error;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Custom error type for Korad KA3005 PSU communications.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("serial communication error")]
    Serial(I),
    /// A query went unanswered for the full retry budget. Carries the command
    /// that got no reply.
    #[error("no response to the '{0}' command")]
    NoResponse(Command),
    #[error("response contains non-ASCII bytes")]
    Decode,
    #[error("response is not a valid number")]
    Parse,
    #[error("channel {0} is not present on this supply")]
    InvalidChannel(u8),
    #[error("internal buffer overflow")]
    Buffer,
}
