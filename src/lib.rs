//! This crate provides an interface for communicating with and controlling the Korad KA3005
//! family of CC/CV bench power supplies over their serial control protocol.
//!
//! Example PSU model numbers which this should work with:
//! * KA3005P
//! * KA3005D
//! * KD3005P
//! * KA3003P
//! * KA6002P / KA6003P
//!
//! Rebranded units using the same protocol (Tenma 72-2535, Velleman LABPS3005D, RND 320-KA3005P)
//! should also work. Dual-output units such as the KA3305P expose a second channel; pass
//! [`types::Channels::Dual`] when constructing the driver for those.
//!
//! The protocol is plain ASCII command/response over RS-232. The serial port used for PSU comms
//! should be configured like so:
//! * Baud rate: 9600
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//! * Read timeout: ~100 ms
//!
//! The read timeout matters: the driver issues one read per reply window and relies on the port
//! returning whatever bytes arrived within the timeout (possibly none). The device needs a short
//! quiet period after every command and sometimes drops replies outright, so query transactions
//! are paced and retried internally; see [`psu::Timing`].

pub mod command;
pub mod error;
pub mod psu;
pub mod status;
pub mod types;

#[cfg(test)]
mod mock_serial;
