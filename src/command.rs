//! This module defines the command set of the Korad serial protocol and the frame
//! codec turning commands into wire bytes and replies back into typed values.

use core::fmt;
use core::fmt::Write as _;

use crate::error::{Error, Result};
use crate::types::State;

/// Meaningful width of a current reply. The device pads current readings out to a
/// fixed field and sometimes appends unrelated bytes straight after, so anything
/// past this is discarded before parsing.
const CURRENT_REPLY_CHARS: usize = 5;

/// One instruction for the supply.
///
/// The variants use the nomenclature that "set" means to write a configuration
/// value, "get" means to read a configuration value back, and "read" means to get
/// a measured value.
///
/// `Display` renders the exact wire form of the command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `*IDN?` - query the identification string.
    Identify,
    /// `VSET<ch>:<v.vv>` - set the voltage limit. Directive, no reply.
    SetVoltage { channel: u8, volts: f64 },
    /// `ISET<ch>:<i.iii>` - set the current limit. Directive, no reply.
    SetCurrent { channel: u8, amps: f64 },
    /// `VSET<ch>?` - query the configured voltage limit.
    GetVoltage(u8),
    /// `ISET<ch>?` - query the configured current limit.
    GetCurrent(u8),
    /// `VOUT<ch>?` - query the measured output voltage.
    ReadVoltage(u8),
    /// `IOUT<ch>?` - query the measured output current.
    ReadCurrent(u8),
    /// `OUT<0|1>` - switch the output on or off. Directive, no reply.
    SetOutput(State),
    /// `STATUS?` - query the packed status byte. Answered with one raw byte.
    Status,
}

impl Command {
    /// ASCII wire encoding of this command. The protocol uses no terminator byte
    /// in either direction.
    pub fn encode<I: embedded_io::Error>(&self) -> Result<heapless::String<16>, I> {
        let mut frame = heapless::String::new();
        write!(frame, "{self}").map_err(|_| Error::Buffer)?;
        Ok(frame)
    }

    /// How many reply characters carry data, for replies the device pads with
    /// junk. `None` means the whole reply is meaningful.
    pub fn reply_limit(&self) -> Option<usize> {
        match self {
            Command::GetCurrent(_) | Command::ReadCurrent(_) => Some(CURRENT_REPLY_CHARS),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Identify => f.write_str("*IDN?"),
            Command::SetVoltage { channel, volts } => write!(f, "VSET{channel}:{volts:.2}"),
            Command::SetCurrent { channel, amps } => write!(f, "ISET{channel}:{amps:.3}"),
            Command::GetVoltage(channel) => write!(f, "VSET{channel}?"),
            Command::GetCurrent(channel) => write!(f, "ISET{channel}?"),
            Command::ReadVoltage(channel) => write!(f, "VOUT{channel}?"),
            Command::ReadCurrent(channel) => write!(f, "IOUT{channel}?"),
            Command::SetOutput(state) => write!(f, "OUT{}", *state as u8),
            Command::Status => f.write_str("STATUS?"),
        }
    }
}

/// Strip trailing NUL padding from a reply window and decode it as 7-bit ASCII.
pub fn decode_text<I: embedded_io::Error>(raw: &[u8]) -> Result<&str, I> {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    let text = core::str::from_utf8(&raw[..end]).map_err(|_| Error::Decode)?;
    if !text.is_ascii() {
        return Err(Error::Decode);
    }
    Ok(text)
}

/// Parse a decoded reply as a float, cutting it to `limit` characters first when
/// one is given.
pub fn decode_float<I: embedded_io::Error>(text: &str, limit: Option<usize>) -> Result<f64, I> {
    let text = match limit.and_then(|limit| text.get(..limit)) {
        Some(cut) => cut,
        None => text,
    };
    text.trim().parse().map_err(|_| Error::Parse)
}
