//! This module decodes the supply's packed status byte and assembles the full
//! device-status snapshot out of it and the per-channel numeric readings.

use modular_bitfield::prelude::*;
use strum_macros::EnumIter;

/// Represents the two possible regulation modes of an output channel.
#[derive(Specifier, Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[bits = 1]
pub enum ControlMode {
    /// Constant voltage regulation mode.
    Cv,
    /// Constant current regulation mode.
    Cc,
}

/// How the two output channels of a dual supply are electrically coupled.
#[derive(Specifier, Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
#[bits = 2]
pub enum TrackingMode {
    /// Channels operate independently.
    Independent,
    /// Outputs tracked in series.
    Series,
    /// Value `2` is undocumented for this family; kept distinct rather than
    /// mapped onto a neighbouring mode.
    Reserved,
    /// Outputs tracked in parallel.
    Parallel,
}

/// The raw `STATUS?` reply, one byte with packed fields.
///
/// Bit 7 is unused on this family.
#[bitfield]
#[derive(Debug, Clone, Copy)]
pub struct StatusByte {
    /// Bit 0 - channel 1 regulation mode.
    pub ch1_mode: ControlMode,
    /// Bit 1 - channel 2 regulation mode. Only meaningful on dual supplies.
    pub ch2_mode: ControlMode,
    /// Bits 2-3 - channel tracking mode.
    pub tracking: TrackingMode,
    /// Bit 4 - beeper enabled.
    pub beep: bool,
    /// Bit 5 - front-panel keypad lock engaged.
    pub lock: bool,
    /// Bit 6 - output enabled.
    pub output: bool,
    #[skip]
    __: B1,
}

/// The four numeric query results for one channel, as read off the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelReadings {
    /// Configured voltage limit, volts.
    pub vset: f64,
    /// Configured current limit, amps.
    pub iset: f64,
    /// Measured output voltage, volts.
    pub vout: f64,
    /// Measured output current, amps.
    pub iout: f64,
}

/// Full state of one output channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStatus {
    /// Active regulation mode.
    pub mode: ControlMode,
    /// Configured voltage limit, volts.
    pub vset: f64,
    /// Configured current limit, amps.
    pub iset: f64,
    /// Measured output voltage, volts.
    pub vout: f64,
    /// Measured output current, amps.
    pub iout: f64,
}

/// Snapshot of the whole supply at one point in time.
///
/// `channels` holds exactly one entry per configured channel, in channel order.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    pub channels: heapless::Vec<ChannelStatus, 2>,
    pub tracking: TrackingMode,
    pub beep: bool,
    pub lock: bool,
    pub output: bool,
}

impl DeviceStatus {
    /// Combine the packed status byte with the per-channel numeric readings.
    ///
    /// Pure function: one [`ChannelStatus`] is produced per entry of `readings`
    /// (capped at the two channels the status byte can describe), pairing that
    /// channel's mode bit with its readings.
    pub fn decode(byte: StatusByte, readings: &[ChannelReadings]) -> Self {
        let mut channels = heapless::Vec::new();
        for (index, reading) in readings.iter().take(2).enumerate() {
            let mode = match index {
                0 => byte.ch1_mode(),
                _ => byte.ch2_mode(),
            };
            channels
                .push(ChannelStatus {
                    mode,
                    vset: reading.vset,
                    iset: reading.iset,
                    vout: reading.vout,
                    iout: reading.iout,
                })
                .ok();
        }
        DeviceStatus {
            channels,
            tracking: byte.tracking(),
            beep: byte.beep(),
            lock: byte.lock(),
            output: byte.output(),
        }
    }
}
