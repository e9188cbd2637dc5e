//! This module contains types describing the device configuration.

/// Used to be less ambiguous about whether something is on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Disabled.
    Off,
    /// Enabled.
    On,
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

/// How many output channels the connected supply has.
///
/// This is a capability of the hardware, fixed when the driver is constructed.
/// Most KA3005-family units are single-channel; units like the KA3305P carry two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// One output channel.
    Single,
    /// Two output channels.
    Dual,
}

impl Channels {
    /// Number of channels, for iteration and bounds checks. Channel indices are 1-based.
    pub fn count(self) -> u8 {
        match self {
            Channels::Single => 1,
            Channels::Dual => 2,
        }
    }
}
