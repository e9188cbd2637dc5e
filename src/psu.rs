//! The device facade and the transaction engine it is built on.

use embedded_io::Error as _;
use std::thread;
use std::time::Duration;

use crate::{
    command::{self, Command},
    error::{Error, Result},
    status::{ChannelReadings, DeviceStatus, StatusByte},
    types::{Channels, State},
};

/// Pacing and retry policy for the serial link.
///
/// The defaults are what the hardware needs in practice; the knobs exist for
/// tuning and for running the retry discipline in tests without wall-clock
/// sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Quiet period after every transmitted command. The supply ignores bytes
    /// that arrive while it is still chewing on the previous command.
    pub settle: Duration,
    /// Pause after a query went unanswered, before the whole transmit+read
    /// cycle is repeated.
    pub backoff: Duration,
    /// Transmit attempts per query before giving up with
    /// [`Error::NoResponse`].
    pub attempts: usize,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            settle: Duration::from_millis(150),
            backoff: Duration::from_millis(500),
            attempts: 3,
        }
    }
}

/// You can create a KoradPsu using any interface which implements
/// [embedded_io::Read] & [embedded_io::Write].
///
/// The interface is expected to behave like a serial port with a short (~100 ms)
/// read timeout: a read returns whatever bytes arrived within the timeout and
/// reports a `TimedOut`-kind error when nothing did. The link is half-duplex and
/// lossy in practice, so every query runs under the retry discipline in
/// [`Timing`]; a silent reply window is a transient drop, not a hard failure.
/// Set-style commands have no acknowledgement on this protocol and are sent
/// fire-and-forget.
///
/// For its methods, we use the nomenclature that "set" means to write a
/// configuration value, "get" means to read a configuration value back and
/// "read" means to get a measured value.
///
/// The driver owns the interface for its whole lifetime; dropping the driver
/// releases it, or [`Self::into_inner`] hands it back explicitly.
pub struct KoradPsu<S: embedded_io::Read + embedded_io::Write, const L: usize = 128> {
    interface: S,
    channels: Channels,
    timing: Timing,
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> KoradPsu<S, L> {
    /// Create a new KoradPsu instance over the given interface.
    ///
    /// `channels` is a hardware capability and stays fixed for the lifetime of
    /// the driver; channel arguments on the other methods are validated
    /// against it.
    pub fn new(interface: S, channels: Channels) -> Self {
        Self {
            interface,
            channels,
            timing: Timing::default(),
        }
    }

    /// Replace the link pacing and retry policy.
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// The channel layout this driver was constructed for.
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Consume the driver and hand back the interface.
    pub fn into_inner(self) -> S {
        self.interface
    }

    /// Query the identification string, e.g. `KORAD KA3005P V2.0`.
    pub fn identify(&mut self) -> Result<String, S::Error> {
        self.query(Command::Identify)
    }

    /// Set the voltage limit of a channel, in volts. Fire-and-forget.
    pub fn set_voltage(&mut self, channel: u8, volts: f64) -> Result<(), S::Error> {
        self.check_channel(channel)?;
        self.tx(Command::SetVoltage { channel, volts })
    }

    /// Set the current limit of a channel, in amps. Fire-and-forget.
    pub fn set_current(&mut self, channel: u8, amps: f64) -> Result<(), S::Error> {
        self.check_channel(channel)?;
        self.tx(Command::SetCurrent { channel, amps })
    }

    /// Switch the output on or off. Fire-and-forget.
    pub fn set_output(&mut self, state: impl Into<State>) -> Result<(), S::Error> {
        self.tx(Command::SetOutput(state.into()))
    }

    /// Get the configured voltage limit of a channel, in volts.
    pub fn get_voltage(&mut self, channel: u8) -> Result<f64, S::Error> {
        self.check_channel(channel)?;
        self.query_float(Command::GetVoltage(channel))
    }

    /// Get the configured current limit of a channel, in amps.
    pub fn get_current(&mut self, channel: u8) -> Result<f64, S::Error> {
        self.check_channel(channel)?;
        self.query_float(Command::GetCurrent(channel))
    }

    /// Return the measured output voltage of a channel, in volts.
    pub fn read_voltage(&mut self, channel: u8) -> Result<f64, S::Error> {
        self.check_channel(channel)?;
        self.query_float(Command::ReadVoltage(channel))
    }

    /// Return the measured output current of a channel, in amps.
    pub fn read_current(&mut self, channel: u8) -> Result<f64, S::Error> {
        self.check_channel(channel)?;
        self.query_float(Command::ReadCurrent(channel))
    }

    /// Take a full status snapshot of the supply.
    ///
    /// Reads the packed status byte, then the four numeric values of every
    /// configured channel, each as its own retried query transaction. The
    /// snapshot is all-or-nothing: if any piece cannot be obtained the whole
    /// call fails and no partial status is returned.
    pub fn status(&mut self) -> Result<DeviceStatus, S::Error> {
        // The status byte comes back as one raw byte without ASCII framing, so
        // a short read is a transient drop like any silent window.
        let raw = self.retry(Command::Status, |psu| {
            psu.tx(Command::Status)?;
            psu.rx_status_byte()
        })?;
        let byte = StatusByte::from_bytes([raw]);

        let mut readings: heapless::Vec<ChannelReadings, 2> = heapless::Vec::new();
        for channel in 1..=self.channels.count() {
            let reading = ChannelReadings {
                vset: self.query_float(Command::GetVoltage(channel))?,
                iset: self.query_float(Command::GetCurrent(channel))?,
                vout: self.query_float(Command::ReadVoltage(channel))?,
                iout: self.query_float(Command::ReadCurrent(channel))?,
            };
            readings.push(reading).map_err(|_| Error::Buffer)?;
        }
        Ok(DeviceStatus::decode(byte, &readings))
    }

    fn check_channel(&self, channel: u8) -> Result<(), S::Error> {
        if channel == 0 || channel > self.channels.count() {
            return Err(Error::InvalidChannel(channel));
        }
        Ok(())
    }

    /// Transmit one command and give the supply its quiet period.
    fn tx(&mut self, command: Command) -> Result<(), S::Error> {
        let frame = command.encode()?;
        self.interface
            .write_all(frame.as_bytes())
            .map_err(Error::Serial)?;
        thread::sleep(self.timing.settle);
        Ok(())
    }

    /// Collect one reply window. A timeout with nothing read is an empty
    /// window, not an error; the retry layer decides what to do with it.
    fn rx(&mut self) -> Result<heapless::Vec<u8, L>, S::Error> {
        let mut buf = [0u8; L];
        match self.interface.read(&mut buf) {
            Ok(count) => {
                let mut window = heapless::Vec::new();
                window
                    .extend_from_slice(&buf[..count])
                    .map_err(|_| Error::Buffer)?;
                Ok(window)
            }
            Err(e)
                if matches!(
                    e.kind(),
                    embedded_io::ErrorKind::TimedOut | embedded_io::ErrorKind::Other
                ) =>
            {
                Ok(heapless::Vec::new())
            }
            Err(e) => Err(Error::Serial(e)),
        }
    }

    /// Collect the raw status byte. Anything other than exactly one byte in
    /// the window counts as a transient drop.
    fn rx_status_byte(&mut self) -> Result<Option<u8>, S::Error> {
        let mut buf = [0u8; 1];
        match self.interface.read(&mut buf) {
            Ok(1) => Ok(Some(buf[0])),
            Ok(_) => Ok(None),
            Err(e)
                if matches!(
                    e.kind(),
                    embedded_io::ErrorKind::TimedOut | embedded_io::ErrorKind::Other
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(Error::Serial(e)),
        }
    }

    /// Run one attempt up to `Timing::attempts` times.
    ///
    /// `Ok(None)` from the attempt marks a transient drop: sleep the backoff
    /// and repeat the whole transmit+read cycle. Any `Err` is structural
    /// (transport failure, bad encoding, unparseable number) and surfaces
    /// immediately; retrying a malformed-but-present reply would not help.
    fn retry<T, F>(&mut self, command: Command, mut attempt: F) -> Result<T, S::Error>
    where
        F: FnMut(&mut Self) -> Result<Option<T>, S::Error>,
    {
        for _ in 0..self.timing.attempts {
            if let Some(value) = attempt(self)? {
                return Ok(value);
            }
            thread::sleep(self.timing.backoff);
        }
        Err(Error::NoResponse(command))
    }

    /// One full query transaction: transmit, read a window, decode, retry on
    /// silence. An all-padding reply decodes to empty text and counts as
    /// silence too.
    fn query(&mut self, command: Command) -> Result<String, S::Error> {
        self.retry(command, |psu| {
            psu.tx(command)?;
            let window = psu.rx()?;
            let text = command::decode_text(&window)?;
            if text.is_empty() {
                Ok(None)
            } else {
                Ok(Some(text.to_owned()))
            }
        })
    }

    /// Query transaction whose reply is a number, honouring the command's
    /// reply-width limit.
    fn query_float(&mut self, command: Command) -> Result<f64, S::Error> {
        let text = self.query(command)?;
        command::decode_float(&text, command.reply_limit())
    }
}
