//! We use this mocking module in unit tests to emulate a serial port.
//!
//! The real port hands the driver one reply window per read call: whatever
//! bytes arrived before the timeout, or a timeout error when the device stayed
//! silent. The mock scripts that behaviour as a queue of windows, consumed one
//! per read, so tests can play out drop-and-retry sequences deterministically.

use std::collections::VecDeque;

/// Our mock type used to emulate a serial port.
pub struct MockSerial {
    /// Everything the driver wrote, in order.
    write_buffer: Vec<u8>,
    /// Scripted reply windows. An empty window stands for a timeout.
    replies: VecDeque<Vec<u8>>,
    /// Number of read calls made so far.
    read_calls: usize,
    /// Flag to simulate write errors.
    should_error_on_write: bool,
    /// Flag to simulate hard read errors (not timeouts).
    should_error_on_read: bool,
}

#[derive(Debug)]
pub enum MockSerialError {
    /// No data arrived within the simulated timeout window.
    WouldBlock,
    /// Generic simulated hard I/O failure.
    SimulatedError,
}

impl core::fmt::Display for MockSerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl core::error::Error for MockSerialError {}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::WouldBlock => embedded_io::ErrorKind::TimedOut,
            // Anything the driver must not mistake for a silent window.
            MockSerialError::SimulatedError => embedded_io::ErrorKind::BrokenPipe,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        self.write_buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.read_calls += 1;
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }
        match self.replies.pop_front() {
            None => Err(MockSerialError::WouldBlock),
            Some(reply) if reply.is_empty() => Err(MockSerialError::WouldBlock),
            Some(reply) => {
                let count = reply.len().min(buf.len());
                buf[..count].copy_from_slice(&reply[..count]);
                if count < reply.len() {
                    // Leftover bytes stay queued for the next read.
                    self.replies.push_front(reply[count..].to_vec());
                }
                Ok(count)
            }
        }
    }
}

impl MockSerial {
    /// Create a new MockSerial instance with nothing scripted.
    pub fn new() -> Self {
        Self {
            write_buffer: Vec::new(),
            replies: VecDeque::new(),
            read_calls: 0,
            should_error_on_write: false,
            should_error_on_read: false,
        }
    }

    /// Script one reply window containing `data`.
    pub fn push_reply(&mut self, data: &[u8]) {
        self.replies.push_back(data.to_vec());
    }

    /// Script one silent window (the device never answered).
    pub fn push_silence(&mut self) {
        self.replies.push_back(Vec::new());
    }

    /// Get a reference to the data that was written to this mock serial port.
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// How many times the driver called read.
    pub fn read_calls(&self) -> usize {
        self.read_calls
    }

    /// Configure whether write operations should fail with an error.
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether read operations should fail with a hard error.
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Error, Read, Write};

    #[test]
    fn writes_accumulate_in_order() {
        let mut mock = MockSerial::new();
        mock.write(b"VSET1?").unwrap();
        mock.write(b"ISET1?").unwrap();
        assert_eq!(mock.written_data(), b"VSET1?ISET1?");
    }

    #[test]
    fn replies_come_back_one_window_per_read() {
        let mut mock = MockSerial::new();
        mock.push_reply(b"05.00");
        mock.push_reply(b"1.234");

        let mut buf = [0u8; 16];
        let count = mock.read(&mut buf).unwrap();
        assert_eq!(&buf[..count], b"05.00");
        let count = mock.read(&mut buf).unwrap();
        assert_eq!(&buf[..count], b"1.234");
    }

    #[test]
    fn silence_and_exhaustion_look_like_timeouts() {
        let mut mock = MockSerial::new();
        mock.push_silence();

        let mut buf = [0u8; 16];
        let err = mock.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), embedded_io::ErrorKind::TimedOut);
        // Nothing scripted at all behaves the same way.
        let err = mock.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), embedded_io::ErrorKind::TimedOut);
        assert_eq!(mock.read_calls(), 2);
    }

    #[test]
    fn oversized_windows_carry_over_to_the_next_read() {
        let mut mock = MockSerial::new();
        mock.push_reply(b"ABCDEF");

        let mut buf = [0u8; 4];
        let count = mock.read(&mut buf).unwrap();
        assert_eq!(&buf[..count], b"ABCD");
        let count = mock.read(&mut buf).unwrap();
        assert_eq!(&buf[..count], b"EF");
    }

    #[test]
    fn simulated_errors_are_not_timeouts() {
        let mut mock = MockSerial::new();
        mock.set_read_error(true);
        let mut buf = [0u8; 4];
        let err = mock.read(&mut buf).unwrap_err();
        assert_ne!(err.kind(), embedded_io::ErrorKind::TimedOut);

        let mut mock = MockSerial::new();
        mock.set_write_error(true);
        assert!(mock.write(b"OUT1").is_err());
        assert!(mock.flush().is_err());
        assert!(mock.written_data().is_empty());
    }
}
