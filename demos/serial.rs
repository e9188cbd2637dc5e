use std::env;

use inquire::Select;
use korad_ka3005::psu::KoradPsu;
use korad_ka3005::types::{Channels, State};
use serialport::SerialPort;

// Configuration constants - adjust these for your setup
const BAUD_RATE: u32 = 9600;
// The reply window: the driver reads once per window and treats a timeout as a
// dropped reply, so keep this short.
const SERIAL_TIMEOUT_MS: u64 = 100;
const OUTPUT_VOLTAGE_V: f64 = 5.0;
const CURRENT_LIMIT_A: f64 = 0.1;
const STABILIZATION_DELAY_MS: u64 = 1000;

pub struct PortWrapper(Box<dyn SerialPort>);

#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::ConnectionRefused => embedded_io::ErrorKind::ConnectionRefused,
            std::io::ErrorKind::ConnectionReset => embedded_io::ErrorKind::ConnectionReset,
            std::io::ErrorKind::ConnectionAborted => embedded_io::ErrorKind::ConnectionAborted,
            std::io::ErrorKind::NotConnected => embedded_io::ErrorKind::NotConnected,
            std::io::ErrorKind::AddrInUse => embedded_io::ErrorKind::AddrInUse,
            std::io::ErrorKind::AddrNotAvailable => embedded_io::ErrorKind::AddrNotAvailable,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::AlreadyExists => embedded_io::ErrorKind::AlreadyExists,
            std::io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            std::io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            std::io::ErrorKind::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for PortWrapper {
    type Error = IoError;
}

impl embedded_io::Read for PortWrapper {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for PortWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

fn main() {
    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        // List available serial ports
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        // Interactive selection
        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    println!("Using port: {}", port_name);

    // Open serial port
    let port = serialport::new(&port_name, BAUD_RATE)
        .timeout(std::time::Duration::from_millis(SERIAL_TIMEOUT_MS))
        .open()
        .expect("Failed to open serial port");

    let port = PortWrapper(port);

    // Create a PSU object
    let mut psu: KoradPsu<PortWrapper, 128> = KoradPsu::new(port, Channels::Single);

    // Get and display the identification string
    let id = psu.identify().unwrap();
    println!("Connected to: {}", id);

    // Set the voltage limit
    psu.set_voltage(1, OUTPUT_VOLTAGE_V).unwrap();
    println!("Set voltage limit to {:.2}V", OUTPUT_VOLTAGE_V);

    // Set the current limit
    psu.set_current(1, CURRENT_LIMIT_A).unwrap();
    println!("Set current limit to {:.3}A", CURRENT_LIMIT_A);

    // Enable the output
    psu.set_output(State::On).unwrap();
    println!("Output enabled");

    // Wait for the output to stabilize
    std::thread::sleep(std::time::Duration::from_millis(STABILIZATION_DELAY_MS));

    // Take and display a full status snapshot
    let status = psu.status().unwrap();
    println!("\n--- Status ---");
    println!(
        "tracking: {:?}  beep: {}  lock: {}  output: {}",
        status.tracking, status.beep, status.lock, status.output
    );
    for (index, channel) in status.channels.iter().enumerate() {
        println!(
            "ch{}: {:?}  set {:.2}V / {:.3}A  measured {:.2}V / {:.3}A",
            index + 1,
            channel.mode,
            channel.vset,
            channel.iset,
            channel.vout,
            channel.iout
        );
    }

    // Switch the output back off before leaving
    psu.set_output(State::Off).unwrap();
    println!("\nOutput disabled");
}
