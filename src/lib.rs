mod bus;
mod cancellation_token;
mod log_macros;
mod mfrc522;
mod picc;
mod register;

pub use crate::bus::{I2cBus, RegisterBus, TransportError};
pub use crate::mfrc522::Mfrc522;
pub use crate::picc::{PiccCommand, Uid};
pub use crate::register::{Command, Register};
use cancellation_token::CancellationToken;
use clap::Parser;
use core::fmt::Arguments;
use ctrlc;
use std::error::Error;
use std::{thread, time};

pub trait CardScanLog {
    fn output(self: &Self, args: Arguments);
    fn warning(self: &Self, args: Arguments);
    fn error(self: &Self, args: Arguments);
}

pub struct CardScanTool<'a> {
    log: &'a dyn CardScanLog,
}

fn parse_i2c_address(s: &str) -> Result<u8, String> {
    let addr = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else {
        s.parse::<u8>()
    }
    .map_err(|e| e.to_string())?;

    if addr > 0x7F {
        return Err(format!("{:#04x} is not a 7-bit I2C address", addr));
    }

    Ok(addr)
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// Disable colors in output
    #[arg(long = "no-color", short = 'n', env = "NO_CLI_COLOR")]
    no_color: bool,
    /// I2C bus number, e.g. 1 for /dev/i2c-1
    #[arg(long = "bus", short = 'b', default_value_t = 1)]
    bus: u8,
    /// 7-bit I2C address of the reader, hex or decimal
    #[arg(long = "address", short = 'a', default_value = "0x28", value_parser = parse_i2c_address)]
    address: u8,
    /// Delay between card polls, in milliseconds
    #[arg(long = "poll-delay", default_value_t = 50)]
    poll_delay: u64,
}

impl<'a> CardScanTool<'a> {
    pub fn new(log: &'a dyn CardScanLog) -> CardScanTool<'a> {
        CardScanTool { log }
    }

    fn report_version(self: &Self, version: u8) {
        let name = match version {
            0x91 => " = v1.0",
            0x92 => " = v2.0",
            _ => " (unknown)",
        };

        output!(self.log, "Reader software version: {:#04x}{}", version, name);

        if version == 0x00 || version == 0xFF {
            warning!(
                self.log,
                "communication failure, is the reader properly connected?"
            );
        }
    }

    pub fn run(
        self: &mut Self,
        args: impl IntoIterator<Item = std::ffi::OsString>,
    ) -> Result<(), Box<dyn Error>> {
        let cli = match Cli::try_parse_from(args) {
            Ok(m) => m,
            Err(err) => {
                output!(self.log, "{}", err.to_string());
                return Ok(());
            }
        };

        let poll_delay = time::Duration::from_millis(cli.poll_delay);
        let mut i2c_bus = I2cBus::open(cli.bus, cli.address)?;
        let mut reader = Mfrc522::new(&mut i2c_bus);

        reader.init();
        self.report_version(reader.version());
        output!(self.log, "Scan a card to see its UID...");

        let token = CancellationToken::new();
        let token_clone = token.clone();

        ctrlc::set_handler(move || {
            eprintln!("Ctrl+C received, stopping...");
            token_clone.cancel();
            ()
        })?;

        let mut seen_faults = reader.transport_faults();

        while !token.is_canceled() {
            if !reader.is_new_card_present() || !reader.read_card_serial() {
                // No card and read failure look the same from here; either
                // way the next poll starts the cycle over
                thread::sleep(poll_delay);
                continue;
            }

            output!(self.log, "Card UID: {}", reader.uid());

            if reader.transport_faults() > seen_faults {
                seen_faults = reader.transport_faults();
                warning!(self.log, "bus faults so far: {}", seen_faults);
            }

            // Leave the card in the field a moment before rescanning it
            thread::sleep(time::Duration::from_millis(1000));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_test() {
        struct TestLogger;

        impl TestLogger {
            fn new() -> TestLogger {
                TestLogger {}
            }
        }

        impl CardScanLog for TestLogger {
            fn output(self: &Self, _args: Arguments) {}
            fn warning(self: &Self, _args: Arguments) {}
            fn error(self: &Self, _args: Arguments) {}
        }

        let logger = TestLogger::new();
        let mut tool = CardScanTool::new(&logger);
        let args: Vec<std::ffi::OsString> = vec!["".into(), "--help".into()];

        tool.run(args).unwrap();
    }

    #[test]
    fn i2c_address_parses_hex_and_decimal() {
        assert_eq!(parse_i2c_address("0x28").unwrap(), 0x28);
        assert_eq!(parse_i2c_address("40").unwrap(), 40);
        assert!(parse_i2c_address("0x80").is_err());
        assert!(parse_i2c_address("nope").is_err());
    }
}
