use core::fmt::Arguments;
use rppal_cardscan::{error, CardScanLog, CardScanTool};
use termion::color;

struct CardScanLogger;

impl CardScanLogger {
    fn new() -> CardScanLogger {
        CardScanLogger {}
    }
}

impl CardScanLog for CardScanLogger {
    fn output(self: &Self, args: Arguments) {
        println!("{}", args);
    }
    fn warning(self: &Self, args: Arguments) {
        eprintln!("{}warning: {}", color::Fg(color::Yellow), args);
    }
    fn error(self: &Self, args: Arguments) {
        eprintln!("{}error: {}", color::Fg(color::Red), args);
    }
}

fn main() {
    let logger = CardScanLogger::new();

    if let Err(error) = CardScanTool::new(&logger).run(std::env::args_os()) {
        error!(logger, "{}", error);
        std::process::exit(1);
    }
}
