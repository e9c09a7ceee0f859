use crate::bus::RegisterBus;
use crate::picc::{PiccCommand, Uid, MAX_UID_BYTES, NVB_WHOLE_FRAME};
use crate::register::{irq, Command, Register};
use std::thread;
use std::time::{Duration, Instant};

// Soft reset leaves the oscillator settling; the datasheet gives no hard
// figure, 50ms is comfortably past the start-up time of every board revision
const RESET_SETTLE: Duration = Duration::from_millis(50);

// The countdown timer programmed in `init` expires ~24ms after a transceive
// with no card response.  The host-side poll deadline has to outlive it so
// that the chip, not the host clock, normally decides when to give up.
const POLL_DEADLINE: Duration = Duration::from_millis(50);

/// The reader chip driver: a borrowed register bus plus the UID of the most
/// recently selected card.  One value per physical reader, owned by exactly
/// one caller; there is no locking here, sharing must be serialized outside.
pub struct Mfrc522<'a, B: RegisterBus> {
    bus: &'a mut B,
    uid: Uid,
    transport_faults: u64,
}

impl<'a, B: RegisterBus> Mfrc522<'a, B> {
    pub fn new(bus: &'a mut B) -> Mfrc522<'a, B> {
        Mfrc522 {
            bus,
            uid: Uid::default(),
            transport_faults: 0,
        }
    }

    /// UID captured by the last successful `read_card_serial`
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// Count of bus transactions that failed since construction.  Failed
    /// reads are folded into a 0x00 value and failed writes are skipped, so
    /// this counter is the only place those failures remain visible.
    pub fn transport_faults(&self) -> u64 {
        self.transport_faults
    }

    fn read(&mut self, reg: Register) -> u8 {
        match self.bus.read_register(reg) {
            Ok(value) => value,
            Err(_) => {
                // 0x00 is also a legitimate register value; callers that
                // care check `transport_faults`
                self.transport_faults += 1;
                0
            }
        }
    }

    fn write(&mut self, reg: Register, value: u8) {
        // Fire and forget: a dropped write is not retried, the protocol
        // simply fails its poll and the caller re-enters from the top
        if self.bus.write_register(reg, value).is_err() {
            self.transport_faults += 1;
        }
    }

    fn command(&mut self, cmd: Command) {
        self.write(Register::CommandReg, cmd.into());
    }

    /// Reset the chip and program it for ISO 14443-A at full receiver gain.
    /// Safe to call again on a live reader: the antenna drivers are only
    /// touched if they are not already both enabled.
    pub fn init(&mut self) {
        // See Section 9.3.1.2 - soft reset, all registers to defaults
        self.command(Command::SoftReset);
        thread::sleep(RESET_SETTLE);

        // See Section 9.3.3.10 - TAuto=1, prescaler 0xD3E: the timer starts
        // automatically when a transmission ends and ticks at ~2kHz
        self.write(Register::TModeReg, 0x8D);
        self.write(Register::TPrescalerReg, 0x3E);
        // See Section 9.3.3.11 - reload 0x0030 = 48 ticks, ~24ms before the
        // no-response timeout fires
        self.write(Register::TReloadRegHigh, 0x00);
        self.write(Register::TReloadRegLow, 0x30);

        // See Sections 9.3.3.9 and 9.3.3.6 - internal analog path, 48dB
        // receiver gain
        self.write(Register::RxSelReg, 0x86);
        self.write(Register::RFCfgReg, 0x7F);

        // See Section 9.3.2.5 - Tx1RFEn and Tx2RFEn drive the carrier on
        // TX1/TX2.  Read-modify-write: re-writing an already enabled
        // antenna can glitch the RF field on some board revisions.
        let tx_control = self.read(Register::TxControlReg);

        if (tx_control & 0x03) != 0x03 {
            self.write(Register::TxControlReg, tx_control | 0x03);
        }
    }

    /// Chip version register; 0x91 is a v1.0 part, 0x92 a v2.0 part.
    /// 0x00 or 0xFF means the bus is not answering.
    pub fn version(&mut self) -> u8 {
        self.read(Register::VersionReg)
    }

    /// Broadcast REQA and report whether any card answered.  A `false` can
    /// mean an empty field or an unresponsive chip; the two are not
    /// distinguished, the caller just polls again.
    pub fn is_new_card_present(&mut self) -> bool {
        // See Section 9.3.1.5 - drop any stale interrupt flags
        self.write(Register::ComIrqReg, irq::CLEAR_ALL);

        // See Section 9.3.1.14 - REQA is a short frame, only 7 bits of the
        // last (and only) byte are transmitted
        self.write(Register::BitFramingReg, 0x07);

        // Transceive, load the FIFO, then framing and Transceive once more.
        // The second framing+command pair is what actually starts the
        // transmission after the FIFO load; a single Transceive before the
        // load leaves the chip waiting.
        self.command(Command::Transceive);
        self.write(Register::FIFODataReg, PiccCommand::ReqA.into());
        self.write(Register::BitFramingReg, 0x07);
        self.command(Command::Transceive);

        let answered = self.wait_for_response();

        // Park the chip for the next operation no matter how the poll went
        self.command(Command::Idle);

        answered
    }

    /// Run the simplified cascade-level-1 SELECT and capture the card's
    /// UID.  On success the UID is available through `uid()`; on timeout
    /// the previous UID is left untouched.
    ///
    /// This is the single-card path only: no collision-bit walking, no
    /// higher cascade levels, no CRC check of the response.
    pub fn read_card_serial(&mut self) -> bool {
        self.write(Register::ComIrqReg, irq::CLEAR_ALL);

        // Whole bytes this time - valid bits 0 means all 8 of the last byte
        self.write(Register::BitFramingReg, 0x00);

        // SELECT CL1 with NVB 0x70: announce a complete 7-byte frame so the
        // card answers with its full cascade-level-1 UID
        self.write(Register::FIFODataReg, PiccCommand::SelCl1.into());
        self.write(Register::FIFODataReg, NVB_WHOLE_FRAME);

        self.command(Command::Transceive);
        self.write(Register::BitFramingReg, 0x00);
        self.command(Command::Transceive);

        let answered = self.wait_for_response();

        if answered {
            // See Section 9.3.1.11 - how many bytes the card sent back,
            // clamped to what the UID buffer can hold
            let count = usize::min(self.read(Register::FIFOLevelReg) as usize, MAX_UID_BYTES);
            let mut bytes = [0u8; MAX_UID_BYTES];

            for byte in bytes.iter_mut().take(count) {
                *byte = self.read(Register::FIFODataReg);
            }

            self.uid.set(&bytes[..count]);
        }

        self.command(Command::Idle);

        answered
    }

    /// Poll ComIrqReg until the receiver finishes or the chip's own timer
    /// gives up, bounded by a host-side deadline in case the chip never
    /// raises either flag.  No sleeping here - a sleep would delay fast
    /// responses - but each pass yields so a dead chip doesn't starve the
    /// rest of the process.
    fn wait_for_response(&mut self) -> bool {
        let deadline = Instant::now() + POLL_DEADLINE;

        loop {
            let flags = self.read(Register::ComIrqReg);

            if flags & (irq::RX_COMPLETE | irq::COMMAND_DONE) != 0 {
                return true;
            }

            if Instant::now() >= deadline {
                return false;
            }

            thread::yield_now();
        }
    }
}
