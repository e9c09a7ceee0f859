/// MFRC522 register addresses.  See Section 9.2, Table 20 for the full map;
/// only the registers this driver touches are listed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    CommandReg = 0x01,
    ComlEnReg = 0x02,
    ComIrqReg = 0x04,
    ErrorReg = 0x06,
    Status1Reg = 0x07,
    Status2Reg = 0x08,
    FIFODataReg = 0x09,
    FIFOLevelReg = 0x0A,
    ControlReg = 0x0C,
    BitFramingReg = 0x0D,
    CollReg = 0x0E,
    ModeReg = 0x11,
    TxControlReg = 0x14,
    TxASKReg = 0x15,
    TxSelReg = 0x16,
    RxSelReg = 0x17,
    RxThresholdReg = 0x18,
    DemodReg = 0x19,
    RFCfgReg = 0x26,
    TModeReg = 0x2A,
    TPrescalerReg = 0x2B,
    TReloadRegHigh = 0x2C,
    TReloadRegLow = 0x2D,
    VersionReg = 0x37,
}

impl From<Register> for u8 {
    fn from(reg: Register) -> u8 {
        reg as u8
    }
}

#[cfg(test)]
pub const ALL_REGISTERS: [Register; 24] = [
    Register::CommandReg,
    Register::ComlEnReg,
    Register::ComIrqReg,
    Register::ErrorReg,
    Register::Status1Reg,
    Register::Status2Reg,
    Register::FIFODataReg,
    Register::FIFOLevelReg,
    Register::ControlReg,
    Register::BitFramingReg,
    Register::CollReg,
    Register::ModeReg,
    Register::TxControlReg,
    Register::TxASKReg,
    Register::TxSelReg,
    Register::RxSelReg,
    Register::RxThresholdReg,
    Register::DemodReg,
    Register::RFCfgReg,
    Register::TModeReg,
    Register::TPrescalerReg,
    Register::TReloadRegHigh,
    Register::TReloadRegLow,
    Register::VersionReg,
];

/// MFRC522 internal commands, written to CommandReg.  See Section 10.3.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    Idle = 0x00,
    Mem = 0x01,
    GenerateRandomId = 0x02,
    CalcCrc = 0x03,
    Transmit = 0x04,
    NoCmdChange = 0x07,
    Receive = 0x08,
    Transceive = 0x0C,
    MfAuthent = 0x0E,
    SoftReset = 0x0F,
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

/// ComIrqReg flag bits.  See Section 9.3.1.5.
pub mod irq {
    /// RxIRq - receiver has detected the end of a valid data stream
    pub const RX_COMPLETE: u8 = 0x20;
    /// IdleIRq - a command terminated on its own, e.g. because the
    /// countdown timer programmed at init expired with no response
    pub const COMMAND_DONE: u8 = 0x10;
    /// Writing this to ComIrqReg clears every maskable interrupt flag
    pub const CLEAR_ALL: u8 = 0x7F;
}
