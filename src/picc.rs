use std::fmt;

/// Commands understood by an ISO 14443-A proximity card.  See ISO 14443-3
/// Section 6.3 for REQA/WUPA and 6.4 for the SELECT/anticollision family.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum PiccCommand {
    /// 7-bit request, answered by any card in the field not yet halted
    ReqA = 0x26,
    /// 7-bit wakeup, also answered by halted cards
    WupA = 0x52,
    /// SELECT / anticollision, cascade level 1
    SelCl1 = 0x93,
    /// Halt the currently selected card
    HltA = 0x50,
}

impl From<PiccCommand> for u8 {
    fn from(cmd: PiccCommand) -> u8 {
        cmd as u8
    }
}

/// NVB (number of valid bits) byte announcing a whole-frame SELECT: 7 bytes
/// total, no partial bits.  This driver only ever issues the simplified
/// single-pass select, so this is the only NVB value it uses.
pub const NVB_WHOLE_FRAME: u8 = 0x70;

/// Largest UID any cascade level combination can produce (triple size cards)
pub const MAX_UID_BYTES: usize = 10;

/// A card UID as returned by the SELECT exchange.  At cascade level 1 this
/// is 4 bytes plus the BCC; longer cards report more through higher cascade
/// levels, which this driver does not walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Uid {
    bytes: [u8; MAX_UID_BYTES],
    len: usize,
}

impl Uid {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Replace the UID contents, truncating to the buffer capacity
    pub(crate) fn set(&mut self, bytes: &[u8]) {
        let len = usize::min(bytes.len(), MAX_UID_BYTES);

        self.bytes[..len].copy_from_slice(&bytes[..len]);
        self.len = len;
    }
}

impl fmt::Display for Uid {
    /// Uppercase two-digit hex groups separated by spaces, e.g. "DE AD BE EF"
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_formats_as_spaced_uppercase_hex() {
        let mut uid = Uid::default();

        uid.set(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(uid.to_string(), "DE AD BE EF");
    }

    #[test]
    fn empty_uid_formats_as_empty_string() {
        assert_eq!(Uid::default().to_string(), "");
    }

    #[test]
    fn uid_set_truncates_to_capacity() {
        let mut uid = Uid::default();

        uid.set(&[0x11; 16]);
        assert_eq!(uid.len(), MAX_UID_BYTES);
        assert_eq!(uid.as_bytes(), &[0x11; MAX_UID_BYTES]);
    }
}
