//! Four-character codes.
//!
//! Selectors, class ids, scopes and most status codes of the host registry
//! are 32-bit integers whose big-endian bytes spell four ASCII characters.

use byteorder::{BigEndian, ByteOrder};
use bytemuck::{Pod, Zeroable};
use std::fmt;

/// A 32-bit four-character code.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
#[repr(transparent)]
pub struct FourCc(pub u32);

impl FourCc {
    /// Build a code from its four characters, first character most significant.
    #[inline]
    pub const fn new(chars: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(chars))
    }

    /// Raw integer value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The four bytes, most significant first.
    #[inline]
    pub fn bytes(self) -> [u8; 4] {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, self.0);
        buf
    }

    /// Parse a four-byte ASCII string.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 || !bytes.is_ascii() {
            return None;
        }
        Some(Self(BigEndian::read_u32(bytes)))
    }

    /// The code as text, if all four bytes are ASCII.
    pub fn as_text(self) -> Option<String> {
        let bytes = self.bytes();
        if bytes.is_ascii() {
            Some(bytes.iter().map(|&b| b as char).collect())
        } else {
            None
        }
    }

    /// True if every byte is a printable ASCII character (space included).
    pub fn is_printable(self) -> bool {
        self.bytes().iter().all(|&b| (0x20..0x7f).contains(&b))
    }
}

impl From<u32> for FourCc {
    #[inline]
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<FourCc> for u32 {
    #[inline]
    fn from(v: FourCc) -> Self {
        v.0
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_printable() {
            write!(f, "'{}'", self)
        } else {
            write!(f, "{:#010x}", self.0)
        }
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) if self.is_printable() => f.write_str(&text),
            _ => write!(f, "{:#010x}", self.0),
        }
    }
}
