//! Plain Old Data records exchanged with the host registry.
//!
//! Every record is `#[repr(C)]` with no padding, so it can be read from and
//! written to a host byte buffer through `bytemuck` without copying field by
//! field. Buffers coming from the host carry no alignment guarantee, so reads
//! always go through [`read_pod`].

use bytemuck::{Pod, Zeroable};

use super::{Error, Result};

/// Closed numeric interval (`AudioValueRange` on the host side).
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ValueRange {
    pub minimum: f64,
    pub maximum: f64,
}

impl ValueRange {
    #[inline]
    pub const fn new(minimum: f64, maximum: f64) -> Self {
        Self { minimum, maximum }
    }
}

/// Rational time value (`CMTime` on the host side).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Time {
    pub value: i64,
    pub timescale: i32,
    pub flags: u32,
    pub epoch: i64,
}

impl Time {
    /// Flag bit marking a time as valid.
    pub const FLAG_VALID: u32 = 1;

    /// A valid time of `value / timescale` seconds.
    #[inline]
    pub const fn new(value: i64, timescale: i32) -> Self {
        Self { value, timescale, flags: Self::FLAG_VALID, epoch: 0 }
    }
}

/// Axis-aligned rectangle (`CGRect` on the host side).
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// Transport state of a deck-capable stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct StreamDeck {
    pub status: u32,
    pub state: u32,
    pub state2: u32,
}

/// A callback procedure paired with its context pointer.
///
/// Used for both the SMPTE time callback of a device and the scheduled output
/// notification of a stream. Addresses are opaque to the engine; a zero
/// procedure means no callback is installed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct CallbackRecord {
    pub proc_addr: u64,
    pub ref_con: u64,
}

impl CallbackRecord {
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.proc_addr == 0
    }
}

/// Component description of a video digitizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct ComponentDescription {
    pub component_type: u32,
    pub component_sub_type: u32,
    pub component_manufacturer: u32,
    pub component_flags: u32,
    pub component_flags_mask: u32,
}

/// Read one POD value from the start of `bytes`.
///
/// Fails if the buffer is shorter than the value.
pub fn read_pod<T: Pod>(bytes: &[u8]) -> Result<T> {
    let size = std::mem::size_of::<T>();
    if bytes.len() < size {
        return Err(Error::invalid(format!(
            "buffer of {} bytes too short for {}-byte value",
            bytes.len(),
            size
        )));
    }
    Ok(bytemuck::pod_read_unaligned(&bytes[..size]))
}

/// Read as many whole POD values as `bytes` holds. Trailing bytes that do not
/// form a whole element are ignored.
pub fn read_pod_array<T: Pod>(bytes: &[u8]) -> Vec<T> {
    let size = std::mem::size_of::<T>();
    if size == 0 {
        return Vec::new();
    }
    bytes
        .chunks_exact(size)
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        assert_eq!(std::mem::size_of::<ValueRange>(), 16);
        assert_eq!(std::mem::size_of::<Time>(), 24);
        assert_eq!(std::mem::size_of::<Rect>(), 32);
        assert_eq!(std::mem::size_of::<StreamDeck>(), 12);
        assert_eq!(std::mem::size_of::<CallbackRecord>(), 16);
        assert_eq!(std::mem::size_of::<ComponentDescription>(), 20);
    }

    #[test]
    fn test_read_pod_unaligned() {
        let range = ValueRange::new(-1.5, 2.0);
        let mut buf = vec![0u8; 1];
        buf.extend_from_slice(bytemuck::bytes_of(&range));
        let back: ValueRange = read_pod(&buf[1..]).unwrap();
        assert_eq!(back, range);
    }

    #[test]
    fn test_read_pod_short_buffer() {
        assert!(read_pod::<Time>(&[0u8; 8]).is_err());
    }

    #[test]
    fn test_read_pod_array_ignores_tail() {
        let values = [1u32, 2, 3];
        let mut buf = bytemuck::cast_slice::<u32, u8>(&values).to_vec();
        buf.push(0xAA);
        assert_eq!(read_pod_array::<u32>(&buf), vec![1, 2, 3]);
    }
}
