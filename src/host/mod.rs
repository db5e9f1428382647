//! The host registry contract.
//!
//! The engine never owns registry state. Everything it does is composed from
//! the primitives of the [`Host`] trait: has-property, is-settable, get-size,
//! get-data, set-data and add/remove change-listener, plus the hand-off of
//! opaque reference values that travel through byte buffers as handles.
//!
//! [`MockHost`] is a deterministic in-memory implementation for tests.

pub mod mock;

use byteorder::{ByteOrder, NativeEndian};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::util::{Error, FourCc, Result, Status};

pub use mock::MockHost;

/// Result of a host primitive.
pub type HostResult<T> = std::result::Result<T, Status>;

/// Handle naming one node of the host registry.
///
/// Not owned by the engine: ids are never allocated or freed here.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
#[repr(transparent)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// The null object.
    pub const UNKNOWN: Self = Self(0);
    /// The well-known root of the registry.
    pub const SYSTEM: Self = Self(1);

    #[inline]
    pub const fn is_unknown(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for ObjectId {
    #[inline]
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Property scope.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Scope(pub u32);

impl Scope {
    pub const GLOBAL: Self = Self(FourCc::new(*b"glob").value());
    pub const WILDCARD: Self = Self(FourCc::new(*b"****").value());
    pub const DEVICE_INPUT: Self = Self(FourCc::new(*b"inpt").value());
    pub const DEVICE_OUTPUT: Self = Self(FourCc::new(*b"outp").value());
    pub const DEVICE_PLAY_THROUGH: Self = Self(FourCc::new(*b"ptru").value());

    /// Wildcards match anything, other scopes only themselves.
    #[inline]
    pub fn matches(self, other: Self) -> bool {
        self == Self::WILDCARD || other == Self::WILDCARD || self == other
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::WILDCARD
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope({:?})", FourCc(self.0))
    }
}

/// Property element.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Element(pub u32);

impl Element {
    pub const MAIN: Self = Self(0);
    pub const WILDCARD: Self = Self(0xFFFF_FFFF);

    #[inline]
    pub fn matches(self, other: Self) -> bool {
        self == Self::WILDCARD || other == Self::WILDCARD || self == other
    }
}

impl Default for Element {
    fn default() -> Self {
        Self::WILDCARD
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::WILDCARD => f.write_str("Element(*)"),
            Self(n) => write!(f, "Element({})", n),
        }
    }
}

/// The (selector, scope, element) triple addressing one property of an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct PropertyAddress {
    pub selector: FourCc,
    pub scope: Scope,
    pub element: Element,
}

impl PropertyAddress {
    #[inline]
    pub const fn new(selector: FourCc, scope: Scope, element: Element) -> Self {
        Self { selector, scope, element }
    }

    /// Address with wildcard scope and element.
    #[inline]
    pub const fn wildcard(selector: FourCc) -> Self {
        Self { selector, scope: Scope::WILDCARD, element: Element::WILDCARD }
    }

    /// True if both addresses can refer to the same property.
    pub fn matches(&self, other: &Self) -> bool {
        self.selector == other.selector
            && self.scope.matches(other.scope)
            && self.element.matches(other.element)
    }
}

/// Pointer-sized handle standing for an opaque reference inside a byte buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct RefHandle(pub u64);

impl RefHandle {
    pub const NULL: Self = Self(0);

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// An opaque, reference-counted media object owned by the host
/// (format description, sample buffer, clock).
pub trait OpaqueObject: fmt::Debug + Send + Sync {
    /// Host type name, e.g. `CMFormatDescription`.
    fn type_name(&self) -> &str;

    /// Human-readable description of the object.
    fn description(&self) -> String;
}

/// A reference value handed from the host to the caller.
///
/// Dropping the value releases it.
#[derive(Clone, Debug)]
pub enum HostRef {
    String(String),
    Object(Arc<dyn OpaqueObject>),
}

/// Callback invoked by the host with a batch of changed addresses.
pub type ListenerCallback = Arc<dyn Fn(&[PropertyAddress]) + Send + Sync>;

/// Host-side identity of a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub u64);

/// The host registry.
///
/// Every call is a synchronous round trip. A `qualifier` is an extra input
/// buffer, empty when the read is unqualified.
pub trait Host: Send + Sync {
    /// Whether the object has the property.
    fn has_property(&self, object: ObjectId, address: &PropertyAddress) -> bool;

    /// Whether the property can be written.
    fn is_property_settable(&self, object: ObjectId, address: &PropertyAddress) -> HostResult<bool>;

    /// Size in bytes of the property's current value.
    fn property_data_size(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        qualifier: &[u8],
    ) -> HostResult<usize>;

    /// Fill `data` with the property's value and return the number of bytes used.
    ///
    /// The host may read `data` before writing it: mutating reads and
    /// translations pass their input this way.
    fn property_data(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        qualifier: &[u8],
        data: &mut [u8],
    ) -> HostResult<usize>;

    /// Write the property's value.
    fn set_property_data(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        qualifier: &[u8],
        data: &[u8],
    ) -> HostResult<()>;

    /// Register a change listener.
    fn add_listener(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        callback: ListenerCallback,
    ) -> HostResult<ListenerToken>;

    /// Remove a previously registered listener.
    fn remove_listener(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        token: ListenerToken,
    ) -> HostResult<()>;

    /// Take ownership of the reference behind a handle returned in a buffer.
    fn adopt_ref(&self, handle: RefHandle) -> Option<HostRef>;

    /// Hand a reference to the host and get the handle to put in a buffer.
    fn vend_ref(&self, value: HostRef) -> RefHandle;
}

// ============================================================================
// Translation record
// ============================================================================

/// Size of the translation record header: input length then output length.
pub const TRANSLATION_HEADER_SIZE: usize = 8;

/// Paired input/output buffer used by translation properties.
///
/// Layout, native endian: `[input_len: u32][output_len: u32][input][output]`.
/// The host reads the input section and overwrites the output section in a
/// single round trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationRecord {
    bytes: Vec<u8>,
}

impl TranslationRecord {
    /// Build a record around `input` with room for `output_len` bytes of output.
    pub fn new(input: &[u8], output_len: usize) -> Self {
        let mut bytes = vec![0u8; TRANSLATION_HEADER_SIZE + input.len() + output_len];
        NativeEndian::write_u32(&mut bytes[0..4], input.len() as u32);
        NativeEndian::write_u32(&mut bytes[4..8], output_len as u32);
        bytes[TRANSLATION_HEADER_SIZE..TRANSLATION_HEADER_SIZE + input.len()].copy_from_slice(input);
        Self { bytes }
    }

    /// Whole record as sent to the host.
    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Output section after the round trip.
    pub fn output(&self) -> Result<&[u8]> {
        let (_, output) = split_translation(&self.bytes)?;
        Ok(output)
    }
}

fn split_translation(bytes: &[u8]) -> Result<(&[u8], &[u8])> {
    if bytes.len() < TRANSLATION_HEADER_SIZE {
        return Err(Error::invalid("translation record header truncated"));
    }
    let input_len = NativeEndian::read_u32(&bytes[0..4]) as usize;
    let output_len = NativeEndian::read_u32(&bytes[4..8]) as usize;
    if bytes.len() < TRANSLATION_HEADER_SIZE + input_len + output_len {
        return Err(Error::invalid("translation record body truncated"));
    }
    let body = &bytes[TRANSLATION_HEADER_SIZE..];
    Ok((&body[..input_len], &body[input_len..input_len + output_len]))
}

/// Host-side view of a translation record: the input bytes and the mutable
/// output section.
pub fn translation_parts(bytes: &mut [u8]) -> Result<(Vec<u8>, &mut [u8])> {
    let (input, output) = split_translation(bytes)?;
    let input = input.to_vec();
    let output_len = output.len();
    let start = TRANSLATION_HEADER_SIZE + input.len();
    Ok((input, &mut bytes[start..start + output_len]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_wildcard() {
        assert!(Scope::WILDCARD.matches(Scope::GLOBAL));
        assert!(Scope::DEVICE_INPUT.matches(Scope::WILDCARD));
        assert!(!Scope::DEVICE_INPUT.matches(Scope::DEVICE_OUTPUT));
        assert!(Element::MAIN.matches(Element::WILDCARD));
        assert!(!Element(1).matches(Element(2)));
    }

    #[test]
    fn test_address_layout() {
        assert_eq!(std::mem::size_of::<PropertyAddress>(), 12);
        let a = PropertyAddress::wildcard(FourCc::new(*b"lnam"));
        let b = PropertyAddress::new(FourCc::new(*b"lnam"), Scope::GLOBAL, Element::MAIN);
        assert!(a.matches(&b));
        let c = PropertyAddress::new(FourCc::new(*b"clas"), Scope::GLOBAL, Element::MAIN);
        assert!(!b.matches(&c));
    }

    #[test]
    fn test_translation_record() {
        let mut record = TranslationRecord::new(b"uid-1", 4);
        {
            let (input, output) = translation_parts(record.as_mut_bytes()).unwrap();
            assert_eq!(input, b"uid-1");
            output.copy_from_slice(&7u32.to_ne_bytes());
        }
        assert_eq!(record.output().unwrap(), &7u32.to_ne_bytes());
    }

    #[test]
    fn test_translation_record_truncated() {
        let mut bytes = vec![0u8; 4];
        assert!(translation_parts(&mut bytes).is_err());
    }

    #[test]
    fn test_object_id_display() {
        assert_eq!(ObjectId(42).to_string(), "@42");
        assert!(ObjectId::UNKNOWN.is_unknown());
    }
}
