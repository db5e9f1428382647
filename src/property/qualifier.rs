//! Qualifiers: extra input passed alongside a read.

use bytemuck::Pod;
use smallvec::SmallVec;

use crate::host::RefHandle;

/// Extra input bytes narrowing or parameterizing one read.
///
/// Built from a scalar or a slice of any POD type and borrowed for exactly
/// one host call. Reference qualifiers (a format description) are carried as
/// an inline handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Qualifier<'a> {
    bytes: &'a [u8],
    inline: SmallVec<[u8; 8]>,
    element_size: usize,
}

impl<'a> Qualifier<'a> {
    /// Qualifier holding one value.
    pub fn from_scalar<T: Pod>(value: &'a T) -> Self {
        Self {
            bytes: bytemuck::bytes_of(value),
            inline: SmallVec::new(),
            element_size: std::mem::size_of::<T>(),
        }
    }

    /// Qualifier holding a contiguous array of values.
    pub fn from_slice<T: Pod>(values: &'a [T]) -> Self {
        Self {
            bytes: bytemuck::cast_slice(values),
            inline: SmallVec::new(),
            element_size: std::mem::size_of::<T>(),
        }
    }

    /// Qualifier holding a reference handle vended to the host.
    pub fn from_handle(handle: RefHandle) -> Qualifier<'static> {
        Qualifier {
            bytes: &[],
            inline: SmallVec::from_slice(bytemuck::bytes_of(&handle)),
            element_size: std::mem::size_of::<RefHandle>(),
        }
    }

    /// Raw bytes handed to the host.
    pub fn as_bytes(&self) -> &[u8] {
        if self.inline.is_empty() {
            self.bytes
        } else {
            &self.inline
        }
    }

    /// Number of elements carried.
    pub fn count(&self) -> usize {
        match self.element_size {
            0 => 0,
            n => self.as_bytes().len() / n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}
