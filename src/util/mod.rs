//! Utility types and functions for Cameo.
//!
//! This module contains fundamental types used throughout the library:
//! - [`FourCc`] - Four-character codes
//! - [`Status`] - Host status codes
//! - POD records exchanged with the host ([`ValueRange`], [`Time`], [`Rect`], ...)
//! - [`Error`] / [`Result`] - Error handling
//! - [`init_tracing`] - Log subscriber setup

mod fourcc;
mod pod;
mod error;
mod logging;

pub use fourcc::*;
pub use pod::*;
pub use error::*;
pub use logging::*;
