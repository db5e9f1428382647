//! # Cameo
//!
//! Strongly-typed property access and introspection for a hierarchical
//! media-device object registry.
//!
//! The registry is owned by the host platform and speaks only an untyped
//! has/settable/size/get/set/listen byte-buffer protocol. This crate puts a
//! closed, statically described schema on top of it: every property key has
//! one descriptor (selector, value type, read semantics) and every value
//! decodes into one [`PropertyValue`] variant.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (four-character codes, POD records, errors, logging)
//! - [`class`] - Class ids and the two-level class taxonomy
//! - [`host`] - The host registry contract and an in-memory mock
//! - [`property`] - Value types, descriptors and the nine property sets
//! - [`registry`] - The engine: probes, get/set, translate/mutate
//! - [`listener`] - Change-notification subscriptions
//! - [`tree`] - Object tree construction
//! - [`control`] - Decoded control models
//! - [`format`] - Display formatting and the four-character-code table
//! - [`config`] - Engine configuration
//!
//! ## Example
//!
//! ```ignore
//! use cameo::prelude::*;
//!
//! let registry = Registry::new(host);
//! let tree = registry.build_tree(ObjectId::SYSTEM);
//!
//! for device in tree.children.iter() {
//!     let uid = registry.get(DeviceProperty::DeviceUid, device.object, None);
//!     println!("{} {:?}", device.name, uid);
//! }
//! ```

pub mod util;
pub mod class;
pub mod host;
pub mod property;
pub mod registry;
pub mod listener;
pub mod tree;
pub mod control;
pub mod format;
pub mod config;

// Re-export commonly used types
pub use util::{Error, FourCc, Result, Status};
pub use class::ClassId;
pub use host::{Host, ObjectId, PropertyAddress};
pub use property::{Property, PropertySet, PropertyValue};
pub use registry::{Registry, Target};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, FourCc, Result, Status};
    pub use crate::class::ClassId;
    pub use crate::host::{Element, Host, MockHost, ObjectId, PropertyAddress, Scope};
    pub use crate::property::*;
    pub use crate::registry::{Registry, Target};
    pub use crate::listener::{Dispatcher, PropertyListener, QueueDispatcher};
    pub use crate::tree::{Node, OwnedObjects, OwnedObjectsOrStreams, TreeBuilder};
    pub use crate::control::ControlModel;
    pub use crate::format::{describe, FourCcDatabase, PropertyListItem};
    pub use crate::config::Config;
}
