//! The property engine.
//!
//! [`Registry`] resolves a key's descriptor, checks its read-semantics
//! preconditions, and then drives the host's byte-buffer protocol:
//!
//! - fixed-size values: one fetch of exactly the static size
//! - arrays and variable records: size query, then fetch; the element count
//!   comes from the size actually returned
//! - references: one fetch of a handle, adopted by the caller
//! - translations: one paired input/output record
//! - mutating reads: the input buffer is overwritten in place
//!
//! Every operation comes in two tiers. `try_*` returns a [`Result`] that keeps
//! the host status; the plain form returns `Option`/`bool` and collapses every
//! failure into "absent". Nothing is cached: each call is a fresh round trip.

use std::sync::Arc;
use tracing::{debug, trace};

use crate::class::ClassId;
use crate::config::Config;
use crate::host::{Element, Host, ObjectId, PropertyAddress, Scope, TranslationRecord};
use crate::property::{
    ObjectProperty, Property, PropertySet, PropertyValue, Qualifier, ReadSemantics, SystemProperty,
    ValueType,
};
use crate::util::{Error, FourCc, Result};

/// Object plus optional scope and element. Unset parts take the registry's
/// configured defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    pub object: ObjectId,
    pub scope: Option<Scope>,
    pub element: Option<Element>,
}

impl Target {
    #[inline]
    pub const fn new(object: ObjectId, scope: Scope, element: Element) -> Self {
        Self { object, scope: Some(scope), element: Some(element) }
    }

    /// Object with default scope and element.
    #[inline]
    pub const fn object(object: ObjectId) -> Self {
        Self { object, scope: None, element: None }
    }

    #[inline]
    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    #[inline]
    pub const fn with_element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }
}

impl From<ObjectId> for Target {
    #[inline]
    fn from(object: ObjectId) -> Self {
        Self::object(object)
    }
}

/// Typed access to a host registry.
pub struct Registry<H: Host> {
    host: Arc<H>,
    config: Config,
}

impl<H: Host> Clone for Registry<H> {
    fn clone(&self) -> Self {
        Self { host: Arc::clone(&self.host), config: self.config.clone() }
    }
}

impl<H: Host> Registry<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self::with_config(host, Config::default())
    }

    pub fn with_config(host: Arc<H>, config: Config) -> Self {
        Self { host, config }
    }

    #[inline]
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Host address of a selector on a target.
    pub fn address(&self, selector: FourCc, target: &Target) -> PropertyAddress {
        PropertyAddress::new(
            selector,
            target.scope.unwrap_or(self.config.default_scope),
            target.element.unwrap_or(self.config.default_element),
        )
    }

    // ========================================================================
    // Probes
    // ========================================================================

    /// Whether the property exists on the target. One round trip.
    pub fn exists<P: Property>(&self, key: P, target: impl Into<Target>) -> bool {
        let target = target.into();
        let address = self.address(key.selector(), &target);
        let found = self.host.has_property(target.object, &address);
        trace!("has_property {:?} on {}: {}", address.selector, target.object, found);
        found
    }

    /// Whether the property can be written. One round trip.
    pub fn try_is_settable<P: Property>(&self, key: P, target: impl Into<Target>) -> Result<bool> {
        let target = target.into();
        let address = self.address(key.selector(), &target);
        let settable = self.host.is_property_settable(target.object, &address)?;
        trace!("is_settable {:?} on {}: {}", address.selector, target.object, settable);
        Ok(settable)
    }

    /// Like [`Registry::try_is_settable`], with any failure read as `false`.
    pub fn is_settable<P: Property>(&self, key: P, target: impl Into<Target>) -> bool {
        self.try_is_settable(key, target).unwrap_or_else(|e| {
            debug!("is_settable {:?}: {}", key, e);
            false
        })
    }

    /// Keys of `S` present on the target, in declaration order.
    /// One round trip per key.
    pub fn all_existing<S: PropertySet>(&self, target: impl Into<Target>) -> Vec<S> {
        let target = target.into();
        S::ALL.iter().copied().filter(|&key| self.exists(key, target)).collect()
    }

    // ========================================================================
    // Get / set
    // ========================================================================

    /// Read and decode a property.
    ///
    /// A qualified-read key without qualifier and a translation key both fail
    /// before any host call.
    pub fn try_get<P: Property>(
        &self,
        key: P,
        target: impl Into<Target>,
        qualifier: Option<&Qualifier<'_>>,
    ) -> Result<PropertyValue> {
        let bytes = self.try_get_raw(key, target, qualifier)?;
        PropertyValue::decode(key.value_type(), &bytes, |handle| self.host.adopt_ref(handle))
    }

    /// Undecoded bytes of a read, under the same checks as [`Registry::try_get`].
    /// Reference handles in the result are owned by the caller.
    pub fn try_get_raw<P: Property>(
        &self,
        key: P,
        target: impl Into<Target>,
        qualifier: Option<&Qualifier<'_>>,
    ) -> Result<Vec<u8>> {
        let desc = key.descriptor();
        match desc.read_semantics {
            ReadSemantics::QualifiedRead(_) if qualifier.is_none() => {
                return Err(Error::QualifierRequired { selector: desc.selector });
            }
            ReadSemantics::Translation(..) => {
                return Err(Error::SemanticsMismatch { selector: desc.selector, expected: "plain reads" });
            }
            _ => {}
        }
        let target = target.into();
        let address = self.address(desc.selector, &target);
        let qualifier = qualifier.map(Qualifier::as_bytes).unwrap_or(&[]);
        self.fetch(target.object, &address, desc.value_type, qualifier)
    }

    /// Like [`Registry::try_get`], with any failure read as absent.
    pub fn get<P: Property>(
        &self,
        key: P,
        target: impl Into<Target>,
        qualifier: Option<&Qualifier<'_>>,
    ) -> Option<PropertyValue> {
        self.try_get(key, target, qualifier)
            .map_err(|e| debug!("get {:?}: {}", key, e))
            .ok()
    }

    fn fetch(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        value_type: ValueType,
        qualifier: &[u8],
    ) -> Result<Vec<u8>> {
        let size = match value_type.static_size() {
            Some(size) => size,
            None => self.host.property_data_size(object, address, qualifier)?,
        };
        let mut buf = vec![0u8; size];
        let used = self.host.property_data(object, address, qualifier, &mut buf)?;
        buf.truncate(used.min(size));
        trace!(
            "get {:?} on {}: {} of {} bytes",
            address.selector,
            object,
            buf.len(),
            size
        );
        Ok(buf)
    }

    /// Encode and write a property. A value of the wrong type fails before
    /// any host call.
    pub fn try_set<P: Property>(
        &self,
        key: P,
        value: &PropertyValue,
        target: impl Into<Target>,
        qualifier: Option<&Qualifier<'_>>,
    ) -> Result<()> {
        let desc = key.descriptor();
        let bytes = value.encode(desc.value_type, |r| self.host.vend_ref(r))?;
        let target = target.into();
        let address = self.address(desc.selector, &target);
        let qualifier = qualifier.map(Qualifier::as_bytes).unwrap_or(&[]);
        self.host.set_property_data(target.object, &address, qualifier, &bytes)?;
        trace!("set {:?} on {}: {} bytes", desc.selector, target.object, bytes.len());
        Ok(())
    }

    /// Like [`Registry::try_set`], returning whether the write succeeded.
    pub fn set<P: Property>(
        &self,
        key: P,
        value: &PropertyValue,
        target: impl Into<Target>,
        qualifier: Option<&Qualifier<'_>>,
    ) -> bool {
        self.try_set(key, value, target, qualifier)
            .map_err(|e| debug!("set {:?}: {}", key, e))
            .is_ok()
    }

    // ========================================================================
    // Translate / mutate
    // ========================================================================

    /// Translate `input` through a translation key in one round trip.
    ///
    /// String input is passed inline as UTF-8.
    pub fn try_translate<P: Property>(
        &self,
        key: P,
        input: &PropertyValue,
        target: impl Into<Target>,
    ) -> Result<PropertyValue> {
        let desc = key.descriptor();
        let ReadSemantics::Translation(source, destination) = desc.read_semantics else {
            return Err(Error::SemanticsMismatch { selector: desc.selector, expected: "translation" });
        };
        let input_bytes = match (input, source) {
            (PropertyValue::String(s), ValueType::String) => s.as_bytes().to_vec(),
            _ => input.encode(source, |r| self.host.vend_ref(r))?,
        };
        let output_len = destination
            .static_size()
            .ok_or_else(|| Error::invalid(format!("cannot translate into {}", destination)))?;

        let target = target.into();
        let address = self.address(desc.selector, &target);
        let mut record = TranslationRecord::new(&input_bytes, output_len);
        self.host.property_data(target.object, &address, &[], record.as_mut_bytes())?;
        trace!("translate {:?} on {}", desc.selector, target.object);
        PropertyValue::decode(destination, record.output()?, |handle| self.host.adopt_ref(handle))
    }

    pub fn translate<P: Property>(
        &self,
        key: P,
        input: &PropertyValue,
        target: impl Into<Target>,
    ) -> Option<PropertyValue> {
        self.try_translate(key, input, target)
            .map_err(|e| debug!("translate {:?}: {}", key, e))
            .ok()
    }

    /// Run a mutating read: `input` is written to the buffer and the host
    /// replaces it with the result.
    pub fn try_mutate<P: Property>(
        &self,
        key: P,
        input: &PropertyValue,
        target: impl Into<Target>,
    ) -> Result<PropertyValue> {
        let desc = key.descriptor();
        if desc.read_semantics != ReadSemantics::MutatingRead {
            return Err(Error::SemanticsMismatch { selector: desc.selector, expected: "mutating reads" });
        }
        let mut buf = input.encode(desc.value_type, |r| self.host.vend_ref(r))?;
        let target = target.into();
        let address = self.address(desc.selector, &target);
        let used = self.host.property_data(target.object, &address, &[], &mut buf)?;
        buf.truncate(used);
        trace!("mutate {:?} on {}: {} bytes", desc.selector, target.object, used);
        PropertyValue::decode(desc.value_type, &buf, |handle| self.host.adopt_ref(handle))
    }

    pub fn mutate<P: Property>(
        &self,
        key: P,
        input: &PropertyValue,
        target: impl Into<Target>,
    ) -> Option<PropertyValue> {
        self.try_mutate(key, input, target)
            .map_err(|e| debug!("mutate {:?}: {}", key, e))
            .ok()
    }

    // ========================================================================
    // Conveniences
    // ========================================================================

    /// Device with the given unique id.
    pub fn device_for_uid(&self, uid: &str) -> Option<ObjectId> {
        self.translate_to_object(SystemProperty::DeviceForUid, uid)
    }

    /// Plug-in with the given bundle id.
    pub fn plugin_for_bundle_id(&self, bundle_id: &str) -> Option<ObjectId> {
        self.translate_to_object(SystemProperty::PlugInForBundleId, bundle_id)
    }

    fn translate_to_object(&self, key: SystemProperty, input: &str) -> Option<ObjectId> {
        self.translate(key, &PropertyValue::String(input.to_string()), ObjectId::SYSTEM)
            .and_then(|v| v.as_object_id())
            .filter(|id| !id.is_unknown())
    }

    /// Class of an object.
    pub fn class_of(&self, object: ObjectId) -> Option<ClassId> {
        self.get(ObjectProperty::Class, object, None)?.as_class_id()
    }

    /// Display name of an object.
    pub fn name_of(&self, object: ObjectId) -> Option<String> {
        match self.get(ObjectProperty::Name, object, None)? {
            PropertyValue::String(name) => Some(name),
            _ => None,
        }
    }
}
