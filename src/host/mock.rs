//! Deterministic in-memory host.
//!
//! Stores raw property bytes keyed by object, address and qualifier, and
//! counts every primitive call so tests can assert that an operation was
//! refused before reaching the host. Failures can be injected per primitive
//! or per property.
//!
//! Reference handles follow ownership transfer: a stored value keeps its own
//! handles alive, every read hands the caller fresh handles for the same
//! references, and adopting a handle consumes it.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use super::{
    translation_parts, Host, HostRef, HostResult, ListenerCallback, ListenerToken, ObjectId,
    OpaqueObject, PropertyAddress, RefHandle,
};
use crate::property::{Property, PropertyValue, TypeKind};
use crate::util::{FourCc, Result, Status};

/// Host primitives, for call counting and failure injection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    HasProperty,
    IsSettable,
    DataSize,
    Data,
    SetData,
    AddListener,
    RemoveListener,
}

impl Primitive {
    const COUNT: usize = 7;

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// Handler computing the output of a translation or mutating read from its input.
pub type ByteHandler = Arc<dyn Fn(&[u8]) -> HostResult<Vec<u8>> + Send + Sync>;

/// Opaque object vended by the mock host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockObject {
    pub type_name: String,
    pub description: String,
}

impl MockObject {
    pub fn new(type_name: impl Into<String>, description: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { type_name: type_name.into(), description: description.into() })
    }
}

impl OpaqueObject for MockObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

struct Entry {
    object: ObjectId,
    address: PropertyAddress,
    qualifier: Vec<u8>,
    data: Vec<u8>,
    holds_refs: bool,
    settable: bool,
    size_override: Option<usize>,
    failure: Option<Status>,
}

struct Listener {
    object: ObjectId,
    address: PropertyAddress,
    token: ListenerToken,
    callback: ListenerCallback,
}

#[derive(Default)]
struct State {
    entries: Vec<Entry>,
    refs: HashMap<u64, HostRef>,
    listeners: Vec<Listener>,
    failures: HashMap<Primitive, Status>,
    translators: HashMap<(ObjectId, FourCc), ByteHandler>,
    mutators: HashMap<(ObjectId, FourCc), ByteHandler>,
}

impl State {
    /// Index of the entry for a read: an exact qualifier match wins, an
    /// unqualified entry is the fallback. Later inserts shadow earlier ones.
    fn find_index(&self, object: ObjectId, address: &PropertyAddress, qualifier: &[u8]) -> Option<usize> {
        let matching = |e: &Entry| e.object == object && e.address.matches(address);
        self.entries
            .iter()
            .rposition(|e| matching(e) && e.qualifier == qualifier)
            .or_else(|| self.entries.iter().rposition(|e| matching(e) && e.qualifier.is_empty()))
    }

    fn find(&self, object: ObjectId, address: &PropertyAddress, qualifier: &[u8]) -> Option<&Entry> {
        self.find_index(object, address, qualifier).map(|i| &self.entries[i])
    }

    fn find_mut(
        &mut self,
        object: ObjectId,
        address: &PropertyAddress,
        qualifier: &[u8],
    ) -> Option<&mut Entry> {
        let index = self.find_index(object, address, qualifier)?;
        self.entries.get_mut(index)
    }

    fn entries_for(&mut self, object: ObjectId, selector: FourCc) -> impl Iterator<Item = &mut Entry> {
        self.entries
            .iter_mut()
            .filter(move |e| e.object == object && e.address.selector == selector)
    }

    fn check(&self, primitive: Primitive) -> HostResult<()> {
        match self.failures.get(&primitive) {
            Some(&status) => Err(status),
            None => Ok(()),
        }
    }
}

/// In-memory [`Host`] for tests.
pub struct MockHost {
    state: Mutex<State>,
    calls: [AtomicUsize; Primitive::COUNT],
    next_token: AtomicU64,
    next_ref: AtomicU64,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockHost")
            .field("entries", &state.entries.len())
            .field("refs", &state.refs.len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            calls: Default::default(),
            next_token: AtomicU64::new(1),
            next_ref: AtomicU64::new(0x1000),
        }
    }

    // === Population ===

    /// Store raw bytes under a wildcard address.
    pub fn insert(&self, object: ObjectId, selector: FourCc, data: impl Into<Vec<u8>>) {
        self.insert_entry(object, PropertyAddress::wildcard(selector), Vec::new(), data.into(), false);
    }

    /// Store raw bytes under a specific address.
    pub fn insert_at(&self, object: ObjectId, address: PropertyAddress, data: impl Into<Vec<u8>>) {
        self.insert_entry(object, address, Vec::new(), data.into(), false);
    }

    /// Store raw bytes returned only for reads carrying `qualifier`.
    pub fn insert_qualified(
        &self,
        object: ObjectId,
        selector: FourCc,
        qualifier: &[u8],
        data: impl Into<Vec<u8>>,
    ) {
        self.insert_entry(object, PropertyAddress::wildcard(selector), qualifier.to_vec(), data.into(), false);
    }

    /// Encode and store a typed value.
    pub fn insert_value<P: Property>(&self, object: ObjectId, key: P, value: &PropertyValue) -> Result<()> {
        let bytes = value.encode(key.value_type(), |r| self.vend_ref(r))?;
        let holds_refs = matches!(key.value_type().kind(), TypeKind::Ref | TypeKind::RefArray);
        self.insert_entry(object, PropertyAddress::wildcard(key.selector()), Vec::new(), bytes, holds_refs);
        Ok(())
    }

    /// Encode and store a typed value returned only for reads carrying `qualifier`.
    pub fn insert_qualified_value<P: Property>(
        &self,
        object: ObjectId,
        key: P,
        qualifier: &[u8],
        value: &PropertyValue,
    ) -> Result<()> {
        let bytes = value.encode(key.value_type(), |r| self.vend_ref(r))?;
        let holds_refs = matches!(key.value_type().kind(), TypeKind::Ref | TypeKind::RefArray);
        self.insert_entry(
            object,
            PropertyAddress::wildcard(key.selector()),
            qualifier.to_vec(),
            bytes,
            holds_refs,
        );
        Ok(())
    }

    fn insert_entry(
        &self,
        object: ObjectId,
        address: PropertyAddress,
        qualifier: Vec<u8>,
        data: Vec<u8>,
        holds_refs: bool,
    ) {
        let mut state = self.state.lock();
        if let Some(entry) = state
            .entries
            .iter_mut()
            .find(|e| e.object == object && e.address == address && e.qualifier == qualifier)
        {
            entry.data = data;
            entry.holds_refs = holds_refs;
            return;
        }
        state.entries.push(Entry {
            object,
            address,
            qualifier,
            data,
            holds_refs,
            settable: false,
            size_override: None,
            failure: None,
        });
    }

    /// Drop every entry of a property.
    pub fn remove(&self, object: ObjectId, selector: FourCc) {
        self.state
            .lock()
            .entries
            .retain(|e| !(e.object == object && e.address.selector == selector));
    }

    pub fn set_settable(&self, object: ObjectId, selector: FourCc, settable: bool) {
        for entry in self.state.lock().entries_for(object, selector) {
            entry.settable = settable;
        }
    }

    /// Make the size query report `size` regardless of the stored bytes.
    pub fn override_size(&self, object: ObjectId, selector: FourCc, size: usize) {
        for entry in self.state.lock().entries_for(object, selector) {
            entry.size_override = Some(size);
        }
    }

    /// Make size, data and set calls on one property fail.
    pub fn fail_property(&self, object: ObjectId, selector: FourCc, status: Status) {
        for entry in self.state.lock().entries_for(object, selector) {
            entry.failure = Some(status);
        }
    }

    /// Make every call of one primitive fail.
    pub fn fail(&self, primitive: Primitive, status: Status) {
        self.state.lock().failures.insert(primitive, status);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.failures.clear();
        for entry in state.entries.iter_mut() {
            entry.failure = None;
        }
    }

    /// Answer a translation property by running `handler` on the input section.
    pub fn on_translate<F>(&self, object: ObjectId, selector: FourCc, handler: F)
    where
        F: Fn(&[u8]) -> HostResult<Vec<u8>> + Send + Sync + 'static,
    {
        self.state.lock().translators.insert((object, selector), Arc::new(handler));
    }

    /// Answer a mutating read by running `handler` on the caller's input.
    pub fn on_mutate<F>(&self, object: ObjectId, selector: FourCc, handler: F)
    where
        F: Fn(&[u8]) -> HostResult<Vec<u8>> + Send + Sync + 'static,
    {
        self.state.lock().mutators.insert((object, selector), Arc::new(handler));
    }

    // === Inspection ===

    /// Bytes currently stored for an unqualified property.
    pub fn raw_data(&self, object: ObjectId, selector: FourCc) -> Option<Vec<u8>> {
        let state = self.state.lock();
        state
            .find(object, &PropertyAddress::wildcard(selector), &[])
            .map(|e| e.data.clone())
    }

    pub fn calls(&self, primitive: Primitive) -> usize {
        self.calls[primitive.index()].load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    pub fn reset_calls(&self) {
        for c in &self.calls {
            c.store(0, Ordering::SeqCst);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Number of live reference handles.
    pub fn ref_count(&self) -> usize {
        self.state.lock().refs.len()
    }

    // === Notification ===

    /// Deliver a change batch to every listener registered on `object` whose
    /// address matches one of `addresses`. Callbacks run on the calling thread
    /// with the state lock released.
    pub fn notify(&self, object: ObjectId, addresses: &[PropertyAddress]) -> usize {
        let targets: Vec<(ListenerCallback, Vec<PropertyAddress>)> = {
            let state = self.state.lock();
            state
                .listeners
                .iter()
                .filter(|l| l.object == object)
                .filter_map(|l| {
                    let hits: Vec<PropertyAddress> =
                        addresses.iter().copied().filter(|a| l.address.matches(a)).collect();
                    (!hits.is_empty()).then(|| (Arc::clone(&l.callback), hits))
                })
                .collect()
        };
        for (callback, hits) in &targets {
            callback(hits);
        }
        targets.len()
    }

    #[inline]
    fn count(&self, primitive: Primitive) {
        self.calls[primitive.index()].fetch_add(1, Ordering::SeqCst);
    }
}

impl Host for MockHost {
    fn has_property(&self, object: ObjectId, address: &PropertyAddress) -> bool {
        self.count(Primitive::HasProperty);
        let state = self.state.lock();
        state.check(Primitive::HasProperty).is_ok()
            && state
                .entries
                .iter()
                .any(|e| e.object == object && e.address.matches(address))
    }

    fn is_property_settable(&self, object: ObjectId, address: &PropertyAddress) -> HostResult<bool> {
        self.count(Primitive::IsSettable);
        let state = self.state.lock();
        state.check(Primitive::IsSettable)?;
        state
            .find(object, address, &[])
            .map(|e| e.settable)
            .ok_or(Status::UNKNOWN_PROPERTY)
    }

    fn property_data_size(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        qualifier: &[u8],
    ) -> HostResult<usize> {
        self.count(Primitive::DataSize);
        let state = self.state.lock();
        state.check(Primitive::DataSize)?;
        let entry = state.find(object, address, qualifier).ok_or(Status::UNKNOWN_PROPERTY)?;
        if let Some(status) = entry.failure {
            return Err(status);
        }
        Ok(entry.size_override.unwrap_or(entry.data.len()))
    }

    fn property_data(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        qualifier: &[u8],
        data: &mut [u8],
    ) -> HostResult<usize> {
        self.count(Primitive::Data);
        let key = (object, address.selector);
        let (translator, mutator) = {
            let state = self.state.lock();
            state.check(Primitive::Data)?;
            (state.translators.get(&key).cloned(), state.mutators.get(&key).cloned())
        };

        if let Some(handler) = translator {
            let (input, output) = translation_parts(data).map_err(|_| Status::BAD_PROPERTY_SIZE)?;
            let result = handler(&input)?;
            if result.len() > output.len() {
                return Err(Status::BAD_PROPERTY_SIZE);
            }
            output[..result.len()].copy_from_slice(&result);
            return Ok(data.len());
        }

        if let Some(handler) = mutator {
            let result = handler(data)?;
            let n = result.len().min(data.len());
            data[..n].copy_from_slice(&result[..n]);
            return Ok(n);
        }

        let mut state = self.state.lock();
        let entry = state.find(object, address, qualifier).ok_or(Status::UNKNOWN_PROPERTY)?;
        if let Some(status) = entry.failure {
            return Err(status);
        }
        let n = entry.data.len().min(data.len());
        let mut out = entry.data[..n].to_vec();
        if entry.holds_refs {
            // Hand out new handles; the stored ones stay owned by the entry.
            for chunk in out.chunks_exact_mut(std::mem::size_of::<u64>()) {
                let stored = u64::from_ne_bytes((&*chunk).try_into().map_err(|_| Status::BAD_PROPERTY_SIZE)?);
                let Some(value) = state.refs.get(&stored).cloned() else {
                    continue;
                };
                let fresh = self.next_ref.fetch_add(1, Ordering::SeqCst);
                state.refs.insert(fresh, value);
                chunk.copy_from_slice(&fresh.to_ne_bytes());
            }
        }
        data[..n].copy_from_slice(&out);
        Ok(n)
    }

    fn set_property_data(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        qualifier: &[u8],
        data: &[u8],
    ) -> HostResult<()> {
        self.count(Primitive::SetData);
        {
            let mut state = self.state.lock();
            state.check(Primitive::SetData)?;
            let entry = state
                .find_mut(object, address, qualifier)
                .ok_or(Status::UNKNOWN_PROPERTY)?;
            if let Some(status) = entry.failure {
                return Err(status);
            }
            if !entry.settable {
                return Err(Status::ILLEGAL_OPERATION);
            }
            entry.data = data.to_vec();
        }
        self.notify(object, std::slice::from_ref(address));
        Ok(())
    }

    fn add_listener(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        callback: ListenerCallback,
    ) -> HostResult<ListenerToken> {
        self.count(Primitive::AddListener);
        let mut state = self.state.lock();
        state.check(Primitive::AddListener)?;
        let token = ListenerToken(self.next_token.fetch_add(1, Ordering::SeqCst));
        state.listeners.push(Listener { object, address: *address, token, callback });
        Ok(token)
    }

    fn remove_listener(
        &self,
        object: ObjectId,
        address: &PropertyAddress,
        token: ListenerToken,
    ) -> HostResult<()> {
        self.count(Primitive::RemoveListener);
        let mut state = self.state.lock();
        state.check(Primitive::RemoveListener)?;
        let before = state.listeners.len();
        state
            .listeners
            .retain(|l| !(l.token == token && l.object == object && l.address == *address));
        if state.listeners.len() == before {
            return Err(Status::ILLEGAL_OPERATION);
        }
        Ok(())
    }

    fn adopt_ref(&self, handle: RefHandle) -> Option<HostRef> {
        if handle.is_null() {
            return None;
        }
        self.state.lock().refs.remove(&handle.0)
    }

    fn vend_ref(&self, value: HostRef) -> RefHandle {
        let handle = self.next_ref.fetch_add(1, Ordering::SeqCst);
        self.state.lock().refs.insert(handle, value);
        RefHandle(handle)
    }
}
