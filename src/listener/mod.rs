//! Change-notification subscriptions.
//!
//! A [`PropertyListener`] is the only engine value holding host-side state
//! beyond one call. Its lifecycle:
//!
//! ```text
//! (add) --ok--> Active --remove()--> Removed
//!   \                  \--drop------> Removed
//!    \--host failure--> no listener
//! ```
//!
//! `remove` is idempotent. Dropping an active listener removes it. A removal
//! the host refuses silences the callback but leaves the listener `Active`,
//! so the drop tries again. Batches already in flight when delivery stops
//! are discarded.
//!
//! Callbacks arrive on the host's notification thread, or on whatever a
//! [`Dispatcher`] forwards them to. No ordering is guaranteed relative to
//! other listeners or to the `set` that caused the change.

mod queue;

use parking_lot::Mutex;
use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::host::{Host, ListenerCallback, ListenerToken, ObjectId, PropertyAddress};
use crate::property::{Property, PropertySet};
use crate::registry::{Registry, Target};
use crate::util::Result;

pub use queue::QueueDispatcher;

/// A unit of callback work.
pub type Job = Box<dyn FnOnce() + Send>;

/// Where listener callbacks run.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// Runs callbacks directly on the notifying thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct Immediate;

impl Dispatcher for Immediate {
    #[inline]
    fn dispatch(&self, job: Job) {
        job()
    }
}

/// Lifecycle state of a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerState {
    Active,
    Removed,
}

/// Batch of changed addresses, inline for the common small case.
type Batch = SmallVec<[PropertyAddress; 4]>;

/// A registered change listener. Removed on drop.
pub struct PropertyListener<H: Host> {
    host: Arc<H>,
    object: ObjectId,
    address: PropertyAddress,
    token: ListenerToken,
    active: Arc<AtomicBool>,
    state: Mutex<ListenerState>,
}

impl<H: Host> PropertyListener<H> {
    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn address(&self) -> PropertyAddress {
        self.address
    }

    pub fn state(&self) -> ListenerState {
        *self.state.lock()
    }

    pub fn is_active(&self) -> bool {
        self.state() == ListenerState::Active
    }

    /// Unregister from the host. A second call after success is a no-op.
    ///
    /// The listener stops delivering even if the host call fails, but stays
    /// `Active` so a later `remove` or the drop retries the host call.
    pub fn try_remove(&self) -> Result<()> {
        let mut state = self.state.lock();
        if *state == ListenerState::Removed {
            return Ok(());
        }
        self.active.store(false, Ordering::SeqCst);
        self.host.remove_listener(self.object, &self.address, self.token)?;
        *state = ListenerState::Removed;
        debug!("removed listener {:?} on {}", self.address.selector, self.object);
        Ok(())
    }

    /// Like [`PropertyListener::try_remove`], returning whether it succeeded.
    pub fn remove(&self) -> bool {
        self.try_remove().is_ok()
    }
}

impl<H: Host> Drop for PropertyListener<H> {
    fn drop(&mut self) {
        if self.is_active() {
            if let Err(e) = self.try_remove() {
                warn!(
                    "failed to release listener {:?} on {}: {}",
                    self.address.selector, self.object, e
                );
            }
        }
    }
}

impl<H: Host> fmt::Debug for PropertyListener<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyListener")
            .field("object", &self.object)
            .field("address", &self.address)
            .field("state", &self.state())
            .finish()
    }
}

impl<H: Host> Registry<H> {
    /// Subscribe to changes of `key` on `target`.
    ///
    /// The callback receives each batch of changed addresses, through
    /// `dispatcher` when one is given.
    pub fn try_add_listener<P, F>(
        &self,
        key: P,
        target: impl Into<Target>,
        dispatcher: Option<Arc<dyn Dispatcher>>,
        callback: F,
    ) -> Result<PropertyListener<H>>
    where
        P: Property,
        F: Fn(&[PropertyAddress]) + Send + Sync + 'static,
    {
        let target = target.into();
        let address = self.address(key.selector(), &target);
        let active = Arc::new(AtomicBool::new(true));
        let callback = Arc::new(callback);

        let flag = Arc::clone(&active);
        let wrapped: ListenerCallback = Arc::new(move |changed: &[PropertyAddress]| {
            if !flag.load(Ordering::SeqCst) {
                return;
            }
            match &dispatcher {
                None => callback(changed),
                Some(dispatcher) => {
                    let batch: Batch = changed.iter().copied().collect();
                    let flag = Arc::clone(&flag);
                    let callback = Arc::clone(&callback);
                    dispatcher.dispatch(Box::new(move || {
                        if flag.load(Ordering::SeqCst) {
                            callback(&batch);
                        }
                    }));
                }
            }
        });

        let token = self.host().add_listener(target.object, &address, wrapped)?;
        debug!("added listener {:?} on {}", address.selector, target.object);
        Ok(PropertyListener {
            host: Arc::clone(self.host()),
            object: target.object,
            address,
            token,
            active,
            state: Mutex::new(ListenerState::Active),
        })
    }

    /// Like [`Registry::try_add_listener`]; a host failure yields no listener.
    pub fn add_listener<P, F>(
        &self,
        key: P,
        target: impl Into<Target>,
        dispatcher: Option<Arc<dyn Dispatcher>>,
        callback: F,
    ) -> Option<PropertyListener<H>>
    where
        P: Property,
        F: Fn(&[PropertyAddress]) + Send + Sync + 'static,
    {
        self.try_add_listener(key, target, dispatcher, callback)
            .map_err(|e| debug!("add_listener {:?}: {}", key, e))
            .ok()
    }
}

/// Keys of `S` named in a notification batch. Addresses outside the set are
/// skipped; each key appears once, in batch order.
pub fn changed_keys<S: PropertySet>(batch: &[PropertyAddress]) -> Vec<S> {
    let mut keys = Vec::with_capacity(batch.len());
    for key in batch.iter().filter_map(|a| S::from_selector(a.selector).ok()) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}
