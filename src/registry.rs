//! An OID-keyed registry of protocol element decoders.
//!
//! The registry maps object identifier strings to decoder objects. It is
//! populated with the builtin element types at startup and read concurrently
//! thereafter, with the occasional late registration when a plugin is
//! loaded. Reads therefore go through a copy-on-write map behind an
//! [`ArcSwap`]: lookups never take a lock, writers clone the map under a
//! mutex and swap it in.
//!
//! The registry is an ordinary value to be passed to whoever dispatches
//! protocol elements, not a process global.

use core::fmt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use arc_swap::ArcSwap;
use tracing::{debug, trace};

//------------ Registry ------------------------------------------------------

/// A map from OID strings to shared decoder objects.
///
/// The type parameter is the decoder trait object, for instance
/// `Registry<dyn ControlDecoder>`.
pub struct Registry<D: ?Sized> {
    map: ArcSwap<HashMap<String, Arc<D>>>,

    /// Serializes writers. Readers never touch it.
    write: Mutex<()>,
}

impl<D: ?Sized> Registry<D> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Registry {
            map: ArcSwap::from_pointee(HashMap::new()),
            write: Mutex::new(()),
        }
    }

    /// Registers a decoder for the given OID.
    ///
    /// Protocol dispatch must not be ambiguous, so registering a second
    /// decoder under an already known OID is refused.
    pub fn register(
        &self, oid: impl Into<String>, decoder: Arc<D>,
    ) -> Result<(), RegistryError> {
        let oid = oid.into();
        let _write = self.write.lock().unwrap_or_else(|err| err.into_inner());
        let current = self.map.load();
        if current.contains_key(&oid) {
            return Err(RegistryError::Duplicate(oid));
        }
        let mut map = HashMap::clone(&current);
        map.insert(oid.clone(), decoder);
        self.map.store(Arc::new(map));
        debug!(oid = %oid, "registered protocol element decoder");
        Ok(())
    }

    /// Looks up the decoder registered for the given OID.
    ///
    /// Absence is not an error at this level: whether an unknown OID is
    /// fatal depends on the element’s criticality and is the dispatcher’s
    /// decision.
    pub fn lookup(&self, oid: &str) -> Option<Arc<D>> {
        let decoder = self.map.load().get(oid).cloned();
        if decoder.is_none() {
            trace!(oid = %oid, "no decoder registered");
        }
        decoder
    }

    /// Returns the number of registered decoders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.load().len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.load().is_empty()
    }
}

//--- Default

impl<D: ?Sized> Default for Registry<D> {
    fn default() -> Self {
        Self::new()
    }
}

//--- Debug

impl<D: ?Sized> fmt::Debug for Registry<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.map.load().keys()).finish()
    }
}

//------------ RegistryError -------------------------------------------------

/// An error happened while registering a decoder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RegistryError {
    /// A decoder is already registered under this OID.
    Duplicate(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RegistryError::Duplicate(ref oid) => {
                write!(f, "a decoder is already registered for {}", oid)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    trait Named: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct First;
    struct Second;

    impl Named for First {
        fn name(&self) -> &'static str { "first" }
    }

    impl Named for Second {
        fn name(&self) -> &'static str { "second" }
    }

    #[test]
    fn register_and_lookup() {
        let registry: Registry<dyn Named> = Registry::new();
        registry.register("1.2.3", Arc::new(First)).unwrap();
        assert_eq!(registry.lookup("1.2.3").unwrap().name(), "first");
        assert!(registry.lookup("4.5.6").is_none());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let registry: Registry<dyn Named> = Registry::new();
        registry.register("1.2.3", Arc::new(First)).unwrap();
        assert_eq!(
            registry.register("1.2.3", Arc::new(Second)),
            Err(RegistryError::Duplicate("1.2.3".into()))
        );
        // The original mapping survives.
        assert_eq!(registry.lookup("1.2.3").unwrap().name(), "first");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn concurrent_lookups() {
        let registry: Arc<Registry<dyn Named>> = Arc::new(Registry::new());
        registry.register("1.2.3", Arc::new(First)).unwrap();
        let handles: Vec<_> = (0..4).map(|_| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    assert!(registry.lookup("1.2.3").is_some());
                }
            })
        }).collect();
        registry.register("4.5.6", Arc::new(Second)).unwrap();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 2);
    }
}
