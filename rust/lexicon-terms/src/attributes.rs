//! Lazily-built, type-keyed side-channel attributes attached to a cursor.
//!
//! Attributes let cooperating components (for example a multi-term query and
//! the cursor it drives) exchange typed values without widening the cursor
//! trait. A cursor that never has attributes requested pays for one empty
//! `OnceLock`.

use std::{
    any::{Any, TypeId},
    sync::{Arc, Mutex, OnceLock},
};

use ahash::AHashMap;

type AttributeMap = AHashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// A type-keyed attribute store with one-time, thread-safe initialization.
///
/// The backing map is created on first access. Initialization goes through a
/// `OnceLock`, so a store shared by many threads (such as the one behind the
/// null cursor) is never constructed twice.
#[derive(Default)]
pub struct Attributes {
    map: OnceLock<Mutex<AttributeMap>>,
}

impl Attributes {
    pub const fn new() -> Self {
        Attributes {
            map: OnceLock::new(),
        }
    }

    fn map(&self) -> &Mutex<AttributeMap> {
        self.map.get_or_init(|| Mutex::new(AttributeMap::default()))
    }

    /// Returns the attribute of type `T`, creating it with `init` if absent.
    pub fn get_or_insert_with<T, F>(&self, init: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let mut map = self.map().lock().unwrap_or_else(|e| e.into_inner());
        let entry = map
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(init()) as Arc<dyn Any + Send + Sync>);
        Arc::clone(entry)
            .downcast::<T>()
            .unwrap_or_else(|_| unreachable!("attribute map is keyed by TypeId"))
    }

    /// Returns the attribute of type `T`, creating a default one if absent.
    pub fn get_or_default<T>(&self) -> Arc<T>
    where
        T: Any + Send + Sync + Default,
    {
        self.get_or_insert_with(T::default)
    }

    /// Returns the attribute of type `T` if one was added.
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let map = self.map.get()?.lock().unwrap_or_else(|e| e.into_inner());
        let value = Arc::clone(map.get(&TypeId::of::<T>())?);
        value.downcast::<T>().ok()
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.map.get().is_some_and(|map| {
            map.lock()
                .unwrap_or_else(|e| e.into_inner())
                .contains_key(&TypeId::of::<T>())
        })
    }

    pub fn len(&self) -> usize {
        self.map
            .get()
            .map_or(0, |map| map.lock().unwrap_or_else(|e| e.into_inner()).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the backing map has been created.
    pub fn is_initialized(&self) -> bool {
        self.map.get().is_some()
    }
}

impl std::fmt::Debug for Attributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attributes")
            .field("len", &self.len())
            .finish()
    }
}
