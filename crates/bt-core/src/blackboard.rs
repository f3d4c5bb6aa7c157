use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::BlackboardError;

/// Typed blackboard key.
///
/// The numeric id is the storage identity; the name is only used for diagnostics.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    id: u64,
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for BbKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BbKey")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(id: u64, name: &'static str) -> Self {
        Self {
            id,
            name,
            _phantom: PhantomData,
        }
    }

    pub fn id(self) -> u64 {
        self.id
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

/// Run-scoped keyed storage shared by every node of a tree.
///
/// There is no locking and no versioning: a write is visible to any read that happens after
/// it, so writers must be ticked before readers.
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<u64, Box<dyn Any>>,
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blackboard")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains<T: 'static>(&self, key: BbKey<T>) -> bool {
        self.values.contains_key(&key.id)
    }

    pub fn set<T: 'static>(&mut self, key: BbKey<T>, value: T) {
        self.values.insert(key.id, Box::new(value));
    }

    pub fn get<T: 'static>(&self, key: BbKey<T>) -> Option<&T> {
        let value = self.values.get(&key.id)?;
        value
            .downcast_ref::<T>()
            .or_else(|| type_mismatch(key))
    }

    pub fn get_mut<T: 'static>(&mut self, key: BbKey<T>) -> Option<&mut T> {
        let value = self.values.get_mut(&key.id)?;
        value
            .downcast_mut::<T>()
            .or_else(|| type_mismatch(key))
    }

    pub fn remove<T: 'static>(&mut self, key: BbKey<T>) -> Option<T> {
        let value = self.values.remove(&key.id)?;
        value
            .downcast::<T>()
            .map(|b| *b)
            .ok()
            .or_else(|| type_mismatch(key))
    }
}

fn type_mismatch<T: 'static, R>(key: BbKey<T>) -> Option<R> {
    panic!(
        "blackboard type mismatch for key `{}` id={} (stored type differs from requested)",
        key.name, key.id
    )
}

/// A named set of key registrations, one per node that talks to the blackboard.
///
/// Registration happens while the tree is built; the returned handles carry the access mode
/// in their type, so a reader cannot write and a writer cannot read.
#[derive(Debug, Clone)]
pub struct BlackboardClient {
    name: Cow<'static, str>,
    registered: BTreeMap<u64, (&'static str, Access)>,
}

impl BlackboardClient {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            registered: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access(&self, key_id: u64) -> Option<Access> {
        self.registered.get(&key_id).map(|(_, access)| *access)
    }

    /// Registered `(name, access)` pairs in key id order.
    pub fn registrations(&self) -> impl Iterator<Item = (&'static str, Access)> + '_ {
        self.registered.values().copied()
    }

    pub fn register_read<T: 'static>(&mut self, key: BbKey<T>) -> Result<Reader<T>, BlackboardError> {
        self.register(key, Access::Read)?;
        Ok(Reader { key })
    }

    pub fn register_write<T: 'static>(
        &mut self,
        key: BbKey<T>,
    ) -> Result<Writer<T>, BlackboardError> {
        self.register(key, Access::Write)?;
        Ok(Writer { key })
    }

    pub fn register_read_write<T: 'static>(
        &mut self,
        key: BbKey<T>,
    ) -> Result<ReadWriter<T>, BlackboardError> {
        self.register(key, Access::ReadWrite)?;
        Ok(ReadWriter { key })
    }

    fn register<T: 'static>(&mut self, key: BbKey<T>, access: Access) -> Result<(), BlackboardError> {
        if let Some((_, existing)) = self.registered.get(&key.id) {
            return Err(BlackboardError::DuplicateKey {
                client: self.name.to_string(),
                key: key.name,
                id: key.id,
                existing: *existing,
            });
        }
        self.registered.insert(key.id, (key.name, access));
        Ok(())
    }
}

/// Read-only handle produced by [`BlackboardClient::register_read`].
pub struct Reader<T: 'static> {
    key: BbKey<T>,
}

/// Write-only handle produced by [`BlackboardClient::register_write`].
pub struct Writer<T: 'static> {
    key: BbKey<T>,
}

/// Handle produced by [`BlackboardClient::register_read_write`].
pub struct ReadWriter<T: 'static> {
    key: BbKey<T>,
}

macro_rules! handle_common {
    ($handle:ident) => {
        impl<T: 'static> Copy for $handle<T> {}

        impl<T: 'static> Clone for $handle<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T: 'static> fmt::Debug for $handle<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($handle)).field(&self.key).finish()
            }
        }

        impl<T: 'static> $handle<T> {
            pub fn key(&self) -> BbKey<T> {
                self.key
            }
        }
    };
}

handle_common!(Reader);
handle_common!(Writer);
handle_common!(ReadWriter);

impl<T: 'static> Reader<T> {
    /// `None` when the key was never written or has been unset.
    pub fn get<'bb>(&self, blackboard: &'bb Blackboard) -> Option<&'bb T> {
        blackboard.get(self.key)
    }
}

impl<T: 'static> Writer<T> {
    pub fn set(&self, blackboard: &mut Blackboard, value: T) {
        blackboard.set(self.key, value);
    }

    pub fn unset(&self, blackboard: &mut Blackboard) {
        let _ = blackboard.remove(self.key);
    }
}

impl<T: 'static> ReadWriter<T> {
    pub fn get<'bb>(&self, blackboard: &'bb Blackboard) -> Option<&'bb T> {
        blackboard.get(self.key)
    }

    pub fn set(&self, blackboard: &mut Blackboard, value: T) {
        blackboard.set(self.key, value);
    }

    pub fn unset(&self, blackboard: &mut Blackboard) {
        let _ = blackboard.remove(self.key);
    }
}
