//! Per-turn unit of work over a [`Storage`].
//!
//! Reads go through a cache; writes are staged in memory and only reach the
//! store on [`StateAccessor::save`], in one atomic batch. A turn that fails
//! before `save` leaves the store untouched.

use std::collections::{BTreeMap, HashMap};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::{Result, StateError};
use crate::key::StateKey;
use crate::storage::{Change, Storage};

pub struct StateAccessor<'a> {
    storage: &'a dyn Storage,
    /// Values as last read from (or committed to) the store.
    cache: HashMap<String, serde_json::Value>,
    /// Pending writes; `None` marks a delete. Ordered so commits are deterministic.
    staged: BTreeMap<String, Option<serde_json::Value>>,
}

impl<'a> StateAccessor<'a> {
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self {
            storage,
            cache: HashMap::new(),
            staged: BTreeMap::new(),
        }
    }

    /// Fetch several keys in one storage round-trip.
    pub fn prefetch(&mut self, keys: &[StateKey]) -> Result<()> {
        let wanted: Vec<String> = keys
            .iter()
            .map(StateKey::format)
            .filter(|k| !self.cache.contains_key(k))
            .collect();
        if wanted.is_empty() {
            return Ok(());
        }
        let found = self.storage.read(&wanted)?;
        self.cache.extend(found);
        Ok(())
    }

    /// Current value for `key`: staged write first, then stored value, then `default()`.
    pub fn get<T, F>(&mut self, key: &StateKey, default: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let k = key.format();

        if let Some(staged) = self.staged.get(&k) {
            return match staged {
                Some(value) => decode(&k, value.clone()),
                None => Ok(default()),
            };
        }

        if !self.cache.contains_key(&k) {
            let found = self.storage.read(std::slice::from_ref(&k))?;
            self.cache.extend(found);
        }

        match self.cache.get(&k) {
            Some(value) => decode(&k, value.clone()),
            None => Ok(default()),
        }
    }

    /// Stage `record` under `key`. Visible to `get` immediately, stored on `save`.
    pub fn set<T: Serialize>(&mut self, key: &StateKey, record: &T) -> Result<()> {
        let k = key.format();
        let value = serde_json::to_value(record)
            .map_err(|source| StateError::Serialization { key: k.clone(), source })?;
        self.staged.insert(k, Some(value));
        Ok(())
    }

    /// Stage removal of `key`.
    pub fn delete(&mut self, key: &StateKey) {
        self.staged.insert(key.format(), None);
    }

    /// Number of staged, uncommitted changes.
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    /// Commit all staged changes in a single batch. Returns how many were written.
    pub fn save(&mut self) -> Result<usize> {
        if self.staged.is_empty() {
            return Ok(0);
        }

        let changes: Vec<Change> = self
            .staged
            .iter()
            .map(|(key, value)| match value {
                Some(value) => Change::Upsert {
                    key: key.clone(),
                    value: value.clone(),
                },
                None => Change::Delete { key: key.clone() },
            })
            .collect();

        self.storage.write(&changes)?;

        for (key, value) in std::mem::take(&mut self.staged) {
            match value {
                Some(value) => {
                    self.cache.insert(key, value);
                }
                None => {
                    self.cache.remove(&key);
                }
            }
        }

        debug!(changes = changes.len(), "state saved");
        Ok(changes.len())
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| StateError::Serialization {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::types::{DialogFrame, DialogStack, UserProfile};
    use devbot_core::types::{ConversationId, UserId};

    #[test]
    fn get_returns_default_for_unknown_key() {
        let storage = MemoryStorage::new();
        let mut acc = StateAccessor::new(&storage);
        let profile: UserProfile = acc
            .get(&StateKey::profile(&UserId::from("u1")), UserProfile::default)
            .unwrap();
        assert_eq!(profile, UserProfile::default());
        assert_eq!(acc.pending(), 0);
    }

    #[test]
    fn set_then_get_round_trips_before_save() {
        let storage = MemoryStorage::new();
        let key = StateKey::profile(&UserId::from("u1"));
        let mut acc = StateAccessor::new(&storage);

        let profile = UserProfile {
            name: "Jane".into(),
            external_id: String::new(),
        };
        acc.set(&key, &profile).unwrap();

        let read: UserProfile = acc.get(&key, UserProfile::default).unwrap();
        assert_eq!(read, profile);
        // Nothing reached the store yet.
        assert!(storage.is_empty());
    }

    #[test]
    fn save_commits_once_and_clears_stage() {
        let storage = MemoryStorage::new();
        let conv = ConversationId::from("c1");
        let mut acc = StateAccessor::new(&storage);

        let mut stack = DialogStack::default();
        stack.push(DialogFrame::new("identity", serde_json::Value::Null));
        acc.set(&StateKey::dialog_stack(&conv), &stack).unwrap();
        acc.set(&StateKey::profile(&UserId::from("u1")), &UserProfile::default())
            .unwrap();

        assert_eq!(acc.save().unwrap(), 2);
        assert_eq!(acc.pending(), 0);
        assert_eq!(storage.len(), 2);
        assert_eq!(acc.save().unwrap(), 0);

        let mut fresh = StateAccessor::new(&storage);
        let loaded: DialogStack = fresh
            .get(&StateKey::dialog_stack(&conv), DialogStack::default)
            .unwrap();
        assert_eq!(loaded, stack);
    }

    #[test]
    fn delete_hides_stored_value() {
        let storage = MemoryStorage::new();
        let key = StateKey::profile(&UserId::from("u1"));
        {
            let mut acc = StateAccessor::new(&storage);
            acc.set(
                &key,
                &UserProfile {
                    name: "Jane".into(),
                    external_id: "jdoe".into(),
                },
            )
            .unwrap();
            acc.save().unwrap();
        }

        let mut acc = StateAccessor::new(&storage);
        acc.delete(&key);
        let read: UserProfile = acc.get(&key, UserProfile::default).unwrap();
        assert!(read.name.is_empty());
        acc.save().unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn saving_same_state_twice_is_idempotent() {
        let storage = MemoryStorage::new();
        let key = StateKey::profile(&UserId::from("u1"));
        let profile = UserProfile {
            name: "Jane".into(),
            external_id: "jdoe".into(),
        };

        for _ in 0..2 {
            let mut acc = StateAccessor::new(&storage);
            acc.set(&key, &profile).unwrap();
            acc.save().unwrap();
        }

        assert_eq!(storage.len(), 1);
        let stored = storage.read(&[key.format()]).unwrap();
        assert_eq!(stored[&key.format()], serde_json::to_value(&profile).unwrap());
    }

    #[test]
    fn corrupt_record_surfaces_serialization_error() {
        let storage = MemoryStorage::new();
        let key = StateKey::dialog_stack(&ConversationId::from("c1"));
        storage
            .write(&[Change::Upsert {
                key: key.format(),
                value: serde_json::json!({"not": "a stack"}),
            }])
            .unwrap();

        let mut acc = StateAccessor::new(&storage);
        let err = acc
            .get::<DialogStack, _>(&key, DialogStack::default)
            .unwrap_err();
        assert!(matches!(err, StateError::Serialization { .. }));
    }
}
