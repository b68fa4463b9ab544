//! Typed In-Memory Store
//!
//! This module implements the data store behind every command. The store
//! holds four independent typed namespaces, each keyed by string:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                        Store                          │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐  │
//! │  │ strings  │ │  lists   │ │   sets   │ │  hashes  │  │
//! │  │ RwLock   │ │ RwLock   │ │ RwLock   │ │ RwLock   │  │
//! │  └──────────┘ └──────────┘ └──────────┘ └──────────┘  │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! The namespaces are independent: a key living in the list namespace says
//! nothing about whether "the same" key exists in the string namespace.
//!
//! ## Concurrency Model
//!
//! One `RwLock` per namespace. Every operation holds its namespace lock for
//! the whole read or mutate sequence, so a series of operations against the
//! same key from concurrent connections is linearizable. Operations on
//! different namespaces never contend.
//!
//! ## Lifecycle
//!
//! The store is created once at process start and lives for the process
//! lifetime; there is no persistence. Collection entries are created lazily
//! on first write and removed only by explicit deletion. Removing the last
//! element of a collection leaves an empty container behind.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::RwLock;
use thiserror::Error;

/// Errors produced by store operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// List range bounds outside what `lrange` accepts.
    #[error("start {start} and end {end} are out of bounds for list of length {len}")]
    InvalidRange { start: i64, end: i64, len: usize },
}

/// The in-memory store shared by all connections.
///
/// Designed to be wrapped in an `Arc` and handed to every worker task. All
/// operations are thread-safe.
///
/// # Example
///
/// ```
/// use tetrakv::storage::Store;
///
/// let store = Store::new();
/// store.set("name", "ada".to_string());
/// assert_eq!(store.get("name"), Some("ada".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct Store {
    strings: RwLock<HashMap<String, String>>,
    lists: RwLock<HashMap<String, VecDeque<String>>>,
    sets: RwLock<HashMap<String, HashSet<String>>>,
    hashes: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // String namespace
    // ========================================================================

    /// Sets a key, unconditionally overwriting any previous value.
    pub fn set(&self, key: &str, value: String) {
        let mut strings = self.strings.write().unwrap();
        strings.insert(key.to_string(), value);
    }

    /// Returns the value for a key, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<String> {
        let strings = self.strings.read().unwrap();
        strings.get(key).cloned()
    }

    /// Removes a key from the string namespace.
    ///
    /// Returns `true` if the key existed.
    pub fn del(&self, key: &str) -> bool {
        let mut strings = self.strings.write().unwrap();
        strings.remove(key).is_some()
    }

    /// Reports whether a key exists in the string namespace.
    pub fn exists(&self, key: &str) -> bool {
        let strings = self.strings.read().unwrap();
        strings.contains_key(key)
    }

    // ========================================================================
    // List namespace
    // ========================================================================

    /// Pushes each value at the head of the list, in argument order, creating
    /// the list if needed. `lpush k a b` yields `[b, a]` because each push
    /// places its argument at the new head.
    ///
    /// Returns the resulting list length.
    pub fn lpush(&self, key: &str, values: &[String]) -> usize {
        let mut lists = self.lists.write().unwrap();
        let list = lists.entry(key.to_string()).or_default();
        for value in values {
            list.push_front(value.clone());
        }
        list.len()
    }

    /// Pushes each value at the tail of the list, in argument order, creating
    /// the list if needed.
    ///
    /// Returns the resulting list length.
    pub fn rpush(&self, key: &str, values: &[String]) -> usize {
        let mut lists = self.lists.write().unwrap();
        let list = lists.entry(key.to_string()).or_default();
        for value in values {
            list.push_back(value.clone());
        }
        list.len()
    }

    /// Removes and returns the head element, or `None` if the list is absent
    /// or empty. An emptied list stays in place.
    pub fn lpop(&self, key: &str) -> Option<String> {
        let mut lists = self.lists.write().unwrap();
        lists.get_mut(key)?.pop_front()
    }

    /// Removes and returns the tail element, or `None` if the list is absent
    /// or empty.
    pub fn rpop(&self, key: &str) -> Option<String> {
        let mut lists = self.lists.write().unwrap();
        lists.get_mut(key)?.pop_back()
    }

    /// Returns the inclusive slice `[start, end]` of the list. `end == -1`
    /// means through the current last index.
    ///
    /// A missing list yields an empty slice. Bounds are validated against the
    /// current length: `start < 0`, `start > len`, `end > len`, or
    /// `end < start` (unless `end == -1`) fail with
    /// [`StoreError::InvalidRange`].
    pub fn lrange(&self, key: &str, start: i64, end: i64) -> Result<Vec<String>, StoreError> {
        let lists = self.lists.read().unwrap();
        let Some(list) = lists.get(key) else {
            return Ok(Vec::new());
        };

        let len = list.len();
        let out_of_bounds = start < 0
            || start as usize > len
            || (end != -1 && (end < start || end as usize > len));
        if out_of_bounds {
            return Err(StoreError::InvalidRange { start, end, len });
        }

        let start = start as usize;
        let upper = if end == -1 { len } else { end as usize };

        Ok(list
            .iter()
            .skip(start)
            .take(upper - start + 1)
            .cloned()
            .collect())
    }

    // ========================================================================
    // Set namespace
    // ========================================================================

    /// Adds the members to the set, creating it if needed.
    ///
    /// Returns the count of members given, not the count newly inserted.
    /// That is the pinned semantic; see DESIGN.md.
    pub fn sadd(&self, key: &str, members: &[String]) -> usize {
        let mut sets = self.sets.write().unwrap();
        let set = sets.entry(key.to_string()).or_default();
        for member in members {
            set.insert(member.clone());
        }
        members.len()
    }

    /// Removes the given members, returning how many were actually present.
    pub fn srem(&self, key: &str, members: &[String]) -> usize {
        let mut sets = self.sets.write().unwrap();
        let Some(set) = sets.get_mut(key) else {
            return 0;
        };
        members.iter().filter(|m| set.remove(m.as_str())).count()
    }

    /// Returns all members, or `None` if the set is absent or empty.
    /// Member order is unspecified.
    pub fn smembers(&self, key: &str) -> Option<Vec<String>> {
        let sets = self.sets.read().unwrap();
        let set = sets.get(key)?;
        if set.is_empty() {
            return None;
        }
        Some(set.iter().cloned().collect())
    }

    /// Reports whether the member is in the set. Absent set counts as no.
    pub fn sismember(&self, key: &str, member: &str) -> bool {
        let sets = self.sets.read().unwrap();
        sets.get(key).is_some_and(|set| set.contains(member))
    }

    // ========================================================================
    // Hash namespace
    // ========================================================================

    /// Sets the given field/value pairs, creating the hash if needed.
    ///
    /// Returns the number of fields newly added (fields that did not exist
    /// before this call). Overwriting an existing field does not count.
    pub fn hset(&self, key: &str, pairs: &[(String, String)]) -> usize {
        let mut hashes = self.hashes.write().unwrap();
        let hash = hashes.entry(key.to_string()).or_default();
        let mut added = 0;
        for (field, value) in pairs {
            if hash.insert(field.clone(), value.clone()).is_none() {
                added += 1;
            }
        }
        added
    }

    /// Returns the value for a field, or `None` if the hash or field is
    /// absent.
    pub fn hget(&self, key: &str, field: &str) -> Option<String> {
        let hashes = self.hashes.read().unwrap();
        hashes.get(key)?.get(field).cloned()
    }

    /// Removes the given fields, returning how many were actually present.
    pub fn hdel(&self, key: &str, fields: &[String]) -> usize {
        let mut hashes = self.hashes.write().unwrap();
        let Some(hash) = hashes.get_mut(key) else {
            return 0;
        };
        fields
            .iter()
            .filter(|f| hash.remove(f.as_str()).is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn set_get_overwrite() {
        let store = Store::new();
        store.set("k", "v1".to_string());
        assert_eq!(store.get("k"), Some("v1".to_string()));

        store.set("k", "v2".to_string());
        assert_eq!(store.get("k"), Some("v2".to_string()));
    }

    #[test]
    fn get_absent_key() {
        let store = Store::new();
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn del_and_exists() {
        let store = Store::new();
        assert!(!store.del("k"));
        assert!(!store.exists("k"));

        store.set("k", "v".to_string());
        assert!(store.exists("k"));
        assert!(store.del("k"));
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn namespaces_are_independent() {
        let store = Store::new();
        store.lpush("k", &values(&["a"]));
        // "k" lives in the list namespace only.
        assert!(!store.exists("k"));
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn lpush_places_each_value_at_head() {
        let store = Store::new();
        assert_eq!(store.lpush("k", &values(&["a", "b"])), 2);
        assert_eq!(store.lrange("k", 0, -1).unwrap(), values(&["b", "a"]));
    }

    #[test]
    fn rpush_appends_in_order() {
        let store = Store::new();
        assert_eq!(store.rpush("k", &values(&["a", "b"])), 2);
        assert_eq!(store.rpush("k", &values(&["c"])), 3);
        assert_eq!(store.lrange("k", 0, -1).unwrap(), values(&["a", "b", "c"]));
    }

    #[test]
    fn lpop_and_rpop() {
        let store = Store::new();
        store.rpush("k", &values(&["a", "b", "c"]));
        assert_eq!(store.lpop("k"), Some("a".to_string()));
        assert_eq!(store.rpop("k"), Some("c".to_string()));
        assert_eq!(store.lpop("k"), Some("b".to_string()));
        assert_eq!(store.lpop("k"), None);
        assert_eq!(store.lpop("absent"), None);
    }

    #[test]
    fn emptied_list_stays_and_ranges_empty() {
        let store = Store::new();
        store.rpush("k", &values(&["a"]));
        assert_eq!(store.lpop("k"), Some("a".to_string()));
        // The empty container is retained; the slice is just empty.
        assert_eq!(store.lrange("k", 0, -1).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn lrange_missing_list_is_empty() {
        let store = Store::new();
        assert_eq!(store.lrange("absent", 0, -1).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn lrange_inclusive_bounds() {
        let store = Store::new();
        store.rpush("k", &values(&["a", "b", "c", "d"]));
        assert_eq!(store.lrange("k", 1, 2).unwrap(), values(&["b", "c"]));
        assert_eq!(store.lrange("k", 0, 0).unwrap(), values(&["a"]));
        assert_eq!(store.lrange("k", 2, -1).unwrap(), values(&["c", "d"]));
    }

    #[test]
    fn lrange_rejects_bad_bounds() {
        let store = Store::new();
        store.rpush("k", &values(&["a", "b"]));

        assert!(store.lrange("k", -1, 1).is_err());
        assert!(store.lrange("k", 3, 3).is_err()); // start beyond length
        assert!(store.lrange("k", 0, 5).is_err()); // end beyond length
        assert!(store.lrange("k", 1, 0).is_err()); // end before start
        assert!(store.lrange("k", 0, -2).is_err()); // negative end other than -1
    }

    #[test]
    fn sadd_counts_members_given() {
        let store = Store::new();
        assert_eq!(store.sadd("k", &values(&["m1", "m2"])), 2);
        // Re-adding an existing member still counts it.
        assert_eq!(store.sadd("k", &values(&["m1"])), 1);
        assert!(store.sismember("k", "m1"));

        let mut members = store.smembers("k").unwrap();
        members.sort();
        assert_eq!(members, values(&["m1", "m2"]));
    }

    #[test]
    fn srem_counts_removed() {
        let store = Store::new();
        store.sadd("k", &values(&["a", "b"]));
        assert_eq!(store.srem("k", &values(&["a", "x"])), 1);
        assert_eq!(store.srem("absent", &values(&["a"])), 0);
    }

    #[test]
    fn smembers_absent_or_empty_is_none() {
        let store = Store::new();
        assert_eq!(store.smembers("absent"), None);

        store.sadd("k", &values(&["a"]));
        store.srem("k", &values(&["a"]));
        // The emptied set is retained but reads as absent.
        assert_eq!(store.smembers("k"), None);
    }

    #[test]
    fn sismember_absent_set() {
        let store = Store::new();
        assert!(!store.sismember("absent", "m"));
    }

    #[test]
    fn hset_counts_newly_added_fields() {
        let store = Store::new();
        let pairs = vec![
            ("f1".to_string(), "v1".to_string()),
            ("f2".to_string(), "v2".to_string()),
        ];
        assert_eq!(store.hset("k", &pairs), 2);

        // Overwriting f1 adds nothing new; f3 does.
        let pairs = vec![
            ("f1".to_string(), "v9".to_string()),
            ("f3".to_string(), "v3".to_string()),
        ];
        assert_eq!(store.hset("k", &pairs), 1);
        assert_eq!(store.hget("k", "f1"), Some("v9".to_string()));
    }

    #[test]
    fn hget_missing_hash_or_field() {
        let store = Store::new();
        assert_eq!(store.hget("absent", "f"), None);

        store.hset("k", &[("f1".to_string(), "v1".to_string())]);
        assert_eq!(store.hget("k", "f1"), Some("v1".to_string()));
        assert_eq!(store.hget("k", "missing"), None);
    }

    #[test]
    fn hdel_counts_removed() {
        let store = Store::new();
        store.hset(
            "k",
            &[
                ("f1".to_string(), "v1".to_string()),
                ("f2".to_string(), "v2".to_string()),
            ],
        );
        assert_eq!(store.hdel("k", &values(&["f1", "nope"])), 1);
        assert_eq!(store.hdel("absent", &values(&["f1"])), 0);
        assert_eq!(store.hget("k", "f1"), None);
    }

    #[test]
    fn concurrent_writers_on_one_key() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(Store::new());
        let mut handles = Vec::new();

        for t in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    store.set("k", format!("t{}-{}", t, i));
                    // Every read observes some complete write, never a tear.
                    let got = store.get("k").unwrap();
                    assert!(got.starts_with('t'));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
