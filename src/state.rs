//! Per-call tracking state shared by the folder and the aggregator.
//!
//! Every conversion allocates its own tables, so nothing here is shared
//! across calls.

use std::collections::{HashMap, HashSet};

/// Tool-call correlation keyed by call id.
#[derive(Debug, Clone)]
pub struct CorrelationTable<V> {
    entries: HashMap<String, V>,
}

impl<V> Default for CorrelationTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CorrelationTable<V> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert unless the id is already known. Returns `false` for duplicates.
    pub fn register(&mut self, call_id: impl Into<String>, value: V) -> bool {
        use std::collections::hash_map::Entry;

        match self.entries.entry(call_id.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// Insert or replace, returning the previous entry.
    pub fn upsert(&mut self, call_id: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(call_id.into(), value)
    }

    /// Entry for `call_id`, if registered.
    pub fn get(&self, call_id: &str) -> Option<&V> {
        self.entries.get(call_id)
    }

    /// Whether `call_id` has been registered.
    pub fn contains(&self, call_id: &str) -> bool {
        self.entries.contains_key(call_id)
    }

    /// Number of registered calls.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no call has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Open stream ids, remembered in the order they were opened.
#[derive(Debug, Clone, Default)]
pub struct StreamIdSet {
    open: HashSet<String>,
    order: Vec<String>,
}

impl StreamIdSet {
    /// Create a set with nothing open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` open. Returns `true` only the first time.
    pub fn open(&mut self, id: &str) -> bool {
        if self.open.contains(id) {
            return false;
        }
        self.open.insert(id.to_string());
        self.order.push(id.to_string());
        true
    }

    /// Whether `id` is currently open.
    pub fn is_open(&self, id: &str) -> bool {
        self.open.contains(id)
    }

    /// Close a single id. Returns `false` if it was not open.
    pub fn close(&mut self, id: &str) -> bool {
        if !self.open.remove(id) {
            return false;
        }
        self.order.retain(|open| open != id);
        true
    }

    /// Close everything, yielding ids in open order.
    pub fn close_all(&mut self) -> Vec<String> {
        self.open.clear();
        std::mem::take(&mut self.order)
    }

    /// Number of open ids.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is open.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_keeps_first_entry() {
        let mut table = CorrelationTable::new();
        assert!(table.register("c1", 1));
        assert!(!table.register("c1", 2));
        assert_eq!(table.get("c1"), Some(&1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn upsert_replaces_entry() {
        let mut table = CorrelationTable::new();
        assert_eq!(table.upsert("c1", "a"), None);
        assert_eq!(table.upsert("c1", "b"), Some("a"));
        assert_eq!(table.get("c1"), Some(&"b"));
    }

    #[test]
    fn stream_ids_open_once() {
        let mut ids = StreamIdSet::new();
        assert!(ids.open("a"));
        assert!(!ids.open("a"));
        assert!(ids.is_open("a"));
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn close_all_preserves_open_order() {
        let mut ids = StreamIdSet::new();
        ids.open("b");
        ids.open("a");
        ids.open("c");
        assert!(ids.close("a"));
        assert_eq!(ids.close_all(), vec!["b".to_string(), "c".to_string()]);
        assert!(ids.is_empty());
        assert!(ids.open("b"));
    }
}
