//! Cheat slots

use std::collections::BTreeMap;

/// One cheat slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheatEntry {
    pub index: u32,
    pub enabled: bool,
    pub code: String,
}

/// Indexed cheat slots, upserted by `set_cheat` and cleared by `reset_cheat`
///
/// Only storage lives here; what a code means is up to the core.
#[derive(Debug, Clone, Default)]
pub struct CheatTable {
    entries: BTreeMap<u32, CheatEntry>,
}

impl CheatTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the slot at `index`
    pub fn set(&mut self, index: u32, enabled: bool, code: &str) {
        tracing::debug!("Cheat {}: enabled={} code={:?}", index, enabled, code);
        self.entries.insert(
            index,
            CheatEntry {
                index,
                enabled,
                code: code.to_string(),
            },
        );
    }

    /// Drop every slot
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, index: u32) -> Option<&CheatEntry> {
        self.entries.get(&index)
    }

    /// Enabled slots in index order
    pub fn active(&self) -> impl Iterator<Item = &CheatEntry> {
        self.entries.values().filter(|e| e.enabled)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert() {
        let mut table = CheatTable::new();
        table.set(3, true, "A");
        table.set(3, false, "B");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(3).unwrap().code, "B");
        assert_eq!(table.active().count(), 0);
    }

    #[test]
    fn test_reset_clears_active() {
        let mut table = CheatTable::new();
        table.set(0, true, "00XX0000");
        table.set(1, true, "0010:FF");
        assert_eq!(table.active().count(), 2);

        table.reset();
        assert!(table.is_empty());
        assert_eq!(table.active().count(), 0);
    }

    #[test]
    fn test_active_in_index_order() {
        let mut table = CheatTable::new();
        table.set(9, true, "late");
        table.set(2, true, "early");
        table.set(5, false, "off");
        let codes: Vec<_> = table.active().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["early", "late"]);
    }
}
