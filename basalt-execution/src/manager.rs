//! Process-wide registry of installed blocks.

use std::sync::{Arc, RwLock};

use basalt_meta::BlockSignature;
use rustc_hash::FxHashMap;

use crate::block::BatchBlock;

/// Time/spec predicate for [`BlockManager::enumerate`].
#[derive(Debug, Clone, Default)]
pub struct BlockFilter {
    window: Option<(i64, i64)>,
    spec: Option<String>,
}

impl BlockFilter {
    /// Match every block of the table.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict to blocks whose time range intersects `[start, end]`.
    pub fn in_window(mut self, start: i64, end: i64) -> Self {
        self.window = Some((start, end));
        self
    }

    /// Restrict to blocks produced by one spec.
    pub fn for_spec(mut self, spec: impl Into<String>) -> Self {
        self.spec = Some(spec.into());
        self
    }

    fn matches(&self, signature: &BlockSignature) -> bool {
        if let Some((start, end)) = self.window
            && !signature.overlaps(start, end)
        {
            return false;
        }
        match &self.spec {
            Some(spec) => signature.spec == *spec,
            None => true,
        }
    }
}

/// Shared registry serving installed blocks to the query layer.
///
/// All mutation happens under one write lock, so an enumeration sees either
/// all of a call's blocks or none of them. [`BlockManager::swap`] performs
/// the Swap loader's remove-then-install under a single guard for the same
/// reason: readers never observe the intermediate state.
#[derive(Default)]
pub struct BlockManager {
    inner: RwLock<FxHashMap<String, Vec<Arc<BatchBlock>>>>,
}

impl BlockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install blocks additively. A block whose signature is already
    /// installed overwrites the previous holder of that signature.
    pub fn add(&self, blocks: Vec<BatchBlock>) {
        let mut map = self.inner.write().expect("block manager lock poisoned");
        for block in blocks {
            Self::install(&mut map, Arc::new(block));
        }
    }

    /// Remove every installed block sharing `(table, spec)` with the given
    /// signature; returns how many were dropped.
    pub fn remove_same_spec(&self, signature: &BlockSignature) -> usize {
        let mut map = self.inner.write().expect("block manager lock poisoned");
        Self::evict_same_spec(&mut map, signature)
    }

    /// Replace all same-spec blocks with `blocks`, atomically with respect
    /// to concurrent enumerations.
    pub fn swap(&self, blocks: Vec<BatchBlock>) {
        let mut map = self.inner.write().expect("block manager lock poisoned");
        for block in &blocks {
            Self::evict_same_spec(&mut map, block.signature());
        }
        for block in blocks {
            Self::install(&mut map, Arc::new(block));
        }
    }

    /// Blocks of `table` matching `filter`, in installation order.
    pub fn enumerate(&self, table: &str, filter: &BlockFilter) -> Vec<Arc<BatchBlock>> {
        let map = self.inner.read().expect("block manager lock poisoned");
        map.get(table)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| filter.matches(b.signature()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Names of tables with at least one installed block.
    pub fn tables(&self) -> Vec<String> {
        let map = self.inner.read().expect("block manager lock poisoned");
        map.keys().cloned().collect()
    }

    /// Total installed block count.
    pub fn blocks(&self) -> usize {
        let map = self.inner.read().expect("block manager lock poisoned");
        map.values().map(Vec::len).sum()
    }

    /// Total rows across installed blocks.
    pub fn rows(&self) -> usize {
        let map = self.inner.read().expect("block manager lock poisoned");
        map.values().flatten().map(|b| b.rows()).sum()
    }

    /// Total bytes across installed blocks.
    pub fn memory(&self) -> usize {
        let map = self.inner.read().expect("block manager lock poisoned");
        map.values().flatten().map(|b| b.memory()).sum()
    }

    fn install(map: &mut FxHashMap<String, Vec<Arc<BatchBlock>>>, block: Arc<BatchBlock>) {
        let slot = map.entry(block.signature().table.clone()).or_default();
        match slot
            .iter_mut()
            .find(|b| b.signature() == block.signature())
        {
            Some(existing) => *existing = block,
            None => slot.push(block),
        }
    }

    fn evict_same_spec(
        map: &mut FxHashMap<String, Vec<Arc<BatchBlock>>>,
        signature: &BlockSignature,
    ) -> usize {
        match map.get_mut(&signature.table) {
            Some(blocks) => {
                let before = blocks.len();
                blocks.retain(|b| !b.signature().same_spec(signature));
                before - blocks.len()
            }
            None => 0,
        }
    }
}
