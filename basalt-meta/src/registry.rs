//! Weak, name-indexed table registry.

use std::sync::{Arc, RwLock, Weak};

use rustc_hash::FxHashMap;

use crate::table::Table;

/// Process-wide lookup of enrolled tables by name.
///
/// The registry does not own tables: it holds weak handles, so an enrolled
/// table lives exactly as long as the blocks (or callers) that reference it.
/// Enrollment is idempotent: the first live writer wins on a name
/// collision, and later enrollments under the same name are no-ops.
#[derive(Debug, Default)]
pub struct TableRegistry {
    inner: RwLock<FxHashMap<String, Weak<Table>>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enroll a table under its name. Returns `true` when this call
    /// registered the handle, `false` when a live table already held the
    /// name.
    pub fn enroll(&self, table: &Arc<Table>) -> bool {
        let mut map = self.inner.write().expect("table registry lock poisoned");
        if let Some(existing) = map.get(table.name())
            && existing.upgrade().is_some()
        {
            return false;
        }
        map.insert(table.name().to_string(), Arc::downgrade(table));
        true
    }

    /// Look up a live table by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<Table>> {
        let map = self.inner.read().expect("table registry lock poisoned");
        map.get(name).and_then(Weak::upgrade)
    }

    /// Drop entries whose tables are gone; returns the number of live
    /// entries left.
    pub fn prune(&self) -> usize {
        let mut map = self.inner.write().expect("table registry lock poisoned");
        map.retain(|_, weak| weak.upgrade().is_some());
        map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_types::schema::Schema;

    fn table(name: &str) -> Arc<Table> {
        Arc::new(Table::new(
            name,
            Arc::new(Schema::parse("ROW<id:int>").unwrap()),
            Default::default(),
        ))
    }

    #[test]
    fn enroll_is_idempotent_first_writer_wins() {
        let registry = TableRegistry::new();
        let first = table("t");
        let second = table("t");

        assert!(registry.enroll(&first));
        assert!(!registry.enroll(&second));
        assert!(Arc::ptr_eq(&registry.lookup("t").unwrap(), &first));
    }

    #[test]
    fn registry_does_not_keep_tables_alive() {
        let registry = TableRegistry::new();
        let t = table("t");
        registry.enroll(&t);
        drop(t);

        assert!(registry.lookup("t").is_none());
        assert_eq!(registry.prune(), 0);

        // the name is free again
        let again = table("t");
        assert!(registry.enroll(&again));
        assert!(registry.lookup("t").is_some());
    }
}
