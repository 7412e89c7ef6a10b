//! Name interning for marker and thread names
//!
//! Names are assigned sequential ids in first-seen order, starting at 0.
//! There is no removal; ids stay valid for the lifetime of the interner.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Stable small-integer identifier for an interned name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NameId(u32);

impl NameId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bidirectional name table: string → id and id → string
#[derive(Debug, Clone, Default)]
pub struct NameInterner {
    names: Vec<String>,
    ids: HashMap<String, NameId>,
}

impl NameInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, allocating the next sequential id on first sight
    pub fn intern(&mut self, name: &str) -> NameId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = NameId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Look up an already interned name without allocating
    pub fn get(&self, name: &str) -> Option<NameId> {
        self.ids.get(name).copied()
    }

    /// Reverse lookup
    pub fn resolve(&self, id: NameId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in id order
    pub fn iter(&self) -> impl Iterator<Item = (NameId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (NameId(i as u32), name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_sequential_from_zero() {
        let mut names = NameInterner::new();
        assert_eq!(names.intern("Update").index(), 0);
        assert_eq!(names.intern("Render").index(), 1);
        assert_eq!(names.intern("GC.Alloc").index(), 2);
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_intern_is_stable() {
        let mut names = NameInterner::new();
        let first = names.intern("Update");
        names.intern("Render");
        assert_eq!(names.intern("Update"), first);
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_resolve_and_get() {
        let mut names = NameInterner::new();
        let id = names.intern("GC.Alloc");
        assert_eq!(names.resolve(id), Some("GC.Alloc"));
        assert_eq!(names.get("GC.Alloc"), Some(id));
        assert_eq!(names.get("missing"), None);
    }

    #[test]
    fn test_empty_interner() {
        let names = NameInterner::new();
        assert!(names.is_empty());
        assert_eq!(names.iter().count(), 0);
    }

    #[test]
    fn test_iter_in_first_seen_order() {
        let mut names = NameInterner::new();
        names.intern("b");
        names.intern("a");
        names.intern("b");
        let collected: Vec<_> = names.iter().map(|(_, n)| n).collect();
        assert_eq!(collected, vec!["b", "a"]);
    }
}
