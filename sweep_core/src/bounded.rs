//! Fixed-capacity ordered path collection.

use std::path::{Path, PathBuf};

/// Outcome of a [`BoundedPathSet::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Insert {
    /// The path was added and there is room left.
    Added,
    /// The path was added and the set is now at capacity.
    Filled,
    /// The path was already present; nothing changed.
    Duplicate,
    /// The set is at capacity; the path was not added.
    Rejected,
}

/// An ordered set of paths with a hard capacity.
///
/// Insertion order is preserved and duplicates are ignored. The insertion
/// that reaches the capacity is reported as [`Insert::Filled`] so callers
/// can stop producing paths right away instead of checking a flag after
/// the fact.
#[derive(Debug)]
pub(crate) struct BoundedPathSet {
    paths: Vec<PathBuf>,
    capacity: usize,
}

impl BoundedPathSet {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            paths: Vec::new(),
            capacity,
        }
    }

    pub(crate) fn insert(&mut self, path: PathBuf) -> Insert {
        if self.paths.len() >= self.capacity {
            return Insert::Rejected;
        }
        if self.contains(&path) {
            return Insert::Duplicate;
        }
        self.paths.push(path);
        if self.paths.len() == self.capacity {
            Insert::Filled
        } else {
            Insert::Added
        }
    }

    /// Linear scan; the capacity is small (16 in practice).
    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|recorded| recorded == path)
    }

    /// Remove a path, keeping the order of the remaining entries.
    pub(crate) fn remove(&mut self, path: &Path) -> bool {
        match self.paths.iter().position(|recorded| recorded == path) {
            Some(index) => {
                self.paths.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.paths.len() >= self.capacity
    }

    pub(crate) fn into_vec(self) -> Vec<PathBuf> {
        self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_insertion_order() {
        let mut set = BoundedPathSet::new(4);
        assert_eq!(set.insert(PathBuf::from("/b")), Insert::Added);
        assert_eq!(set.insert(PathBuf::from("/a")), Insert::Added);
        assert_eq!(set.insert(PathBuf::from("/c")), Insert::Added);
        assert_eq!(
            set.into_vec(),
            vec![
                PathBuf::from("/b"),
                PathBuf::from("/a"),
                PathBuf::from("/c")
            ]
        );
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let mut set = BoundedPathSet::new(4);
        assert_eq!(set.insert(PathBuf::from("/a")), Insert::Added);
        assert_eq!(set.insert(PathBuf::from("/a")), Insert::Duplicate);
        assert_eq!(set.into_vec().len(), 1);
    }

    #[test]
    fn test_filling_insert_is_signaled_once() {
        let mut set = BoundedPathSet::new(2);
        assert_eq!(set.insert(PathBuf::from("/a")), Insert::Added);
        assert!(!set.is_full());
        assert_eq!(set.insert(PathBuf::from("/b")), Insert::Filled);
        assert!(set.is_full());
        assert_eq!(set.insert(PathBuf::from("/c")), Insert::Rejected);
        assert_eq!(set.into_vec().len(), 2);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut set = BoundedPathSet::new(4);
        set.insert(PathBuf::from("/a"));
        set.insert(PathBuf::from("/b"));
        set.insert(PathBuf::from("/c"));
        assert!(set.remove(Path::new("/b")));
        assert!(!set.remove(Path::new("/b")));
        assert_eq!(
            set.into_vec(),
            vec![PathBuf::from("/a"), PathBuf::from("/c")]
        );
    }

    #[test]
    fn test_contains_and_empty() {
        let mut set = BoundedPathSet::new(2);
        assert!(set.is_empty());
        set.insert(PathBuf::from("/a"));
        assert!(!set.is_empty());
        assert!(set.contains(Path::new("/a")));
        assert!(!set.contains(Path::new("/b")));
    }
}
