//! Tracks the GPU-side resources owned by scene objects.
//!
//! Every geometry buffer and material instance registers an id here when it is
//! created and releases it when it is disposed, so a leak shows up as a live
//! id that no node in the scene refers to.
//!
//! # Examples
//! ```
//! use objzip::scene::resources::{ResourceKind, ResourceTracker};
//!
//! let mut tracker = ResourceTracker::new();
//! let id = tracker.allocate(ResourceKind::Geometry);
//! assert!(tracker.is_live(id));
//! assert!(tracker.release(id));
//! assert!(!tracker.release(id));
//! assert_eq!(tracker.live_count(), 0);
//! ```

use std::collections::BTreeMap;

/// Opaque handle to a tracked resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Geometry,
    Material,
}

/// Registry of live resource ids.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    next: u64,
    live: BTreeMap<ResourceId, ResourceKind>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new resource and returns its id. Ids are never reused.
    pub fn allocate(&mut self, kind: ResourceKind) -> ResourceId {
        self.next += 1;
        let id = ResourceId(self.next);
        self.live.insert(id, kind);
        id
    }

    /// Releases a resource. Returns false if it was not live.
    pub fn release(&mut self, id: ResourceId) -> bool {
        self.live.remove(&id).is_some()
    }

    pub fn is_live(&self, id: ResourceId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Counts live resources of one kind.
    pub fn live_count_of(&self, kind: ResourceKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    /// Returns every live id in allocation order.
    pub fn live_ids(&self) -> Vec<ResourceId> {
        self.live.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_counted_by_kind() {
        let mut tracker = ResourceTracker::new();
        let a = tracker.allocate(ResourceKind::Geometry);
        let b = tracker.allocate(ResourceKind::Material);
        let c = tracker.allocate(ResourceKind::Material);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(tracker.live_count_of(ResourceKind::Material), 2);
        assert_eq!(tracker.live_count_of(ResourceKind::Geometry), 1);

        tracker.release(b);
        let d = tracker.allocate(ResourceKind::Material);
        assert_ne!(b, d);
        assert_eq!(tracker.live_ids(), vec![a, c, d]);
    }
}
