use serde::{Deserialize, Serialize};

/// Identifies a joint (connection point) in the network graph.
///
/// Stable and monotonically increasing within the owning [`ResourceNetwork`];
/// the zero value is reserved to mean "unassigned" and never handed out by
/// the allocator. Identities survive serialization round-trips, so restoring
/// a saved network recreates identical edges.
///
/// [`ResourceNetwork`]: crate::network::ResourceNetwork
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JointId(pub u64);

impl JointId {
    /// The reserved "unassigned" identity.
    pub const INVALID: JointId = JointId(0);

    /// Whether this identity has been assigned by an allocator.
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Identifies a line (connected component) within its manager. Cheap to copy
/// and compare. Retired on merge; reused only through explicit restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineId(pub u32);

/// Identifies a resource kind (energy, water, ...) carried by connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceTypeId(pub u32);

/// Identifies the structure (building) that owns a connector. Used to keep a
/// structure from satisfying its own demand through a loopback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructureId(pub u64);

/// Allocates [`JointId`]s from a monotonic per-network counter starting at 1.
///
/// Identities are never reused. After a bulk restore, [`observe`] must have
/// been called with every restored identity so that new allocations never
/// collide with persisted ones.
///
/// [`observe`]: JointIdAllocator::observe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointIdAllocator {
    next: u64,
}

impl Default for JointIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl JointIdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Hand out the next identity.
    pub fn allocate(&mut self) -> JointId {
        let id = JointId(self.next);
        self.next += 1;
        id
    }

    /// Advance the counter past a restored identity.
    pub fn observe(&mut self, id: JointId) {
        if id.0 >= self.next {
            self.next = id.0 + 1;
        }
    }
}
