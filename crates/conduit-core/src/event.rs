//! Events emitted by the network for its physical/render collaborators.
//!
//! Operations push events into the owning [`ResourceNetwork`]'s buffer;
//! callers drain them once per frame via
//! [`ResourceNetwork::drain_events`] and translate segment events into
//! geometry. Transforms are opaque to this crate and merely passed through.
//!
//! [`ResourceNetwork`]: crate::network::ResourceNetwork
//! [`ResourceNetwork::drain_events`]: crate::network::ResourceNetwork::drain_events

use crate::id::{JointId, LineId};
use crate::joint::TransformBlob;

/// A topology event. Segment events fire once per edge, never for
/// idempotent re-links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    /// A physical segment (pipe, wire) should be instantiated between two
    /// joints.
    SegmentAdded {
        a: JointId,
        b: JointId,
        a_transform: TransformBlob,
        b_transform: TransformBlob,
    },
    /// The physical segment between two joints should be removed.
    SegmentRemoved {
        a: JointId,
        b: JointId,
        a_transform: TransformBlob,
        b_transform: TransformBlob,
    },
    /// A new line came into existence.
    LineCreated { line: LineId },
    /// `retired` was absorbed into `into` and no longer exists.
    LinesMerged { into: LineId, retired: LineId },
}
