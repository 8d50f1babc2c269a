use crate::id::{JointId, LineId};
use serde::{Deserialize, Serialize};

/// Opaque positional/transform data attached to a joint.
///
/// The network never inspects this beyond echoing it in segment events and
/// persisting it; the placement and render collaborators own its meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformBlob(pub Vec<u8>);

/// A node in the network graph: a connection point for pipes or wires.
///
/// Joints are stored in the owning [`ResourceNetwork`]'s identity-keyed map;
/// all cross-references (adjacency, line membership) are by identity, never
/// by direct ownership.
///
/// Invariants upheld by the network: adjacency is symmetric and duplicate
/// free, `adjacency.len() <= max_connections`, and `line_id` is set exactly
/// when the joint is registered in one line's membership.
///
/// [`ResourceNetwork`]: crate::network::ResourceNetwork
#[derive(Debug, Clone)]
pub struct Joint {
    id: JointId,
    transform: TransformBlob,
    adjacency: Vec<JointId>,
    line_id: Option<LineId>,
    max_connections: u32,
}

impl Joint {
    pub(crate) fn new(id: JointId, transform: TransformBlob, max_connections: u32) -> Self {
        Self {
            id,
            transform,
            adjacency: Vec::new(),
            line_id: None,
            max_connections,
        }
    }

    pub(crate) fn restore(
        id: JointId,
        transform: TransformBlob,
        adjacency: Vec<JointId>,
        line_id: Option<LineId>,
        max_connections: u32,
    ) -> Self {
        Self {
            id,
            transform,
            adjacency,
            line_id,
            max_connections,
        }
    }

    pub fn id(&self) -> JointId {
        self.id
    }

    pub fn transform(&self) -> &TransformBlob {
        &self.transform
    }

    /// Identities of the joints this one shares an edge with.
    pub fn neighbors(&self) -> &[JointId] {
        &self.adjacency
    }

    pub fn line_id(&self) -> Option<LineId> {
        self.line_id
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }

    pub fn is_adjacent_to(&self, other: JointId) -> bool {
        self.adjacency.contains(&other)
    }

    pub fn is_on_line(&self) -> bool {
        self.line_id.is_some()
    }

    /// Whether another edge fits under the connection capacity.
    pub fn can_connect(&self) -> bool {
        (self.adjacency.len() as u32) < self.max_connections
    }

    pub(crate) fn set_line_id(&mut self, line: LineId) {
        self.line_id = Some(line);
    }

    /// Half-edge add. Returns false when the neighbor was already present.
    pub(crate) fn add_neighbor(&mut self, other: JointId) -> bool {
        if self.adjacency.contains(&other) {
            return false;
        }
        self.adjacency.push(other);
        true
    }

    /// Half-edge removal. Returns false when no such neighbor existed.
    pub(crate) fn remove_neighbor(&mut self, other: JointId) -> bool {
        let before = self.adjacency.len();
        self.adjacency.retain(|n| *n != other);
        self.adjacency.len() != before
    }
}
