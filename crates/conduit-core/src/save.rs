//! Snapshot serialization for the network.
//!
//! A snapshot is the per-joint data needed to rebuild the graph — identity,
//! opaque transform, line membership, adjacency, and the connector record if
//! any — behind a versioned header, encoded with `bitcode`. Record building
//! is independent per joint, so the `parallel` feature fans it out over
//! rayon. Supplier callbacks are not persisted; structures rebind them after
//! a restore.

use crate::connector::ConnectorRole;
use crate::error::NetworkError;
use crate::fixed::Fixed64;
use crate::id::{JointId, LineId, ResourceTypeId, StructureId};
use crate::joint::{Joint, TransformBlob};
use crate::network::ResourceNetwork;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a network snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xC0DD_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while encoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur while decoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Header prepended to every snapshot. Enables format detection and version
/// checking before trusting the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Number of joint records in the payload.
    pub joint_count: u64,
}

impl SnapshotHeader {
    pub fn new(joint_count: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            joint_count,
        }
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(LoadError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(LoadError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// The persisted resource-endpoint half of a connector joint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorRecord {
    pub resource_type: ResourceTypeId,
    pub role: ConnectorRole,
    pub flow_limit: Fixed64,
    pub owner: StructureId,
    pub live: bool,
}

/// One persisted joint: everything needed to rebuild its node in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointRecord {
    pub id: JointId,
    pub transform: TransformBlob,
    pub line_id: Option<LineId>,
    pub max_connections: u32,
    pub adjacency: Vec<JointId>,
    #[serde(default)]
    pub connector: Option<ConnectorRecord>,
}

/// A complete, self-contained network snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub header: SnapshotHeader,
    pub records: Vec<JointRecord>,
}

// ---------------------------------------------------------------------------
// Snapshot / restore
// ---------------------------------------------------------------------------

fn record_for(
    joint: &Joint,
    connectors: &std::collections::HashMap<JointId, crate::connector::Connector>,
) -> JointRecord {
    let connector = connectors.get(&joint.id()).map(|c| ConnectorRecord {
        resource_type: c.resource_type(),
        role: c.role(),
        flow_limit: c.flow_limit(),
        owner: c.owner(),
        live: c.is_live(),
    });
    JointRecord {
        id: joint.id(),
        transform: joint.transform().clone(),
        line_id: joint.line_id(),
        max_connections: joint.max_connections(),
        adjacency: joint.neighbors().to_vec(),
        connector,
    }
}

/// Capture the persistent state of a network. Records come out in ascending
/// identity order so encoding is deterministic.
pub fn snapshot(network: &ResourceNetwork) -> NetworkSnapshot {
    let connectors = &network.connectors;
    #[cfg(feature = "parallel")]
    let mut records: Vec<JointRecord> = {
        use rayon::prelude::*;
        network
            .joints
            .par_iter()
            .map(|(_, joint)| record_for(joint, connectors))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let mut records: Vec<JointRecord> = network
        .joints
        .values()
        .map(|joint| record_for(joint, connectors))
        .collect();

    records.sort_by_key(|r| r.id);
    NetworkSnapshot {
        header: SnapshotHeader::new(records.len() as u64),
        records,
    }
}

/// Encode a snapshot to bytes.
pub fn encode(snapshot: &NetworkSnapshot) -> Result<Vec<u8>, SaveError> {
    bitcode::serialize(snapshot).map_err(|e| SaveError::Encode(e.to_string()))
}

/// Decode and validate a snapshot from bytes.
pub fn decode(data: &[u8]) -> Result<NetworkSnapshot, LoadError> {
    let snapshot: NetworkSnapshot =
        bitcode::deserialize(data).map_err(|e| LoadError::Decode(e.to_string()))?;
    snapshot.header.validate()?;
    Ok(snapshot)
}

/// Rebuild a network from a snapshot: restore every joint, reseed the
/// identity allocator, recreate lines at their persisted ids, and re-emit
/// segment events for the physical layer.
pub fn restore(snapshot: NetworkSnapshot) -> Result<ResourceNetwork, NetworkError> {
    let mut network = ResourceNetwork::new();
    for record in snapshot.records {
        network.restore_joint(record)?;
    }
    network.rebuild_lines()?;
    Ok(network)
}

// ===========================================================================
// Tests
// ===========================================================================
