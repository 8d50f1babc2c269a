//! The network module: owns the joint graph, the connector records, the line
//! registry, and the identity allocator, and runs the connect-time line
//! decision plus the resource request path.
//!
//! Placement collaborators create joints/connectors here and call
//! [`ResourceNetwork::connect`] whenever two joints become physically
//! linked; consumers later draw resource through their input connectors via
//! [`ResourceNetwork::request_resource`].

use crate::connector::{AskForResource, Connector, SupplierRegistry};
use crate::error::NetworkError;
use crate::event::NetworkEvent;
use crate::fixed::Fixed64;
use crate::id::{JointId, JointIdAllocator, LineId, ResourceTypeId};
use crate::joint::{Joint, TransformBlob};
use crate::line::{GatherRequest, Line};
use crate::manager::LineManager;
use crate::save::JointRecord;
use std::collections::{BTreeMap, HashMap};

/// A resource-distribution network: an undirected graph of joints, some of
/// which are typed resource connectors, grouped into lines (connected
/// components) that answer fair-share resource requests.
///
/// Everything is single-threaded and synchronous; each operation runs to
/// completion within the calling frame. Structures hold [`JointId`]s into
/// this module rather than owning joint state, which keeps every
/// cross-reference identity-based and cycle-free.
#[derive(Debug, Default)]
pub struct ResourceNetwork {
    pub(crate) joints: HashMap<JointId, Joint>,
    /// Secondary records keyed by the same ids as `joints`; a joint is a
    /// connector exactly when an entry exists here.
    pub(crate) connectors: HashMap<JointId, Connector>,
    pub(crate) manager: LineManager,
    allocator: JointIdAllocator,
    suppliers: SupplierRegistry,
    events: Vec<NetworkEvent>,
}

impl ResourceNetwork {
    pub fn new() -> Self {
        Self {
            joints: HashMap::new(),
            connectors: HashMap::new(),
            manager: LineManager::new(),
            allocator: JointIdAllocator::new(),
            suppliers: SupplierRegistry::new(),
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Creation and lookup
    // -----------------------------------------------------------------------

    /// Register a plain joint and return its freshly allocated identity.
    pub fn create_joint(&mut self, transform: TransformBlob, max_connections: u32) -> JointId {
        let id = self.allocator.allocate();
        self.joints.insert(id, Joint::new(id, transform, max_connections));
        id
    }

    /// Register a connector (a joint plus its resource-endpoint record) and
    /// return its freshly allocated identity. The connector starts latent.
    pub fn create_connector(
        &mut self,
        transform: TransformBlob,
        max_connections: u32,
        connector: Connector,
    ) -> JointId {
        let id = self.create_joint(transform, max_connections);
        self.connectors.insert(id, connector);
        id
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(&id)
    }

    pub fn connector(&self, id: JointId) -> Option<&Connector> {
        self.connectors.get(&id)
    }

    pub fn is_connector(&self, id: JointId) -> bool {
        self.connectors.contains_key(&id)
    }

    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints.values()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    pub fn lines(&self) -> &LineManager {
        &self.manager
    }

    /// The line a joint currently belongs to, if any.
    pub fn line_of(&self, id: JointId) -> Option<&Line> {
        self.joints
            .get(&id)
            .and_then(|j| j.line_id())
            .and_then(|line| self.manager.line(line))
    }

    pub fn suppliers(&self) -> &SupplierRegistry {
        &self.suppliers
    }

    // -----------------------------------------------------------------------
    // Graph edges
    // -----------------------------------------------------------------------

    /// Add the undirected edge `a -- b`, idempotently: re-linking an
    /// already-linked pair is a no-op and emits nothing.
    ///
    /// Emits [`NetworkEvent::SegmentAdded`] so the physical layer can place
    /// a pipe/wire segment between the two joints.
    pub fn link(&mut self, a: JointId, b: JointId) -> Result<(), NetworkError> {
        if a == b {
            return Err(NetworkError::InvalidReference(b));
        }
        let joint_a = self.joints.get(&a).ok_or(NetworkError::InvalidReference(a))?;
        let joint_b = self.joints.get(&b).ok_or(NetworkError::InvalidReference(b))?;
        if joint_a.is_adjacent_to(b) {
            return Ok(());
        }
        if !joint_a.can_connect() {
            return Err(NetworkError::CapacityExceeded(a));
        }
        if !joint_b.can_connect() {
            return Err(NetworkError::CapacityExceeded(b));
        }
        let a_transform = joint_a.transform().clone();
        let b_transform = joint_b.transform().clone();
        if let Some(joint) = self.joints.get_mut(&a) {
            joint.add_neighbor(b);
        }
        if let Some(joint) = self.joints.get_mut(&b) {
            joint.add_neighbor(a);
        }
        self.events.push(NetworkEvent::SegmentAdded {
            a,
            b,
            a_transform,
            b_transform,
        });
        Ok(())
    }

    /// Remove the edge `a -- b` both ways and signal removal of the
    /// physical segment. Removing a non-existent edge is a no-op.
    ///
    /// Line membership is NOT re-partitioned: removing a cut edge leaves
    /// both halves on the original line. Known gap, kept to match the
    /// connect-driven lifecycle (see DESIGN.md).
    pub fn unlink(&mut self, a: JointId, b: JointId) -> Result<(), NetworkError> {
        let joint_a = self.joints.get(&a).ok_or(NetworkError::InvalidReference(a))?;
        let joint_b = self.joints.get(&b).ok_or(NetworkError::InvalidReference(b))?;
        if !joint_a.is_adjacent_to(b) {
            return Ok(());
        }
        let a_transform = joint_a.transform().clone();
        let b_transform = joint_b.transform().clone();
        if let Some(joint) = self.joints.get_mut(&a) {
            joint.remove_neighbor(b);
        }
        if let Some(joint) = self.joints.get_mut(&b) {
            joint.remove_neighbor(a);
        }
        self.events.push(NetworkEvent::SegmentRemoved {
            a,
            b,
            a_transform,
            b_transform,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lines
    // -----------------------------------------------------------------------

    /// Allocate a fresh, empty line.
    pub fn create_line(&mut self) -> LineId {
        let line = self.manager.create_line();
        self.events.push(NetworkEvent::LineCreated { line });
        line
    }

    /// Register a plain joint as a member of a line.
    pub fn add_joint_to_line(&mut self, line: LineId, joint: JointId) -> Result<(), NetworkError> {
        if !self.manager.contains(line) {
            return Err(NetworkError::UnknownLine(line));
        }
        let member = self
            .joints
            .get_mut(&joint)
            .ok_or(NetworkError::InvalidReference(joint))?;
        member.set_line_id(line);
        if let Some(line) = self.manager.line_mut(line) {
            line.add_joint(joint);
        }
        Ok(())
    }

    /// Register a connector as a member of a line.
    ///
    /// Input-capable connectors are bound to this line's request handler by
    /// membership itself and are activated here; output connectors are
    /// bound to their ask-callback by the owning structure instead, since
    /// only the structure knows how it produces resource.
    pub fn add_connector_to_line(
        &mut self,
        line: LineId,
        joint: JointId,
    ) -> Result<(), NetworkError> {
        if !self.manager.contains(line) {
            return Err(NetworkError::UnknownLine(line));
        }
        if !self.connectors.contains_key(&joint) {
            return Err(NetworkError::InvalidReference(joint));
        }
        let member = self
            .joints
            .get_mut(&joint)
            .ok_or(NetworkError::InvalidReference(joint))?;
        member.set_line_id(line);
        if let Some(line) = self.manager.line_mut(line) {
            line.add_connector(joint);
        }
        if let Some(connector) = self.connectors.get_mut(&joint) {
            if connector.role().consumes() {
                connector.activate();
            }
        }
        Ok(())
    }

    /// Dispatch to [`add_connector_to_line`] or [`add_joint_to_line`]
    /// depending on whether the joint carries a connector record, so callers
    /// can treat both cases uniformly.
    ///
    /// [`add_connector_to_line`]: ResourceNetwork::add_connector_to_line
    /// [`add_joint_to_line`]: ResourceNetwork::add_joint_to_line
    pub fn add_based_on_type(&mut self, line: LineId, joint: JointId) -> Result<(), NetworkError> {
        if self.connectors.contains_key(&joint) {
            self.add_connector_to_line(line, joint)
        } else {
            self.add_joint_to_line(line, joint)
        }
    }

    /// Move every member of `retired` into `into`, reassigning line ids,
    /// and remove `retired` from the registry. Merging a line with itself
    /// is a no-op.
    pub fn merge_lines(&mut self, into: LineId, retired: LineId) -> Result<(), NetworkError> {
        if !self.manager.contains(into) {
            return Err(NetworkError::UnknownLine(into));
        }
        if !self.manager.contains(retired) {
            return Err(NetworkError::UnknownLine(retired));
        }
        if into == retired {
            return Ok(());
        }
        let absorbed = self
            .manager
            .remove_line(retired)
            .ok_or(NetworkError::UnknownLine(retired))?;
        let (joints, connectors) = absorbed.into_members();
        for member in joints {
            self.add_joint_to_line(into, member)?;
        }
        for member in connectors {
            self.add_connector_to_line(into, member)?;
        }
        self.events.push(NetworkEvent::LinesMerged { into, retired });
        Ok(())
    }

    /// Fold a just-added edge into the line bookkeeping. Performs the
    /// (idempotent) [`link`] first, then decides the line-level effect:
    ///
    /// - both on the same line: no-op
    /// - both on different lines: merge
    /// - neither on a line: create a line holding both
    /// - exactly one on a line: add the other to it
    ///
    /// [`link`]: ResourceNetwork::link
    pub fn connect(&mut self, first: JointId, second: JointId) -> Result<(), NetworkError> {
        self.link(first, second)?;
        let first_line = self.joints.get(&first).and_then(|j| j.line_id());
        let second_line = self.joints.get(&second).and_then(|j| j.line_id());
        match (first_line, second_line) {
            (Some(a), Some(b)) if a == b => Ok(()),
            (Some(a), Some(b)) => self.merge_lines(a, b),
            (None, None) => {
                let line = self.create_line();
                self.add_based_on_type(line, first)?;
                self.add_based_on_type(line, second)
            }
            (Some(a), None) => self.add_based_on_type(a, second),
            (None, Some(b)) => self.add_based_on_type(b, first),
        }
    }

    // -----------------------------------------------------------------------
    // Connector lifecycle
    // -----------------------------------------------------------------------

    /// Flip a connector from latent to live. Idempotent: a connector may be
    /// activated both by its structure and by a restore path.
    pub fn activate_connector(&mut self, id: JointId) -> Result<(), NetworkError> {
        let connector = self
            .connectors
            .get_mut(&id)
            .ok_or(NetworkError::InvalidReference(id))?;
        connector.activate();
        Ok(())
    }

    /// Register the ask-callback through which a line pulls resource out of
    /// an output connector's structure. Must target an output-capable
    /// connector.
    pub fn bind_supplier(
        &mut self,
        id: JointId,
        callback: AskForResource,
    ) -> Result<(), NetworkError> {
        let connector = self
            .connectors
            .get(&id)
            .ok_or(NetworkError::InvalidReference(id))?;
        if !connector.role().supplies() {
            return Err(NetworkError::NotAnOutput(id));
        }
        self.suppliers.bind(id, callback);
        Ok(())
    }

    /// Drop a supplier binding. Returns false when none existed.
    pub fn unbind_supplier(&mut self, id: JointId) -> bool {
        self.suppliers.unbind(id)
    }

    // -----------------------------------------------------------------------
    // Resource exchange
    // -----------------------------------------------------------------------

    /// Draw up to `amount` of the input connector's resource type out of its
    /// line, fair-share across eligible sibling outputs.
    ///
    /// Returns the amount actually delivered, in `[0, amount]`; shortfall is
    /// a normal outcome. An input that is latent or not on any line yields
    /// zero. The requested amount is clamped to the input's flow limit.
    pub fn request_resource(
        &mut self,
        input: JointId,
        amount: Fixed64,
    ) -> Result<Fixed64, NetworkError> {
        let connector = self
            .connectors
            .get(&input)
            .ok_or(NetworkError::InvalidReference(input))?;
        if !connector.role().consumes() {
            return Err(NetworkError::NotAnInput(input));
        }
        if !connector.is_live() {
            return Ok(Fixed64::ZERO);
        }
        let joint = self
            .joints
            .get(&input)
            .ok_or(NetworkError::InvalidReference(input))?;
        let Some(line_id) = joint.line_id() else {
            return Ok(Fixed64::ZERO);
        };
        let line = self
            .manager
            .line(line_id)
            .ok_or(NetworkError::UnknownLine(line_id))?;
        let request = GatherRequest {
            resource: connector.resource_type(),
            amount: amount.min(connector.flow_limit()).max(Fixed64::ZERO),
            requester: input,
            owner: connector.owner(),
        };
        Ok(line.gather(request, &self.connectors, &mut self.suppliers))
    }

    /// Ask a single output connector to surrender up to `amount` of
    /// `resource`, bypassing the line. This is the per-connector contract
    /// the line itself uses after filtering candidates; calling it with a
    /// resource the connector does not accept is a contract violation.
    pub fn ask_for_resource(
        &mut self,
        output: JointId,
        resource: ResourceTypeId,
        amount: Fixed64,
    ) -> Result<Fixed64, NetworkError> {
        let connector = self
            .connectors
            .get(&output)
            .ok_or(NetworkError::InvalidReference(output))?;
        if !connector.role().supplies() {
            return Err(NetworkError::NotAnOutput(output));
        }
        if !connector.accepts_resource(resource) {
            return Err(NetworkError::WrongResourceType {
                connector: output,
                resource,
            });
        }
        if !self.suppliers.is_bound(output) {
            return Err(NetworkError::UnboundSupplier(output));
        }
        if !connector.is_live() {
            return Ok(Fixed64::ZERO);
        }
        let asked = amount.min(connector.flow_limit()).max(Fixed64::ZERO);
        Ok(self.suppliers.ask(output, asked))
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Take all buffered events, oldest first.
    pub fn drain_events(&mut self) -> Vec<NetworkEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Restore
    // -----------------------------------------------------------------------

    /// Insert one persisted joint, advancing the identity allocator past it.
    ///
    /// Line membership is rebuilt afterwards by [`rebuild_lines`]; between
    /// the two calls a restored `line_id` may reference a line that does not
    /// exist yet.
    ///
    /// [`rebuild_lines`]: ResourceNetwork::rebuild_lines
    pub fn restore_joint(&mut self, record: JointRecord) -> Result<JointId, NetworkError> {
        if !record.id.is_valid() {
            return Err(NetworkError::InvalidReference(record.id));
        }
        if self.joints.contains_key(&record.id) {
            return Err(NetworkError::DuplicateJoint(record.id));
        }
        let JointRecord {
            id,
            transform,
            line_id,
            max_connections,
            adjacency,
            connector,
        } = record;
        self.allocator.observe(id);
        self.joints.insert(
            id,
            Joint::restore(id, transform, adjacency, line_id, max_connections),
        );
        if let Some(record) = connector {
            self.connectors.insert(
                id,
                Connector::restore(
                    record.resource_type,
                    record.role,
                    record.flow_limit,
                    record.owner,
                    record.live,
                ),
            );
        }
        Ok(id)
    }

    /// Rebuild every line from the persisted `line_id`s of restored joints,
    /// validate adjacency symmetry, and re-emit one
    /// [`NetworkEvent::SegmentAdded`] per persisted edge so the physical
    /// layer can recreate geometry.
    ///
    /// Expects a fresh network populated only through
    /// [`restore_joint`](ResourceNetwork::restore_joint).
    pub fn rebuild_lines(&mut self) -> Result<(), NetworkError> {
        // Every persisted edge must be symmetric and point at a restored joint.
        for (id, joint) in &self.joints {
            for neighbor in joint.neighbors() {
                let other = self
                    .joints
                    .get(neighbor)
                    .ok_or(NetworkError::InvalidReference(*neighbor))?;
                if !other.is_adjacent_to(*id) {
                    return Err(NetworkError::InvalidReference(*neighbor));
                }
            }
        }

        // Group members by their persisted line, deterministically.
        let mut by_line: BTreeMap<LineId, Vec<JointId>> = BTreeMap::new();
        for (id, joint) in &self.joints {
            if let Some(line) = joint.line_id() {
                by_line.entry(line).or_default().push(*id);
            }
        }
        for (line, mut members) in by_line {
            members.sort();
            self.manager.create_line_at(line)?;
            for member in members {
                self.add_based_on_type(line, member)?;
            }
        }

        // One segment event per undirected edge.
        let mut edges: Vec<(JointId, JointId)> = Vec::new();
        for (id, joint) in &self.joints {
            for neighbor in joint.neighbors() {
                if *id < *neighbor {
                    edges.push((*id, *neighbor));
                }
            }
        }
        edges.sort();
        for (a, b) in edges {
            let a_transform = self.joints[&a].transform().clone();
            let b_transform = self.joints[&b].transform().clone();
            self.events.push(NetworkEvent::SegmentAdded {
                a,
                b,
                a_transform,
                b_transform,
            });
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
