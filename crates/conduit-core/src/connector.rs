use crate::fixed::Fixed64;
use crate::id::{JointId, ResourceTypeId, StructureId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Which direction a connector moves resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorRole {
    /// Draws resource from the line on behalf of a consumer.
    Input,
    /// Surrenders resource to the line on behalf of a producer.
    Output,
    /// Acts as both an input and an output.
    Both,
}

impl ConnectorRole {
    /// Whether this role can draw resource from a line.
    pub fn consumes(self) -> bool {
        matches!(self, ConnectorRole::Input | ConnectorRole::Both)
    }

    /// Whether this role can be asked for resource by a line.
    pub fn supplies(self) -> bool {
        matches!(self, ConnectorRole::Output | ConnectorRole::Both)
    }
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// The resource-endpoint record of a joint.
///
/// Stored in a secondary map keyed by the same [`JointId`] as the joint
/// itself; a joint is a connector exactly when such a record exists.
/// Connectors start latent (placed but not finalized) and become live on
/// activation. Only live connectors take part in resource exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    resource_type: ResourceTypeId,
    role: ConnectorRole,
    /// Cap on how much a single request/ask can move. Literal: a zero-limit
    /// connector moves nothing.
    flow_limit: Fixed64,
    owner: StructureId,
    live: bool,
}

impl Connector {
    /// A latent connector. Activation happens when the owning structure is
    /// finalized, or when the connector is added to a line as an input.
    pub fn new(
        resource_type: ResourceTypeId,
        role: ConnectorRole,
        flow_limit: Fixed64,
        owner: StructureId,
    ) -> Self {
        Self {
            resource_type,
            role,
            flow_limit,
            owner,
            live: false,
        }
    }

    pub(crate) fn restore(
        resource_type: ResourceTypeId,
        role: ConnectorRole,
        flow_limit: Fixed64,
        owner: StructureId,
        live: bool,
    ) -> Self {
        Self {
            resource_type,
            role,
            flow_limit,
            owner,
            live,
        }
    }

    pub fn resource_type(&self) -> ResourceTypeId {
        self.resource_type
    }

    pub fn role(&self) -> ConnectorRole {
        self.role
    }

    pub fn flow_limit(&self) -> Fixed64 {
        self.flow_limit
    }

    pub fn owner(&self) -> StructureId {
        self.owner
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Pure predicate: does this connector carry the given resource kind?
    pub fn accepts_resource(&self, resource: ResourceTypeId) -> bool {
        self.resource_type == resource
    }

    /// Latent -> live. Idempotent: a connector may be activated both by its
    /// structure and by a persistence-restore path.
    pub(crate) fn activate(&mut self) {
        self.live = true;
    }
}

// ---------------------------------------------------------------------------
// Supplier registry
// ---------------------------------------------------------------------------

/// Ask-callback a producing structure registers for an output connector.
/// Receives the amount the line wants and returns the amount actually
/// surrendered, in `[0, asked]`.
pub type AskForResource = Box<dyn FnMut(Fixed64) -> Fixed64>;

/// Ask-callbacks keyed by connector identity.
///
/// Not serialized: structures rebind their callbacks after a restore, the
/// same way they bind them on first activation.
#[derive(Default)]
pub struct SupplierRegistry {
    callbacks: HashMap<JointId, AskForResource>,
}

impl SupplierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the ask-callback for a connector, replacing any previous one.
    pub fn bind(&mut self, id: JointId, callback: AskForResource) {
        self.callbacks.insert(id, callback);
    }

    /// Drop a binding. Returns false when none existed.
    pub fn unbind(&mut self, id: JointId) -> bool {
        self.callbacks.remove(&id).is_some()
    }

    pub fn is_bound(&self, id: JointId) -> bool {
        self.callbacks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Ask a bound supplier for resource. Unbound connectors yield nothing;
    /// the request path filters them out of candidate sets beforehand.
    pub(crate) fn ask(&mut self, id: JointId, amount: Fixed64) -> Fixed64 {
        match self.callbacks.get_mut(&id) {
            Some(callback) => callback(amount),
            None => Fixed64::ZERO,
        }
    }
}

impl fmt::Debug for SupplierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplierRegistry")
            .field("bound", &self.callbacks.len())
            .finish()
    }
}
