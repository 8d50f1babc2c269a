use crate::id::{JointId, LineId, ResourceTypeId};

/// Errors that can occur during network operations.
///
/// Identity and line-lookup errors indicate caller bookkeeping bugs and
/// should be propagated, never swallowed. Resource shortfall is not an
/// error anywhere in this crate; partial fulfillment is a normal return
/// value of the request path.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// An operation referenced an unassigned or unknown joint identity.
    #[error("invalid joint reference: {0:?}")]
    InvalidReference(JointId),

    /// A restore tried to insert a joint identity that already exists.
    #[error("joint already registered: {0:?}")]
    DuplicateJoint(JointId),

    /// A line identity passed to the manager does not exist.
    #[error("line not found: {0:?}")]
    UnknownLine(LineId),

    /// A restore tried to create a line at an identity that already exists.
    #[error("line already registered: {0:?}")]
    DuplicateLine(LineId),

    /// A connector was asked for a resource type it does not accept.
    #[error("connector {connector:?} does not accept resource {resource:?}")]
    WrongResourceType {
        connector: JointId,
        resource: ResourceTypeId,
    },

    /// The joint cannot serve as an input connector (wrong role, or not a
    /// connector at all).
    #[error("joint {0:?} cannot serve as an input connector")]
    NotAnInput(JointId),

    /// The joint cannot serve as an output connector (wrong role, or not a
    /// connector at all).
    #[error("joint {0:?} cannot serve as an output connector")]
    NotAnOutput(JointId),

    /// An output connector was asked for resource before its owning
    /// structure bound an ask-callback.
    #[error("no supplier bound for connector {0:?}")]
    UnboundSupplier(JointId),

    /// Linking would push a joint past its connection capacity.
    #[error("joint {0:?} is at its connection capacity")]
    CapacityExceeded(JointId),
}
