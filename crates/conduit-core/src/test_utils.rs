//! Shared test helpers for unit, integration, and property tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so the helpers
//! are available to this crate's tests and, via the `test-utils` feature,
//! to downstream crates' test suites.

use crate::connector::{AskForResource, Connector, ConnectorRole};
use crate::fixed::Fixed64;
use crate::id::{JointId, ResourceTypeId, StructureId};
use crate::joint::TransformBlob;
use crate::network::ResourceNetwork;
use std::cell::RefCell;
use std::rc::Rc;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Resource types
// ===========================================================================

pub fn energy() -> ResourceTypeId {
    ResourceTypeId(0)
}
pub fn water() -> ResourceTypeId {
    ResourceTypeId(1)
}
pub fn oxygen() -> ResourceTypeId {
    ResourceTypeId(2)
}

pub fn owner(n: u64) -> StructureId {
    StructureId(n)
}

// ===========================================================================
// Network builders
// ===========================================================================

pub const TEST_CAPACITY: u32 = 8;

pub fn add_plain_joint(net: &mut ResourceNetwork) -> JointId {
    net.create_joint(TransformBlob::default(), TEST_CAPACITY)
}

pub fn add_output(
    net: &mut ResourceNetwork,
    resource: ResourceTypeId,
    owner: StructureId,
    flow_limit: f64,
) -> JointId {
    net.create_connector(
        TransformBlob::default(),
        TEST_CAPACITY,
        Connector::new(resource, ConnectorRole::Output, fixed(flow_limit), owner),
    )
}

pub fn add_input(
    net: &mut ResourceNetwork,
    resource: ResourceTypeId,
    owner: StructureId,
    flow_limit: f64,
) -> JointId {
    net.create_connector(
        TransformBlob::default(),
        TEST_CAPACITY,
        Connector::new(resource, ConnectorRole::Input, fixed(flow_limit), owner),
    )
}

// ===========================================================================
// Suppliers
// ===========================================================================

/// A supplier drawing from a shared finite pool. Returns the pool handle so
/// tests can inspect what is left.
pub fn pooled_supplier(initial: f64) -> (Rc<RefCell<Fixed64>>, AskForResource) {
    let pool = Rc::new(RefCell::new(fixed(initial)));
    let handle = Rc::clone(&pool);
    let callback = Box::new(move |amount: Fixed64| {
        let mut remaining = handle.borrow_mut();
        let granted = amount.max(Fixed64::ZERO).min(*remaining);
        *remaining -= granted;
        granted
    });
    (pool, callback)
}

/// A supplier that always grants exactly what it is asked for.
pub fn unlimited_supplier() -> AskForResource {
    Box::new(|amount| amount)
}

/// An output connector on `net` already activated and backed by a finite
/// pool; the common shape for protocol tests.
pub fn pooled_output(
    net: &mut ResourceNetwork,
    resource: ResourceTypeId,
    who: StructureId,
    pool: f64,
) -> (JointId, Rc<RefCell<Fixed64>>) {
    let id = add_output(net, resource, who, 1_000_000.0);
    let (handle, callback) = pooled_supplier(pool);
    net.bind_supplier(id, callback).expect("bind supplier");
    net.activate_connector(id).expect("activate");
    (id, handle)
}
