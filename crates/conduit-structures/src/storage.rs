use crate::store::ResourceStore;
use conduit_core::error::NetworkError;
use conduit_core::fixed::Fixed64;
use conduit_core::id::JointId;
use conduit_core::network::ResourceNetwork;
use std::cell::RefCell;
use std::rc::Rc;

/// A storage structure: buffers one resource between its input and output
/// connectors.
///
/// On activation the store's `take` becomes the ask-callback of every output
/// connector, so sibling consumers on the line can drain it; the host calls
/// [`pump`](Storage::pump) at its own cadence to fill the store through the
/// inputs. The network stays unaware of how the amount is held.
#[derive(Debug)]
pub struct Storage {
    store: Rc<RefCell<ResourceStore>>,
    inputs: Vec<JointId>,
    outputs: Vec<JointId>,
    pull_rate: Fixed64,
}

impl Storage {
    pub fn new(store: ResourceStore, pull_rate: Fixed64) -> Self {
        Self {
            store: Rc::new(RefCell::new(store)),
            inputs: Vec::new(),
            outputs: Vec::new(),
            pull_rate,
        }
    }

    pub fn add_input(&mut self, connector: JointId) {
        self.inputs.push(connector);
    }

    pub fn add_output(&mut self, connector: JointId) {
        self.outputs.push(connector);
    }

    /// Shared handle to the internal store.
    pub fn store(&self) -> Rc<RefCell<ResourceStore>> {
        Rc::clone(&self.store)
    }

    pub fn amount(&self) -> Fixed64 {
        self.store.borrow().amount()
    }

    /// Bind every output to the store and flip all connectors live. Called
    /// when the owning building is placed.
    pub fn activate(&self, net: &mut ResourceNetwork) -> Result<(), NetworkError> {
        for &output in &self.outputs {
            let store = Rc::clone(&self.store);
            net.bind_supplier(output, Box::new(move |amount| store.borrow_mut().take(amount)))?;
            net.activate_connector(output)?;
        }
        for &input in &self.inputs {
            net.activate_connector(input)?;
        }
        Ok(())
    }

    /// One input cycle: unless full, request up to `pull_rate` through every
    /// line-connected input and deposit what arrives. Returns the total
    /// deposited.
    pub fn pump(&self, net: &mut ResourceNetwork) -> Result<Fixed64, NetworkError> {
        let mut deposited = Fixed64::ZERO;
        if self.store.borrow().is_full() {
            return Ok(deposited);
        }
        for &input in &self.inputs {
            let connected = net.joint(input).is_some_and(|j| j.is_on_line());
            if !connected {
                continue;
            }
            let delivered = net.request_resource(input, self.pull_rate)?;
            deposited += self.store.borrow_mut().add(delivered);
        }
        Ok(deposited)
    }
}
