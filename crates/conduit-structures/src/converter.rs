use crate::store::ResourceStore;
use conduit_core::error::NetworkError;
use conduit_core::fixed::Fixed64;
use conduit_core::id::{JointId, ResourceTypeId};
use conduit_core::network::ResourceNetwork;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// How much of one resource becomes how much of another, per unit converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRecipe {
    pub input: ResourceTypeId,
    pub input_amount: Fixed64,
    pub output: ResourceTypeId,
    pub output_amount: Fixed64,
}

/// A converting structure: pulls its input resource off one line, converts
/// whole units into its output resource, and serves that through its output
/// connectors.
///
/// Both sides buffer through internal stores; conversion only runs while the
/// output store has headroom, so a stalled consumer back-pressures the
/// input pull loop naturally.
#[derive(Debug)]
pub struct Converter {
    recipe: ConversionRecipe,
    input_store: Rc<RefCell<ResourceStore>>,
    output_store: Rc<RefCell<ResourceStore>>,
    inputs: Vec<JointId>,
    outputs: Vec<JointId>,
    pull_rate: Fixed64,
}

impl Converter {
    pub fn new(
        recipe: ConversionRecipe,
        input_capacity: Fixed64,
        output_capacity: Fixed64,
        pull_rate: Fixed64,
    ) -> Self {
        Self {
            recipe,
            input_store: Rc::new(RefCell::new(ResourceStore::new(input_capacity))),
            output_store: Rc::new(RefCell::new(ResourceStore::new(output_capacity))),
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

    pub fn input_amount(&self) -> Fixed64 {
        self.input_store.borrow().amount()
    }

    pub fn output_amount(&self) -> Fixed64 {
        self.output_store.borrow().amount()
    }

    /// Bind every output to the output store and flip all connectors live.
    pub fn activate(&self, net: &mut ResourceNetwork) -> Result<(), NetworkError> {
        for &output in &self.outputs {
            let store = Rc::clone(&self.output_store);
            net.bind_supplier(output, Box::new(move |amount| store.borrow_mut().take(amount)))?;
            net.activate_connector(output)?;
        }
        for &input in &self.inputs {
            net.activate_connector(input)?;
        }
        Ok(())
    }

    /// One input cycle: unless the input store is full, request up to
    /// `pull_rate` through every line-connected input. Returns the total
    /// deposited.
    pub fn pump(&self, net: &mut ResourceNetwork) -> Result<Fixed64, NetworkError> {
        let mut deposited = Fixed64::ZERO;
        if self.input_store.borrow().is_full() {
            return Ok(deposited);
        }
        for &input in &self.inputs {
            let connected = net.joint(input).is_some_and(|j| j.is_on_line());
            if !connected {
                continue;
            }
            let delivered = net.request_resource(input, self.pull_rate)?;
            deposited += self.input_store.borrow_mut().add(delivered);
        }
        Ok(deposited)
    }

    /// One conversion cycle: turn as many whole units as the input store
    /// affords into output resource. Skipped entirely while the output store
    /// is full. Returns the amount of output produced.
    pub fn convert(&self) -> Fixed64 {
        if self.recipe.input_amount <= Fixed64::ZERO {
            return Fixed64::ZERO;
        }
        if self.output_store.borrow().is_full() {
            return Fixed64::ZERO;
        }
        let available = self.input_store.borrow().amount();
        let units = (available / self.recipe.input_amount).floor();
        if units <= Fixed64::ZERO {
            return Fixed64::ZERO;
        }
        self.input_store
            .borrow_mut()
            .take(units * self.recipe.input_amount);
        let produced = units * self.recipe.output_amount;
        self.output_store.borrow_mut().add(produced);
        produced
    }
}
