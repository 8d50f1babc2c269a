use crate::throttle::{GameClock, ThrottledGenerator};
use conduit_core::error::NetworkError;
use conduit_core::fixed::Fixed64;
use conduit_core::id::JointId;
use conduit_core::network::ResourceNetwork;
use std::cell::RefCell;
use std::rc::Rc;

/// A generating structure: produces resource out of nothing at a fixed rate,
/// surrendered through a single output connector.
///
/// The generator accumulates against the shared [`GameClock`], so the cell
/// self-throttles without any per-tick simulation; the line simply asks it
/// whenever a consumer requests.
#[derive(Debug)]
pub struct SolarCell {
    output: JointId,
    generation_rate_per_second: Fixed64,
}

impl SolarCell {
    pub fn new(output: JointId, generation_rate_per_second: Fixed64) -> Self {
        Self {
            output,
            generation_rate_per_second,
        }
    }

    pub fn output(&self) -> JointId {
        self.output
    }

    /// Bind the throttled generator as the output's supplier and flip the
    /// connector live. Called when the owning building is placed.
    pub fn activate(&self, net: &mut ResourceNetwork, clock: &GameClock) -> Result<(), NetworkError> {
        let generator = Rc::new(RefCell::new(ThrottledGenerator::new(
            self.generation_rate_per_second,
            clock.now(),
        )));
        let clock = clock.clone();
        net.bind_supplier(
            self.output,
            Box::new(move |amount| generator.borrow_mut().generate(amount, clock.now())),
        )?;
        net.activate_connector(self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::test_utils::*;

    #[test]
    fn cell_supplies_what_time_allows() {
        let mut net = ResourceNetwork::new();
        let clock = GameClock::new();
        let output = add_output(&mut net, energy(), owner(1), 1_000_000.0);
        let sink = add_input(&mut net, energy(), owner(2), 1_000_000.0);
        net.connect(output, sink).unwrap();

        let cell = SolarCell::new(output, fixed(10.0));
        cell.activate(&mut net, &clock).unwrap();

        // Nothing accumulated yet.
        assert_eq!(net.request_resource(sink, fixed(50.0)).unwrap(), Fixed64::ZERO);

        // 3 seconds at 10/s.
        clock.advance(fixed(3.0));
        assert_eq!(net.request_resource(sink, fixed(50.0)).unwrap(), fixed(30.0));

        // Drained again until more time passes.
        assert_eq!(net.request_resource(sink, fixed(50.0)).unwrap(), Fixed64::ZERO);
    }

    #[test]
    fn activation_is_idempotent() {
        let mut net = ResourceNetwork::new();
        let clock = GameClock::new();
        let output = add_output(&mut net, energy(), owner(1), 100.0);
        let cell = SolarCell::new(output, fixed(5.0));
        cell.activate(&mut net, &clock).unwrap();
        cell.activate(&mut net, &clock).unwrap();
        assert!(net.connector(output).unwrap().is_live());
    }
}
