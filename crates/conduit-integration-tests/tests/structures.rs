//! Integration test: structures and the network working end to end — a
//! solar cell charging a storage over a wire line, and a converter bridging
//! two lines of different resource types.

use conduit_core::fixed::Fixed64;
use conduit_core::network::ResourceNetwork;
use conduit_core::test_utils::*;
use conduit_structures::{
    ConversionRecipe, Converter, GameClock, ResourceStore, SolarCell, Storage,
};

#[test]
fn solar_cell_charges_storage_over_a_line() {
    let mut net = ResourceNetwork::new();
    let clock = GameClock::new();

    // Solar cell structure: one output connector.
    let cell_output = add_output(&mut net, energy(), owner(1), 1_000_000.0);
    let cell = SolarCell::new(cell_output, fixed(10.0));

    // Storage structure: one input connector.
    let storage_input = add_input(&mut net, energy(), owner(2), 1_000_000.0);
    let mut storage = Storage::new(ResourceStore::new(fixed(100.0)), fixed(30.0));
    storage.add_input(storage_input);

    // Wire them through a relay joint.
    let relay = add_plain_joint(&mut net);
    net.connect(cell_output, relay).unwrap();
    net.connect(relay, storage_input).unwrap();

    cell.activate(&mut net, &clock).unwrap();
    storage.activate(&mut net).unwrap();

    // Nothing accumulated yet.
    assert_eq!(storage.pump(&mut net).unwrap(), Fixed64::ZERO);

    // Four seconds of sunlight at 10/s, pumped at 30 per cycle.
    clock.advance(fixed(4.0));
    assert_eq!(storage.pump(&mut net).unwrap(), fixed(30.0));
    assert_eq!(storage.amount(), fixed(30.0));

    // The remaining accumulation was forfeited by the throttle; a second
    // pump right away yields nothing.
    assert_eq!(storage.pump(&mut net).unwrap(), Fixed64::ZERO);

    clock.advance(fixed(1.0));
    assert_eq!(storage.pump(&mut net).unwrap(), fixed(10.0));
    assert_eq!(storage.amount(), fixed(40.0));
}

#[test]
fn converter_bridges_two_resource_lines() {
    let mut net = ResourceNetwork::new();

    // Water line: a pooled well feeding the converter's input.
    let (well, well_pool) = pooled_output(&mut net, water(), owner(1), 100.0);
    let converter_input = add_input(&mut net, water(), owner(2), 1_000_000.0);
    net.connect(well, converter_input).unwrap();

    // Oxygen line: the converter's output feeding a storage.
    let converter_output = add_output(&mut net, oxygen(), owner(2), 1_000_000.0);
    let tank_input = add_input(&mut net, oxygen(), owner(3), 1_000_000.0);
    net.connect(converter_output, tank_input).unwrap();
    assert_eq!(net.lines().len(), 2);

    // 2 water -> 1 oxygen.
    let mut converter = Converter::new(
        ConversionRecipe {
            input: water(),
            input_amount: fixed(2.0),
            output: oxygen(),
            output_amount: fixed(1.0),
        },
        fixed(50.0),
        fixed(50.0),
        fixed(20.0),
    );
    converter.add_input(converter_input);
    converter.add_output(converter_output);
    converter.activate(&mut net).unwrap();

    let mut tank = Storage::new(ResourceStore::new(fixed(100.0)), fixed(10.0));
    tank.add_input(tank_input);
    tank.activate(&mut net).unwrap();

    // Pull 20 water, convert to 10 oxygen, pump 10 into the tank.
    assert_eq!(converter.pump(&mut net).unwrap(), fixed(20.0));
    assert_eq!(*well_pool.borrow(), fixed(80.0));
    assert_eq!(converter.convert(), fixed(10.0));
    assert_eq!(tank.pump(&mut net).unwrap(), fixed(10.0));
    assert_eq!(tank.amount(), fixed(10.0));
    assert_eq!(converter.output_amount(), Fixed64::ZERO);
}

#[test]
fn two_storages_share_a_producer_fairly() {
    let mut net = ResourceNetwork::new();
    let (source, pool) = pooled_output(&mut net, energy(), owner(1), 50.0);

    let input_a = add_input(&mut net, energy(), owner(2), 1_000_000.0);
    let input_b = add_input(&mut net, energy(), owner(3), 1_000_000.0);
    net.connect(source, input_a).unwrap();
    net.connect(source, input_b).unwrap();

    let mut storage_a = Storage::new(ResourceStore::new(fixed(100.0)), fixed(30.0));
    storage_a.add_input(input_a);
    storage_a.activate(&mut net).unwrap();
    let mut storage_b = Storage::new(ResourceStore::new(fixed(100.0)), fixed(30.0));
    storage_b.add_input(input_b);
    storage_b.activate(&mut net).unwrap();

    // Each pump draws on demand; the producer's pool arbitrates.
    assert_eq!(storage_a.pump(&mut net).unwrap(), fixed(30.0));
    assert_eq!(storage_b.pump(&mut net).unwrap(), fixed(20.0));
    assert_eq!(*pool.borrow(), Fixed64::ZERO);
    assert_eq!(storage_a.pump(&mut net).unwrap(), Fixed64::ZERO);
}
