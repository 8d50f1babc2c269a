//! Producer/consumer structures for conduit networks.
//!
//! The core network only knows how to *ask* connectors for resource; these
//! types supply the other half: how a structure actually produces, stores,
//! or converts it. Each structure owns its internal state behind
//! `Rc<RefCell<_>>` so its ask-callbacks can share it with the network —
//! everything is single-threaded and synchronous, matching the network's
//! execution model.
//!
//! - [`throttle::GameClock`] / [`throttle::ThrottledGenerator`] — rate-limit
//!   production against elapsed game time.
//! - [`store::ResourceStore`] — a capacity-gated amount of one resource.
//! - [`storage::Storage`] — buffers resource between input and output
//!   connectors.
//! - [`solar::SolarCell`] — generates resource out of nothing, throttled.
//! - [`converter::Converter`] — turns one resource into another through
//!   internal stores.

pub mod converter;
pub mod solar;
pub mod storage;
pub mod store;
pub mod throttle;

pub use converter::{ConversionRecipe, Converter};
pub use solar::SolarCell;
pub use storage::Storage;
pub use store::ResourceStore;
pub use throttle::{GameClock, ThrottledGenerator};
