//! Conduit Core -- the resource-distribution network behind pipe and wire
//! systems in base-building games.
//!
//! A network is a dynamically growing/merging undirected graph of joints
//! (connection points), some of which are typed resource connectors, grouped
//! into lines (connected components). Each line runs an on-demand fair-share
//! protocol so producers and consumers exchange resource purely through
//! topology, with no central scheduler polling every node.
//!
//! # Key Types
//!
//! - [`network::ResourceNetwork`] -- owns the graph, the connector records,
//!   the line registry, and the request path.
//! - [`joint::Joint`] -- a graph node with stable identity, adjacency, and
//!   optional line membership.
//! - [`connector::Connector`] -- a joint's resource-endpoint record: resource
//!   type, direction role, flow limit, owning structure.
//! - [`line::Line`] -- a connected component; runs the fair-share gather.
//! - [`manager::LineManager`] -- line registry with monotonic id allocation.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point for deterministic amounts.
//! - [`save`] -- versioned snapshot serialization via bitcode.
//!
//! # Connect Flow
//!
//! ```rust,ignore
//! let a = network.create_joint(transform_a, 8);
//! let b = network.create_joint(transform_b, 8);
//! network.connect(a, b)?; // edge + line bookkeeping + segment event
//! ```
//!
//! # Request Flow
//!
//! ```rust,ignore
//! network.bind_supplier(output, Box::new(move |amount| tank.take(amount)))?;
//! network.activate_connector(output)?;
//! let delivered = network.request_resource(input, amount)?; // in [0, amount]
//! ```

pub mod connector;
pub mod error;
pub mod event;
pub mod fixed;
pub mod id;
pub mod joint;
pub mod line;
pub mod manager;
pub mod network;
pub mod save;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
