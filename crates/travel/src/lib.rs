//! Long-distance travel for game bots.
//!
//! A short-range path planner only gives useful answers within a few
//! hundred yards. This crate overlays a coarse graph of known-walkable
//! hops plus portals, transports, flights and teleports, and searches it
//! with A* to route anywhere in the world.
//!
//! # Modules
//!
//! - [`node`] / [`path`]: vertices and directed, costed edges
//! - [`graph`]: the graph and route search
//! - [`route`] / [`travel_path`]: search results and the flattened plan a
//!   mover follows
//! - [`map`]: the shared, lock-protected graph with maintenance passes
//! - [`store`]: versioned per-map persistence

pub mod config;
pub mod error;
pub mod graph;
pub mod map;
pub mod node;
pub mod path;
pub mod planner;
pub mod route;
pub mod store;
pub mod travel_path;

pub use config::TravelConfig;
pub use error::{Result, StoreError};
pub use graph::{NodeGraph, RouteStart};
pub use map::{GenerationReport, PointOfInterest, TeleportOption, TravelNodeMap};
pub use node::{NodeId, TravelNode};
pub use path::{Faction, MaxLevels, TravelNodePath, TravelNodePathType, TravelerProfile};
pub use planner::{PathPlanner, PlannedPath, RangeLimitedPlanner};
pub use route::TravelNodeRoute;
pub use store::{FileNodeStore, STORE_VERSION};
pub use travel_path::{NextStep, PathNodePoint, PathNodeType, TravelPath};
