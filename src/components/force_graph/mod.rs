//! Force-directed graph visualization component.
//!
//! Renders an interactive force-directed graph as SVG with:
//! - Physics-based node positioning via force simulation that cools to rest
//! - Node dragging that pins a node and re-heats the layout
//! - Wheel zoom (clamped) and background pan applied to the whole scene
//! - Per-node colours computed once, and id tooltips
//!
//! # Example
//!
//! ```ignore
//! use blog_graph::components::force_graph::{graph, GraphData, GraphLink, GraphNode};
//!
//! let data = GraphData {
//!     nodes: vec![GraphNode::new("a"), GraphNode::new("b")],
//!     links: vec![GraphLink::new("a", "b", 3.0)],
//! };
//!
//! let handle = graph(&data, |_| "red".to_string(), ".graph")?;
//! // later, when the post is torn down:
//! handle.stop();
//! ```

mod component;
pub mod config;
pub mod drag;
mod error;
mod render;
pub mod scene;
pub mod simulation;
pub mod theme;
mod types;
pub mod zoom;

pub use component::{ColorFn, ForceGraphSvg, GraphHandle, graph, graph_js, mount, mount_with};
pub use config::GraphConfig;
pub use error::{GraphError, Result};
pub use scene::GraphScene;
pub use theme::{OrdinalColors, Theme};
pub use types::{GraphData, GraphLink, GraphNode};
