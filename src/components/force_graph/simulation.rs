//! Force simulation with an energy ("alpha") schedule.
//!
//! Link springs and many-body repulsion come from `force_graph`. This module
//! adds what the widget needs on top: a centering force, fixed-position pins
//! for dragged nodes, and a cooling schedule so the layout comes to rest
//! instead of integrating forever.
//!
//! Each tick moves `alpha` toward `alpha_target` by `alpha_decay`; the physics
//! step is scaled by `alpha`. Once `alpha` falls below `alpha_min` the
//! simulation stops until something calls [`Simulation::restart`].

use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

/// Default stopping threshold.
pub const ALPHA_MIN: f64 = 0.001;
/// Ticks needed to cool from 1.0 to [`ALPHA_MIN`] with no target.
const COOLING_TICKS: f64 = 300.0;
const INITIAL_RADIUS: f64 = 10.0;

/// Position state for one node, owned by the simulation.
///
/// Built fresh from the dataset so physics never writes into caller data.
#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
	pub id: String,
	pub x: f64,
	pub y: f64,
	/// Fixed x while pinned.
	pub fx: Option<f64>,
	/// Fixed y while pinned.
	pub fy: Option<f64>,
}

impl SimNode {
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

/// Initial spiral placement around `center`; keeps nodes apart so the first
/// repulsion step is well-defined.
pub fn phyllotaxis(i: usize, center: (f64, f64)) -> (f64, f64) {
	let angle = PI * (3.0 - 5f64.sqrt());
	let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
	let theta = i as f64 * angle;
	(center.0 + radius * theta.cos(), center.1 + radius * theta.sin())
}

/// One physics instance for one rendered graph.
pub struct Simulation {
	graph: ForceGraph<usize, ()>,
	handles: Vec<DefaultNodeIdx>,
	nodes: Vec<SimNode>,
	center: (f64, f64),
	alpha: f64,
	alpha_min: f64,
	alpha_decay: f64,
	alpha_target: f64,
	running: bool,
}

impl Simulation {
	/// Builds the simulation from node ids and resolved `(source, target)`
	/// slot pairs. The simulation starts hot and running.
	pub fn new(ids: Vec<String>, links: &[(usize, usize)], center: (f64, f64)) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});

		let mut handles = Vec::with_capacity(ids.len());
		let mut nodes = Vec::with_capacity(ids.len());
		for (slot, id) in ids.into_iter().enumerate() {
			let (x, y) = phyllotaxis(slot, center);
			handles.push(graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: slot,
			}));
			nodes.push(SimNode {
				id,
				x,
				y,
				fx: None,
				fy: None,
			});
		}

		for &(source, target) in links {
			// Self-loops have no length to spring toward.
			if source != target {
				graph.add_edge(handles[source], handles[target], EdgeData::default());
			}
		}

		Self {
			graph,
			handles,
			nodes,
			center,
			alpha: 1.0,
			alpha_min: ALPHA_MIN,
			alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / COOLING_TICKS),
			alpha_target: 0.0,
			running: true,
		}
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn node(&self, slot: usize) -> Option<&SimNode> {
		self.nodes.get(slot)
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Resumes stepping. Alpha is left as is, so pair this with a raised
	/// alpha target to actually move nodes.
	pub fn restart(&mut self) {
		self.running = true;
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Advances one tick if running. Returns whether positions changed.
	pub fn step(&mut self, dt: f64) -> bool {
		if !self.running {
			return false;
		}
		self.tick(dt);
		if self.alpha < self.alpha_min {
			self.running = false;
			debug!("simulation cooled after reaching alpha {:.5}", self.alpha);
		}
		true
	}

	/// Runs one tick regardless of the running state.
	pub fn tick(&mut self, dt: f64) {
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		self.graph.update((dt * self.alpha) as f32);

		let nodes = &mut self.nodes;
		self.graph.visit_nodes(|node| {
			let n = &mut nodes[node.data.user_data];
			n.x = node.x() as f64;
			n.y = node.y() as f64;
		});

		self.apply_center();
		self.apply_pins();
		self.write_back();
	}

	/// Fixes a node at `(x, y)` and excludes it from free motion.
	pub fn pin(&mut self, slot: usize, x: f64, y: f64) {
		let Some(node) = self.nodes.get_mut(slot) else {
			return;
		};
		node.fx = Some(x);
		node.fy = Some(y);
		node.x = x;
		node.y = y;
		self.sync_node(slot);
	}

	/// Releases a pinned node back to the physics.
	pub fn unpin(&mut self, slot: usize) {
		let Some(node) = self.nodes.get_mut(slot) else {
			return;
		};
		node.fx = None;
		node.fy = None;
		self.sync_node(slot);
	}

	/// Translates the layout so the mean position sits on the center point.
	fn apply_center(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (dx, dy) = (self.center.0 - sx / n, self.center.1 - sy / n);
		for node in &mut self.nodes {
			node.x += dx;
			node.y += dy;
		}
	}

	fn apply_pins(&mut self) {
		for node in &mut self.nodes {
			if let Some(fx) = node.fx {
				node.x = fx;
			}
			if let Some(fy) = node.fy {
				node.y = fy;
			}
		}
	}

	fn write_back(&mut self) {
		let nodes = &self.nodes;
		self.graph.visit_nodes_mut(|node| {
			let n = &nodes[node.data.user_data];
			node.data.x = n.x as f32;
			node.data.y = n.y as f32;
			node.data.is_anchor = n.is_pinned();
		});
	}

	fn sync_node(&mut self, slot: usize) {
		let idx = self.handles[slot];
		let n = &self.nodes[slot];
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = n.x as f32;
				node.data.y = n.y as f32;
				node.data.is_anchor = n.is_pinned();
			}
		});
	}
}
