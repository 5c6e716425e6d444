//! Renderer-independent graph scene.
//!
//! A [`GraphScene`] owns everything one widget needs: the simulation, the
//! zoom transform, drag and pan gestures, and a model of every SVG element
//! it will draw. The DOM layer only copies element models into attributes, so
//! all interaction logic is exercised here without a browser.

use std::collections::HashMap;

use super::config::GraphConfig;
use super::drag::DragState;
use super::error::{GraphError, Result};
use super::simulation::Simulation;
use super::types::{GraphData, GraphNode};
use super::zoom::{PanState, WheelUnit, ZoomBehavior, ZoomTransform};

/// One `<line>` per link.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkElement {
	pub source: usize,
	pub target: usize,
	pub stroke_width: f64,
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
}

/// One `<circle>` per node, with a `<title>` tooltip.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeElement {
	pub title: String,
	/// Computed once, when the scene is built.
	pub fill: String,
	pub r: f64,
	pub cx: f64,
	pub cy: f64,
}

/// Core graph state combining the simulation with view and gesture state.
///
/// Created once per mount, then mutated by the animation loop (`tick`) and by
/// pointer handlers.
pub struct GraphScene {
	config: GraphConfig,
	simulation: Simulation,
	zoom: ZoomBehavior,
	transform: ZoomTransform,
	pan: PanState,
	drag: DragState,
	links: Vec<LinkElement>,
	nodes: Vec<NodeElement>,
}

impl GraphScene {
	pub fn new(
		data: &GraphData,
		config: GraphConfig,
		mut color: impl FnMut(&GraphNode) -> String,
	) -> Result<Self> {
		Self::try_new(data, config, |node| Ok(color(node)))
	}

	/// Like [`GraphScene::new`] with a fallible colour function; its first
	/// error aborts construction.
	pub fn try_new(
		data: &GraphData,
		config: GraphConfig,
		mut color: impl FnMut(&GraphNode) -> Result<String>,
	) -> Result<Self> {
		config.validate()?;

		// Later duplicates shadow earlier ones.
		let index: HashMap<&str, usize> = data
			.nodes
			.iter()
			.enumerate()
			.map(|(slot, node)| (node.id.as_str(), slot))
			.collect();
		let resolve = |id: &str| {
			index
				.get(id)
				.copied()
				.ok_or_else(|| GraphError::MissingNode { id: id.to_string() })
		};

		let mut pairs = Vec::with_capacity(data.links.len());
		let mut links = Vec::with_capacity(data.links.len());
		for link in &data.links {
			let (source, target) = (resolve(&link.source)?, resolve(&link.target)?);
			pairs.push((source, target));
			links.push(LinkElement {
				source,
				target,
				stroke_width: link.weight * config.link_width_scale,
				x1: 0.0,
				y1: 0.0,
				x2: 0.0,
				y2: 0.0,
			});
		}

		let mut nodes = Vec::with_capacity(data.nodes.len());
		for node in &data.nodes {
			nodes.push(NodeElement {
				title: node.id.clone(),
				fill: color(node)?,
				r: config.node_radius,
				cx: 0.0,
				cy: 0.0,
			});
		}

		let ids = data.nodes.iter().map(|n| n.id.clone()).collect();
		let simulation = Simulation::new(ids, &pairs, config.center());

		let mut scene = Self {
			zoom: ZoomBehavior::new(&config),
			config,
			simulation,
			transform: ZoomTransform::IDENTITY,
			pan: PanState::default(),
			drag: DragState::default(),
			links,
			nodes,
		};
		scene.sync_geometry();
		Ok(scene)
	}

	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	pub fn links(&self) -> &[LinkElement] {
		&self.links
	}

	pub fn nodes(&self) -> &[NodeElement] {
		&self.nodes
	}

	pub fn transform(&self) -> ZoomTransform {
		self.transform
	}

	/// `transform` attribute for the link layer.
	pub fn link_layer_transform(&self) -> String {
		self.transform.to_string()
	}

	/// `transform` attribute for the node layer; always equal to the link
	/// layer's so the scene moves as one.
	pub fn node_layer_transform(&self) -> String {
		self.transform.to_string()
	}

	/// Advances the simulation and, if it moved, refreshes element geometry.
	pub fn tick(&mut self, dt: f64) -> bool {
		if !self.simulation.step(dt) {
			return false;
		}
		self.sync_geometry();
		true
	}

	pub fn is_running(&self) -> bool {
		self.simulation.is_running()
	}

	/// Stops the simulation and drops any held gesture.
	pub fn stop(&mut self) {
		self.drag.cancel(&mut self.simulation);
		self.pan.end();
		self.simulation.stop();
	}

	/// Copies simulation positions into element models.
	pub fn sync_geometry(&mut self) {
		let positions = self.simulation.nodes();
		for (element, pos) in self.nodes.iter_mut().zip(positions) {
			element.cx = pos.x;
			element.cy = pos.y;
		}
		for link in &mut self.links {
			let (s, t) = (&positions[link.source], &positions[link.target]);
			link.x1 = s.x;
			link.y1 = s.y;
			link.x2 = t.x;
			link.y2 = t.y;
		}
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_active()
	}

	/// Starts dragging node `slot`; `at` is in viewport coordinates.
	pub fn drag_start(&mut self, pointer: i32, slot: usize, at: (f64, f64)) {
		if slot >= self.nodes.len() {
			return;
		}
		let at = self.transform.invert(at);
		let target = self.config.drag_alpha_target;
		self.drag
			.start(&mut self.simulation, pointer, slot, at, target);
		self.sync_geometry();
	}

	pub fn drag_move(&mut self, pointer: i32, at: (f64, f64)) -> bool {
		let at = self.transform.invert(at);
		let moved = self.drag.drag(&mut self.simulation, pointer, at);
		if moved {
			self.sync_geometry();
		}
		moved
	}

	pub fn drag_end(&mut self, pointer: i32) -> bool {
		self.drag.end(&mut self.simulation, pointer)
	}

	pub fn pan_start(&mut self, at: (f64, f64)) {
		self.pan.begin(at, self.transform);
	}

	pub fn pan_move(&mut self, at: (f64, f64)) -> bool {
		match self.pan.update(&self.zoom, at) {
			Some(t) => {
				self.transform = t;
				true
			}
			None => false,
		}
	}

	pub fn pan_end(&mut self) {
		self.pan.end();
	}

	/// Ends every gesture at once, e.g. when the window loses focus before
	/// the matching mouseup or touchend arrives.
	pub fn release_all(&mut self) {
		self.drag.cancel(&mut self.simulation);
		self.pan.end();
	}

	/// Wheel zoom about the viewport point under the pointer.
	pub fn wheel(&mut self, delta_y: f64, unit: WheelUnit, at: (f64, f64)) {
		let factor = ZoomBehavior::wheel_factor(delta_y, unit);
		self.transform = self.zoom.scale_by_at(self.transform, factor, at);
	}

	/// Double-click zoom about `at`: in by a factor of two, or out with
	/// `zoom_out` (shift held).
	pub fn double_click(&mut self, at: (f64, f64), zoom_out: bool) {
		let factor = if zoom_out { 0.5 } else { 2.0 };
		self.transform = self.zoom.scale_by_at(self.transform, factor, at);
	}

	/// Programmatic zoom about the canvas center.
	pub fn zoom_to(&mut self, k: f64) {
		self.transform = self.zoom.scale_to(self.transform, k);
	}

	pub fn set_transform(&mut self, transform: ZoomTransform) {
		let k = self.zoom.constrain_scale(transform.k);
		self.transform = ZoomTransform { k, ..transform };
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use super::*;
	use crate::components::force_graph::types::GraphLink;

	const DT: f64 = 0.016;

	fn pair() -> GraphData {
		GraphData {
			nodes: vec![GraphNode::new("a"), GraphNode::new("b")],
			links: vec![GraphLink::new("a", "b", 3.0)],
		}
	}

	fn scene(data: &GraphData) -> GraphScene {
		GraphScene::new(data, GraphConfig::default(), |_| "red".to_string()).unwrap()
	}

	#[test]
	fn two_node_scenario() {
		let scene = scene(&pair());

		assert_eq!(scene.links().len(), 1);
		assert_eq!(scene.links()[0].stroke_width, 6.0);

		assert_eq!(scene.nodes().len(), 2);
		assert!(scene.nodes().iter().all(|n| n.fill == "red" && n.r == 5.0));
		let titles: Vec<_> = scene.nodes().iter().map(|n| n.title.as_str()).collect();
		assert_eq!(titles, ["a", "b"]);
	}

	#[test]
	fn stroke_width_is_twice_weight() {
		let weights = [0.0, 0.25, 1.0, 3.0, 7.5, 1e6];
		let data = GraphData {
			nodes: vec![GraphNode::new("a"), GraphNode::new("b")],
			links: weights
				.iter()
				.map(|&w| GraphLink::new("a", "b", w))
				.collect(),
		};
		let scene = scene(&data);
		for (link, w) in scene.links().iter().zip(weights) {
			assert_eq!(link.stroke_width, 2.0 * w);
		}
	}

	#[test]
	fn colors_are_evaluated_once_per_node() {
		let data = GraphData {
			nodes: vec![
				GraphNode::new("a").with_field("group", "x"),
				GraphNode::new("b").with_field("group", "y"),
				GraphNode::new("c").with_field("group", "x"),
			],
			links: vec![GraphLink::new("a", "b", 1.0)],
		};
		let calls = Cell::new(0);
		let color = |n: &GraphNode| {
			calls.set(calls.get() + 1);
			format!("fill-{}", n.field_str("group").unwrap_or_default())
		};

		let mut first = GraphScene::new(&data, GraphConfig::default(), color).unwrap();
		for _ in 0..50 {
			first.tick(DT);
		}
		assert_eq!(calls.get(), 3);

		let second = GraphScene::new(&data, GraphConfig::default(), color).unwrap();
		let fills = |s: &GraphScene| s.nodes().iter().map(|n| n.fill.clone()).collect::<Vec<_>>();
		assert_eq!(fills(&first), fills(&second));
		assert_eq!(fills(&first), ["fill-x", "fill-y", "fill-x"]);
	}

	#[test]
	fn isolated_node_still_renders_and_moves_sanely() {
		let mut data = pair();
		data.nodes.push(GraphNode::new("alone"));
		let mut scene = scene(&data);

		assert_eq!(scene.nodes().len(), 3);
		for _ in 0..100 {
			scene.tick(DT);
		}
		assert!(
			scene
				.nodes()
				.iter()
				.all(|n| n.cx.is_finite() && n.cy.is_finite())
		);
	}

	#[test]
	fn link_geometry_follows_nodes() {
		let mut scene = scene(&pair());
		for _ in 0..10 {
			scene.tick(DT);
		}
		let (a, b, link) = (&scene.nodes()[0], &scene.nodes()[1], &scene.links()[0]);
		assert_eq!((link.x1, link.y1), (a.cx, a.cy));
		assert_eq!((link.x2, link.y2), (b.cx, b.cy));
	}

	#[test]
	fn dangling_link_is_an_error() {
		let mut data = pair();
		data.links.push(GraphLink::new("a", "ghost", 1.0));
		let err = GraphScene::new(&data, GraphConfig::default(), |_| String::new())
			.err()
			.unwrap();
		assert!(matches!(err, GraphError::MissingNode { ref id } if id == "ghost"));
	}

	#[test]
	fn duplicate_ids_resolve_to_last() {
		let data = GraphData {
			nodes: vec![GraphNode::new("a"), GraphNode::new("b"), GraphNode::new("a")],
			links: vec![GraphLink::new("b", "a", 1.0)],
		};
		let scene = scene(&data);
		assert_eq!(scene.links()[0].target, 2);
	}

	#[test]
	fn color_function_error_propagates() {
		let err = GraphScene::try_new(&pair(), GraphConfig::default(), |n| {
			Err(GraphError::ColorFunction {
				message: format!("no colour for {}", n.id),
			})
		})
		.err()
		.unwrap();
		assert_eq!(err.to_string(), "colour function failed: no colour for a");
	}

	#[test]
	fn caller_data_is_untouched() {
		let data = pair();
		let copy = data.clone();
		let mut scene = scene(&data);
		scene.drag_start(0, 0, (10.0, 10.0));
		scene.tick(DT);
		assert_eq!(data, copy);
	}

	#[test]
	fn drag_pins_then_releases() {
		let mut scene = scene(&pair());
		scene.zoom_to(2.0);
		let t = scene.transform();

		let pointer = (200.0, 260.0);
		scene.drag_start(0, 0, pointer);
		scene.drag_move(0, pointer);
		for _ in 0..5 {
			scene.tick(DT);
		}
		let pinned = t.invert(pointer);
		let a = &scene.nodes()[0];
		assert_eq!((a.cx, a.cy), pinned);
		assert!(scene.is_dragging());

		assert!(scene.drag_end(0));
		assert!(!scene.simulation().node(0).unwrap().is_pinned());
		for _ in 0..5 {
			scene.tick(DT);
		}
		let a = &scene.nodes()[0];
		assert!((a.cx, a.cy) != pinned);
	}

	#[test]
	fn drag_restarts_cooled_layout() {
		let mut scene = scene(&pair());
		while scene.tick(DT) {}
		assert!(!scene.is_running());

		scene.drag_start(0, 1, (300.0, 300.0));
		assert!(scene.is_running());
		assert!(scene.tick(DT));
	}

	#[test]
	fn zoom_is_clamped_and_layers_agree() {
		let mut scene = scene(&pair());

		scene.zoom_to(10.0);
		assert_eq!(scene.transform().k, 4.0);
		assert_eq!(scene.link_layer_transform(), scene.node_layer_transform());

		scene.zoom_to(0.01);
		assert_eq!(scene.transform().k, 0.5);
		assert_eq!(scene.link_layer_transform(), scene.node_layer_transform());

		for _ in 0..50 {
			scene.wheel(-500.0, WheelUnit::Pixel, (100.0, 100.0));
			assert!(scene.transform().k <= 4.0);
			assert_eq!(scene.link_layer_transform(), scene.node_layer_transform());
		}
		assert_eq!(scene.transform().k, 4.0);

		scene.set_transform(ZoomTransform {
			x: 1.0,
			y: 2.0,
			k: 0.1,
		});
		assert_eq!(scene.transform().k, 0.5);
	}

	#[test]
	fn pan_moves_the_view_only() {
		let mut scene = scene(&pair());
		let before = scene.nodes().to_vec();

		scene.pan_start((100.0, 100.0));
		assert!(scene.pan_move((150.0, 80.0)));
		scene.pan_end();
		assert!(!scene.pan_move((0.0, 0.0)));

		assert_eq!(scene.link_layer_transform(), "translate(50,-20) scale(1)");
		assert_eq!(scene.nodes(), &before[..]);
	}

	#[test]
	fn cooled_scene_stops_ticking() {
		let mut scene = scene(&pair());
		let mut ticks = 0;
		while scene.tick(DT) {
			ticks += 1;
			assert!(ticks <= 400, "layout never cooled");
		}
		assert!(!scene.is_running());

		let settled = scene.nodes().to_vec();
		for _ in 0..10 {
			assert!(!scene.tick(DT));
		}
		assert_eq!(scene.nodes(), &settled[..]);
	}

	#[test]
	fn release_all_ends_drag_and_pan() {
		let mut scene = scene(&pair());
		scene.drag_start(0, 0, (120.0, 80.0));
		scene.pan_start((10.0, 10.0));
		assert!(scene.simulation().node(0).unwrap().is_pinned());
		assert_eq!(scene.simulation().alpha_target(), 0.3);

		scene.release_all();
		assert!(!scene.is_dragging());
		assert!(!scene.simulation().node(0).unwrap().is_pinned());
		assert_eq!(scene.simulation().alpha_target(), 0.0);
		assert!(!scene.pan_move((40.0, 40.0)));
		assert!(!scene.drag_move(0, (40.0, 40.0)));
	}

	#[test]
	fn double_click_zooms_about_the_pointer() {
		let mut scene = scene(&pair());
		let at = (150.0, 450.0);

		scene.double_click(at, false);
		assert_eq!(scene.transform().k, 2.0);
		assert_eq!(scene.transform().invert(at), at);

		for _ in 0..5 {
			scene.double_click(at, true);
		}
		assert_eq!(scene.transform().k, 0.5);
		assert_eq!(scene.link_layer_transform(), scene.node_layer_transform());
	}

	#[test]
	fn stop_halts_ticks() {
		let mut scene = scene(&pair());
		scene.drag_start(0, 0, (1.0, 1.0));
		scene.stop();
		assert!(!scene.is_dragging());
		assert!(!scene.tick(DT));
	}

	#[test]
	fn invalid_config_is_rejected() {
		let config = GraphConfig {
			min_zoom: 0.0,
			..GraphConfig::default()
		};
		assert!(GraphScene::new(&pair(), config, |_| String::new()).is_err());
	}
}
