//! SVG rendering for the force graph.
//!
//! Builds the element tree once and then only rewrites attributes:
//! 1. `<svg viewBox>` appended to the mount element
//! 2. link layer `<g>` with one `<line>` per link
//! 3. node layer `<g>` with one `<circle><title/></circle>` per node
//!
//! Both layers receive the same zoom transform.

use web_sys::{Document, Element};

use super::error::Result;
use super::scene::GraphScene;
use super::theme::Theme;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Live SVG elements bound to a [`GraphScene`], index-aligned with its
/// element models.
pub struct SvgLayers {
	pub svg: Element,
	pub link_layer: Element,
	pub node_layer: Element,
	pub lines: Vec<Element>,
	pub circles: Vec<Element>,
}

fn create(document: &Document, tag: &str) -> Result<Element> {
	Ok(document.create_element_ns(Some(SVG_NS), tag)?)
}

impl SvgLayers {
	/// Creates the element tree and appends it to `mount`. Existing children
	/// of `mount` are left alone.
	pub fn build(
		document: &Document,
		mount: &Element,
		scene: &GraphScene,
		theme: &Theme,
	) -> Result<Self> {
		let config = scene.config();

		let svg = create(document, "svg")?;
		svg.set_attribute(
			"viewBox",
			&format!("0 0 {} {}", config.width, config.height),
		)?;
		svg.set_attribute("class", "force-graph")?;
		// Touch drags and pans are handled here, not by page scrolling.
		svg.set_attribute("style", "touch-action: none")?;

		let link_layer = create(document, "g")?;
		link_layer.set_attribute("stroke", &theme.link.color.to_css_rgb())?;
		link_layer.set_attribute("stroke-opacity", &theme.link.color.a.to_string())?;
		svg.append_child(&link_layer)?;

		let node_layer = create(document, "g")?;
		node_layer.set_attribute("stroke", &theme.node.stroke.to_css_rgb())?;
		node_layer.set_attribute("stroke-width", &theme.node.stroke_width.to_string())?;
		svg.append_child(&node_layer)?;

		let mut lines = Vec::with_capacity(scene.links().len());
		for link in scene.links() {
			let line = create(document, "line")?;
			line.set_attribute("stroke-width", &link.stroke_width.to_string())?;
			link_layer.append_child(&line)?;
			lines.push(line);
		}

		let mut circles = Vec::with_capacity(scene.nodes().len());
		for node in scene.nodes() {
			let circle = create(document, "circle")?;
			circle.set_attribute("r", &node.r.to_string())?;
			circle.set_attribute("fill", &node.fill)?;
			let title = create(document, "title")?;
			title.set_text_content(Some(node.title.as_str()));
			circle.append_child(&title)?;
			node_layer.append_child(&circle)?;
			circles.push(circle);
		}

		mount.append_child(&svg)?;

		let layers = Self {
			svg,
			link_layer,
			node_layer,
			lines,
			circles,
		};
		layers.update_geometry(scene);
		layers.update_transform(scene);
		Ok(layers)
	}

	/// Copies link endpoints and node centers into the DOM.
	pub fn update_geometry(&self, scene: &GraphScene) {
		for (line, link) in self.lines.iter().zip(scene.links()) {
			let _ = line.set_attribute("x1", &link.x1.to_string());
			let _ = line.set_attribute("y1", &link.y1.to_string());
			let _ = line.set_attribute("x2", &link.x2.to_string());
			let _ = line.set_attribute("y2", &link.y2.to_string());
		}
		for (circle, node) in self.circles.iter().zip(scene.nodes()) {
			let _ = circle.set_attribute("cx", &node.cx.to_string());
			let _ = circle.set_attribute("cy", &node.cy.to_string());
		}
	}

	/// Applies the current zoom transform to both layers.
	pub fn update_transform(&self, scene: &GraphScene) {
		let _ = self
			.link_layer
			.set_attribute("transform", &scene.link_layer_transform());
		let _ = self
			.node_layer
			.set_attribute("transform", &scene.node_layer_transform());
	}

	/// Slot of the node drawn by `element`, if it is one of our circles.
	pub fn circle_slot(&self, element: &Element) -> Option<usize> {
		self.circles.iter().position(|c| c == element)
	}
}
