//! Visual theming for the force graph.
//!
//! Stroke styles for the two SVG layers and a categorical palette used as the
//! default node colouring.

use std::collections::HashMap;

use super::types::GraphNode;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn hex(value: u32) -> Self {
		Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Opaque `#rrggbb` form; alpha goes into a separate `*-opacity` attribute.
	pub fn to_css_rgb(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

/// Stroke applied to the `<g>` holding link lines.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	/// Stroke color; its alpha becomes `stroke-opacity`.
	pub color: Color,
}

/// Stroke applied to the `<g>` holding node circles.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	pub stroke: Color,
	pub stroke_width: f64,
}

/// A categorical palette.
#[derive(Clone, Debug)]
pub struct NodePalette {
	pub colors: Vec<Color>,
}

impl NodePalette {
	pub const FALLBACK: Color = Color::hex(0x999999);

	/// The ten-colour categorical scheme most blog graphs are drawn with.
	pub fn category10() -> Self {
		Self {
			colors: vec![
				Color::hex(0x1f77b4),
				Color::hex(0xff7f0e),
				Color::hex(0x2ca02c),
				Color::hex(0xd62728),
				Color::hex(0x9467bd),
				Color::hex(0x8c564b),
				Color::hex(0xe377c2),
				Color::hex(0x7f7f7f),
				Color::hex(0xbcbd22),
				Color::hex(0x17becf),
			],
		}
	}

	/// Colour `index`, wrapping around. An empty palette yields
	/// [`NodePalette::FALLBACK`].
	pub fn get(&self, index: usize) -> Color {
		match self.colors.len() {
			0 => Self::FALLBACK,
			n => self.colors[index % n],
		}
	}
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub link: LinkStyle,
	pub node: NodeStyle,
	pub palette: NodePalette,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			link: LinkStyle {
				color: Color::hex(0x999999).with_alpha(0.6),
			},
			node: NodeStyle {
				stroke: Color::hex(0xffffff),
				stroke_width: 1.5,
			},
			palette: NodePalette::category10(),
		}
	}
}

/// Ordinal colour scale: each distinct key gets the next palette colour in
/// order of first appearance. Nodes without the key share one colour.
#[derive(Clone, Debug)]
pub struct OrdinalColors {
	palette: NodePalette,
	field: String,
	assigned: HashMap<Option<String>, usize>,
}

impl OrdinalColors {
	pub fn new(palette: NodePalette, field: impl Into<String>) -> Self {
		Self {
			palette,
			field: field.into(),
			assigned: HashMap::new(),
		}
	}

	/// Colours nodes by their `"group"` field.
	pub fn by_group() -> Self {
		Self::new(NodePalette::category10(), "group")
	}

	pub fn color_for(&mut self, node: &GraphNode) -> String {
		let key = node.field_str(&self.field);
		let next = self.assigned.len();
		let slot = *self.assigned.entry(key).or_insert(next);
		self.palette.get(slot).to_css_rgb()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hex_round_trips_to_css() {
		assert_eq!(Color::hex(0x1f77b4).to_css_rgb(), "#1f77b4");
		assert_eq!(Color::hex(0x999999).with_alpha(0.6).to_css_rgb(), "#999999");
	}

	#[test]
	fn ordinal_colors_follow_first_appearance() {
		let mut colors = OrdinalColors::by_group();
		let d = GraphNode::new("a").with_field("group", "D");
		let r = GraphNode::new("b").with_field("group", "R");
		let d2 = GraphNode::new("c").with_field("group", "D");

		assert_eq!(colors.color_for(&d), "#1f77b4");
		assert_eq!(colors.color_for(&r), "#ff7f0e");
		assert_eq!(colors.color_for(&d2), "#1f77b4");
	}

	#[test]
	fn palette_wraps() {
		let palette = NodePalette::category10();
		assert_eq!(palette.get(10), palette.get(0));
	}

	#[test]
	fn empty_palette_falls_back_to_grey() {
		let mut colors = OrdinalColors::new(NodePalette { colors: Vec::new() }, "group");
		let node = GraphNode::new("a").with_field("group", "x");
		assert_eq!(NodePalette { colors: Vec::new() }.get(3), NodePalette::FALLBACK);
		assert_eq!(colors.color_for(&node), "#999999");
	}
}
