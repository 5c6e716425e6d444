//! Canvas and interaction configuration.
//!
//! All values are in SVG user units (the `viewBox` coordinate system), so the
//! widget scales to whatever size its container gives it.

use serde::Deserialize;

use super::error::{GraphError, Result};

/// Renderer options. Missing fields in JSON fall back to [`Default`].
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
	/// Canvas width; also the x-extent of zoom and the centering target.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
	/// Smallest allowed zoom factor.
	pub min_zoom: f64,
	/// Largest allowed zoom factor.
	pub max_zoom: f64,
	/// Circle radius for every node.
	pub node_radius: f64,
	/// Link stroke width per unit of link weight.
	pub link_width_scale: f64,
	/// Energy target held while a node is being dragged.
	pub drag_alpha_target: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			width: 600.0,
			height: 600.0,
			min_zoom: 0.5,
			max_zoom: 4.0,
			node_radius: 5.0,
			link_width_scale: 2.0,
			drag_alpha_target: 0.3,
		}
	}
}

impl GraphConfig {
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}

	pub fn validate(&self) -> Result<()> {
		let invalid = |message: String| Err(GraphError::InvalidConfig { message });

		let positive = |v: f64| v > 0.0 && v.is_finite();
		let non_negative = |v: f64| v >= 0.0 && v.is_finite();
		if !(positive(self.width) && positive(self.height)) {
			return invalid(format!(
				"canvas must have a positive size, got {}x{}",
				self.width, self.height
			));
		}
		if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
			return invalid(format!(
				"zoom bounds must satisfy 0 < min <= max, got {}..{}",
				self.min_zoom, self.max_zoom
			));
		}
		if !non_negative(self.node_radius) {
			return invalid(format!(
				"node radius must be a finite non-negative number, got {}",
				self.node_radius
			));
		}
		if !non_negative(self.link_width_scale) {
			return invalid(format!(
				"link width scale must be a finite non-negative number, got {}",
				self.link_width_scale
			));
		}
		if !(0.0..=1.0).contains(&self.drag_alpha_target) {
			return invalid(format!(
				"drag alpha target must be within 0..=1, got {}",
				self.drag_alpha_target
			));
		}
		Ok(())
	}
}
